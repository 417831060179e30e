//! Automatic install of the verification tool from the release feed.
//!
//! The install target is a fixed path. A working binary already there is
//! reused without touching the network. Otherwise the latest release is
//! downloaded into a scratch directory, unpacked, staged next to the target,
//! probed, and renamed into place, so a broken or half-written binary never
//! becomes the active tool.

use async_trait::async_trait;
use c2pa_verifier_core::{
    Error, InstallStage, Os, Platform, Result, TOOL_NAME, ToolContext, VerifierConfig,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::extract::{extract_archive, find_binary};
use crate::release::{ReleaseClient, select_asset};
use crate::runner::ToolRunner;

/// Makes a working verification tool available.
#[async_trait]
pub trait Installer: Send + Sync {
    /// Return the path of a working tool, installing one if needed.
    async fn ensure_available(&self) -> Result<PathBuf>;
}

/// Installs the tool from the latest published release.
#[derive(Debug)]
pub struct ReleaseInstaller {
    platform: Platform,
    install_target: PathBuf,
    scratch_root: PathBuf,
    client: ReleaseClient,
    runner: ToolRunner,
    context: ToolContext,
}

impl ReleaseInstaller {
    /// Create an installer for the current platform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] on hosts without a published
    /// build, or an error if the install directory or HTTP client cannot be
    /// resolved.
    pub fn new(config: &VerifierConfig, context: ToolContext) -> Result<Self> {
        Self::for_platform(config, Platform::current()?, context)
    }

    /// Create an installer for an explicit platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the install directory or HTTP client cannot be
    /// resolved.
    pub fn for_platform(
        config: &VerifierConfig,
        platform: Platform,
        context: ToolContext,
    ) -> Result<Self> {
        Ok(Self {
            platform,
            install_target: config.install_dir()?.join(platform.binary_name()),
            scratch_root: config.scratch_dir(),
            client: ReleaseClient::new(config)?,
            runner: ToolRunner::new(config.run_timeout()),
            context,
        })
    }

    /// The fixed path the tool is installed to.
    #[must_use]
    pub fn install_target(&self) -> &Path {
        &self.install_target
    }

    /// Reuse an existing install if it passes the health probe.
    async fn probe_existing(&self) -> Option<PathBuf> {
        if !self.install_target.is_file() {
            return None;
        }

        if let Err(e) = set_executable(&self.install_target) {
            warn!(path = ?self.install_target, error = %e, "Failed to mark installed tool executable");
        }

        match self.runner.probe(&self.install_target).await {
            Ok(version) => {
                debug!(path = ?self.install_target, %version, "Installed tool is healthy");
                Some(self.install_target.clone())
            }
            Err(e) => {
                warn!(path = ?self.install_target, error = %e, "Installed tool failed health probe, reinstalling");
                None
            }
        }
    }

    async fn install_latest(&self) -> Result<PathBuf> {
        let release = self.client.fetch_latest().await?;
        let asset = select_asset(&release.assets, &self.platform)?;
        info!(
            tag = %release.tag_name,
            asset = %asset.name,
            platform = %self.platform,
            "Installing {TOOL_NAME}"
        );

        std::fs::create_dir_all(&self.scratch_root).map_err(|e| {
            Error::io(e, Some(self.scratch_root.clone()), "creating scratch directory")
        })?;
        let scratch = tempfile::Builder::new()
            .prefix("install-")
            .tempdir_in(&self.scratch_root)
            .map_err(|e| {
                Error::io(e, Some(self.scratch_root.clone()), "creating scratch directory")
            })?;

        let file_name = Path::new(&asset.name).file_name().ok_or_else(|| {
            Error::install(
                InstallStage::Download,
                format!("Invalid asset name: {}", asset.name),
            )
        })?;
        let archive = scratch.path().join(file_name);
        let data = self.client.download(asset).await?;
        tokio::fs::write(&archive, &data).await.map_err(|e| {
            Error::install(
                InstallStage::Download,
                format!("Failed to write {}: {e}", archive.display()),
            )
        })?;
        debug!(?archive, bytes = data.len(), "Downloaded release asset");

        let extract_dir = scratch.path().join("extract");
        extract_archive(&archive, &extract_dir)?;

        let binary = find_binary(&extract_dir, self.platform.binary_name()).ok_or_else(|| {
            Error::install(
                InstallStage::MissingBinary,
                format!("Extracted archive did not contain {TOOL_NAME} binary"),
            )
        })?;

        let staged = self.stage(&binary)?;
        let version = self
            .runner
            .probe(&staged)
            .await
            .map_err(|e| Error::install(InstallStage::Probe, e.to_string()))?;

        staged.persist(&self.install_target).map_err(|e| {
            Error::install(
                InstallStage::StageBinary,
                format!(
                    "Failed to move tool into {}: {}",
                    self.install_target.display(),
                    e.error
                ),
            )
        })?;

        info!(path = ?self.install_target, %version, "Installed {TOOL_NAME}");
        Ok(self.install_target.clone())
    }

    /// Copy `binary` to a temporary file beside the install target.
    ///
    /// The returned path is closed for writing so it can be executed.
    fn stage(&self, binary: &Path) -> Result<TempPath> {
        let stage_error = |e: std::io::Error| {
            Error::install(
                InstallStage::StageBinary,
                format!("Failed to stage {}: {e}", binary.display()),
            )
        };

        let dir = self
            .install_target
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        std::fs::create_dir_all(&dir).map_err(stage_error)?;

        let suffix = if self.platform.os == Os::Windows { ".exe" } else { "" };
        let mut staged = tempfile::Builder::new()
            .prefix(".c2patool-")
            .suffix(suffix)
            .tempfile_in(&dir)
            .map_err(stage_error)?;

        let mut source = File::open(binary).map_err(stage_error)?;
        std::io::copy(&mut source, staged.as_file_mut()).map_err(stage_error)?;
        staged.as_file().sync_all().map_err(stage_error)?;

        let staged = staged.into_temp_path();
        set_executable(&staged).map_err(stage_error)?;
        Ok(staged)
    }
}

#[async_trait]
impl Installer for ReleaseInstaller {
    async fn ensure_available(&self) -> Result<PathBuf> {
        let path = match self.probe_existing().await {
            Some(path) => path,
            None => self.install_latest().await?,
        };
        self.context.set_tool_path(&path);
        Ok(path)
    }
}

/// Set the executable bits on POSIX. No-op elsewhere.
fn set_executable(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}
