//! Verification entry point.

use async_trait::async_trait;
use c2pa_verifier_core::{Error, NormalizedResult, Platform, Result, TOOL_NAME, VerifierConfig};
use c2pa_verifier_tools_c2patool::{
    Installer, ReleaseInstaller, ToolCandidate, ToolLocator, ToolRunner,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::normalizer::{ResultNormalizer, Step};

/// Verifies files with the external tool, reinstalling it at most once.
///
/// The caller keeps ownership of the verified file; it is only read.
#[derive(Clone)]
pub struct VerificationService {
    locator: ToolLocator,
    runner: ToolRunner,
    installer: Arc<dyn Installer>,
    normalizer: ResultNormalizer,
}

impl std::fmt::Debug for VerificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationService")
            .field("locator", &self.locator)
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

impl VerificationService {
    /// Build the service from configuration.
    ///
    /// On a host without a published tool build the service still runs an
    /// existing tool; only installs fail, with [`Error::UnsupportedPlatform`].
    ///
    /// # Errors
    ///
    /// Returns an error if the working or install directory cannot be
    /// resolved, or the HTTP client cannot be created.
    pub fn new(config: &VerifierConfig) -> Result<Self> {
        let context = config.tool_context();
        let working_dir = config.working_dir()?;

        let (binary_name, installer): (&'static str, Arc<dyn Installer>) =
            match Platform::current() {
                Ok(platform) => (
                    platform.binary_name(),
                    Arc::new(ReleaseInstaller::for_platform(
                        config,
                        platform,
                        context.clone(),
                    )?),
                ),
                Err(e) => {
                    warn!(error = %e, "No published {TOOL_NAME} build for this host");
                    (TOOL_NAME, Arc::new(UnsupportedInstaller))
                }
            };

        Ok(Self::with_parts(
            ToolLocator::new(working_dir, binary_name, context),
            ToolRunner::new(config.run_timeout()),
            installer,
        ))
    }

    /// Assemble the service from explicit parts.
    #[must_use]
    pub fn with_parts(
        locator: ToolLocator,
        runner: ToolRunner,
        installer: Arc<dyn Installer>,
    ) -> Self {
        Self {
            locator,
            runner,
            installer,
            normalizer: ResultNormalizer::new(),
        }
    }

    /// Verify `path`.
    ///
    /// A file without provenance data is a successful
    /// [`NormalizedResult::Absent`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if `path` is not a file. Otherwise returns an
    /// error if the tool fails, emits unusable output, or is unavailable and
    /// cannot be reinstalled. After a reinstall, the error of the reinstall
    /// or of the run that follows it is returned.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn verify(&self, path: &Path) -> Result<NormalizedResult> {
        // The tool words a missing input like a missing binary.
        if !path.is_file() {
            return Err(Error::io(
                io::Error::new(io::ErrorKind::NotFound, "input file does not exist"),
                Some(path.to_path_buf()),
                "reading input file",
            ));
        }

        let candidate = self.locator.locate();
        let outcome = self.runner.run(&candidate.path, path).await;

        let result = match self.normalizer.normalize(outcome) {
            Step::Done(result) => result,
            Step::Reinstall(cause) => {
                warn!(error = %cause, source = %candidate.source, "Verification tool unavailable, reinstalling");
                let binary = self.installer.ensure_available().await.inspect_err(|e| {
                    error!(error = %e, "Reinstall failed");
                })?;
                let outcome = self.runner.run(&binary, path).await;
                self.normalizer.normalize_final(outcome)
            }
        };

        match &result {
            Ok(normalized) => info!(
                has_provenance_data = normalized.has_provenance_data(),
                "Verification finished"
            ),
            Err(e) => warn!(error = %e, "Verification failed"),
        }
        result
    }

    /// Make sure a working tool is installed and return its path.
    ///
    /// # Errors
    ///
    /// Returns the installer's error.
    pub async fn ensure_tool(&self) -> Result<PathBuf> {
        self.installer.ensure_available().await
    }

    /// The tool that the next verification would invoke.
    #[must_use]
    pub fn locate(&self) -> ToolCandidate {
        self.locator.locate()
    }

    /// All lookup candidates in priority order.
    #[must_use]
    pub fn candidates(&self) -> Vec<ToolCandidate> {
        self.locator.candidates()
    }
}

/// Installer for hosts without a published build.
struct UnsupportedInstaller;

#[async_trait]
impl Installer for UnsupportedInstaller {
    async fn ensure_available(&self) -> Result<PathBuf> {
        Err(Error::unsupported_platform(
            std::env::consts::OS,
            std::env::consts::ARCH,
        ))
    }
}
