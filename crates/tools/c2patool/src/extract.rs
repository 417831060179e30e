//! Archive extraction for downloaded release assets.
//!
//! The archive format is chosen by file extension: `.zip`, or gzip tar
//! (`.tar.gz` / `.tgz`).

use c2pa_verifier_core::{Error, InstallStage, Result, TOOL_NAME};
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// Detect the format from an asset name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

/// Unpack `archive` into `dest`.
///
/// # Errors
///
/// Returns an extract-stage install error for unsupported extensions and
/// corrupt archives.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let kind = ArchiveKind::from_name(name).ok_or_else(|| {
        Error::install(
            InstallStage::Extract,
            format!("Unsupported archive format: {name}"),
        )
    })?;

    debug!(?archive, ?dest, ?kind, "Extracting archive");
    std::fs::create_dir_all(dest)
        .map_err(|e| Error::install(InstallStage::Extract, format!("Failed to create {}: {e}", dest.display())))?;

    let file = File::open(archive)
        .map_err(|e| Error::install(InstallStage::Extract, format!("Failed to open archive: {e}")))?;

    match kind {
        ArchiveKind::Zip => {
            let mut zip = zip::ZipArchive::new(file).map_err(|e| {
                Error::install(InstallStage::Extract, format!("Failed to open zip: {e}"))
            })?;
            zip.extract(dest).map_err(|e| {
                Error::install(InstallStage::Extract, format!("Failed to extract zip: {e}"))
            })?;
        }
        ArchiveKind::TarGz => {
            let mut tar = Archive::new(GzDecoder::new(file));
            tar.unpack(dest).map_err(|e| {
                Error::install(InstallStage::Extract, format!("Failed to extract tar: {e}"))
            })?;
        }
    }

    Ok(())
}

/// Recursively search `dir` for the tool binary.
///
/// Accepts the platform binary name as well as the bare tool name.
#[must_use]
pub fn find_binary(dir: &Path, binary_name: &str) -> Option<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| {
            let name = entry.file_name().to_string_lossy();
            trace!(path = ?entry.path(), "Inspecting extracted file");
            name == binary_name || name == TOOL_NAME
        })
        .map(walkdir::DirEntry::into_path)
}
