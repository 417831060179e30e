//! Layered lookup of the verification tool binary.

use c2pa_verifier_core::ToolContext;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a candidate path came from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateSource {
    /// `C2PATOOL_PATH`, or the most recent successful install.
    EnvOverride,
    /// The binary next to the working directory.
    LocalDirectory,
    /// The binary one directory above the working directory.
    ProjectRoot,
    /// The bare command name, resolved through `PATH` at invocation.
    SystemPath,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EnvOverride => "env-override",
            Self::LocalDirectory => "local-directory",
            Self::ProjectRoot => "project-root",
            Self::SystemPath => "system-path",
        };
        f.write_str(name)
    }
}

/// A possible location of the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCandidate {
    pub source: CandidateSource,
    pub path: PathBuf,
}

impl ToolCandidate {
    fn new(source: CandidateSource, path: PathBuf) -> Self {
        Self { source, path }
    }

    /// Whether this candidate can be used without invoking it.
    ///
    /// The system-path fallback always qualifies; every other candidate must
    /// be an existing file (and executable on POSIX).
    #[must_use]
    pub fn is_usable(&self) -> bool {
        match self.source {
            CandidateSource::SystemPath => true,
            _ => is_executable(&self.path),
        }
    }
}

/// Finds the verification tool from layered candidate locations.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    working_dir: PathBuf,
    binary_name: &'static str,
    context: ToolContext,
}

impl ToolLocator {
    /// Create a locator rooted at `working_dir`.
    #[must_use]
    pub fn new(working_dir: PathBuf, binary_name: &'static str, context: ToolContext) -> Self {
        Self {
            working_dir,
            binary_name,
            context,
        }
    }

    /// All candidates in priority order, whether or not they exist.
    #[must_use]
    pub fn candidates(&self) -> Vec<ToolCandidate> {
        let mut candidates = Vec::with_capacity(4);
        if let Some(path) = self.context.tool_path() {
            candidates.push(ToolCandidate::new(CandidateSource::EnvOverride, path));
        }
        candidates.push(ToolCandidate::new(
            CandidateSource::LocalDirectory,
            self.working_dir.join(self.binary_name),
        ));
        candidates.push(ToolCandidate::new(
            CandidateSource::ProjectRoot,
            self.working_dir.join("..").join(self.binary_name),
        ));
        candidates.push(ToolCandidate::new(
            CandidateSource::SystemPath,
            PathBuf::from(self.binary_name),
        ));
        candidates
    }

    /// The first usable candidate.
    ///
    /// Never fails: the system-path fallback is returned when nothing else
    /// qualifies and is only checked when it is invoked.
    #[must_use]
    pub fn locate(&self) -> ToolCandidate {
        let found = self
            .candidates()
            .into_iter()
            .find(ToolCandidate::is_usable)
            .unwrap_or_else(|| {
                ToolCandidate::new(CandidateSource::SystemPath, PathBuf::from(self.binary_name))
            });
        debug!(source = %found.source, path = ?found.path, "Located verification tool");
        found
    }
}

/// Whether `path` is an existing file that may be executed.
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
