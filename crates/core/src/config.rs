//! Verifier configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! the environment. Command-line callers apply their own flags last.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::context::{TOOL_PATH_ENV, ToolContext};
use crate::{Error, Result};

/// Release-metadata endpoint for the latest published c2patool.
pub const DEFAULT_RELEASES_URL: &str =
    "https://api.github.com/repos/contentauth/c2pa-rs/releases/latest";

/// User agent sent with every release feed request.
pub const DEFAULT_USER_AGENT: &str = "c2pa-verifier-installer";

/// Default bound on a single tool invocation.
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 30;

/// Default bound on a single release feed request.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Name of the scratch directory created under the system temp root.
const SCRATCH_DIR_NAME: &str = "c2pa-install";

/// Configuration for locating, installing and running the verification tool.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// Explicit tool path, honored only while it exists.
    pub tool_path: Option<PathBuf>,
    /// Directory searched for a local tool; defaults to the process working directory.
    pub working_dir: Option<PathBuf>,
    /// Directory the installer writes the tool into; defaults to `working_dir`.
    pub install_dir: Option<PathBuf>,
    /// Root for download and extraction scratch space.
    pub scratch_dir: Option<PathBuf>,
    /// Release-metadata endpoint.
    pub releases_url: String,
    /// User agent for release feed requests.
    pub user_agent: String,
    /// Seconds a single tool invocation may run.
    pub run_timeout_secs: u64,
    /// Seconds a single release feed request may take.
    pub http_timeout_secs: u64,
    /// Bearer token for the release feed.
    #[serde(skip_serializing)]
    pub github_token: Option<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            tool_path: None,
            working_dir: None,
            install_dir: None,
            scratch_dir: None,
            releases_url: DEFAULT_RELEASES_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            run_timeout_secs: DEFAULT_RUN_TIMEOUT_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            github_token: None,
        }
    }
}

impl fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("tool_path", &self.tool_path)
            .field("working_dir", &self.working_dir)
            .field("install_dir", &self.install_dir)
            .field("scratch_dir", &self.scratch_dir)
            .field("releases_url", &self.releases_url)
            .field("user_agent", &self.user_agent)
            .field("run_timeout_secs", &self.run_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field(
                "github_token",
                &self.github_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

impl VerifierConfig {
    /// Defaults overlaid with the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// contains invalid values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::io(e, Some(path.to_path_buf()), "reading configuration"))?;
        let config = Self::from_toml(&contents)?;
        debug!(?path, "Loaded configuration file");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or contains invalid values.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| Error::configuration(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from the environment.
    ///
    /// `C2PATOOL_PATH` replaces the tool path; `GITHUB_TOKEN` (or `GH_TOKEN`)
    /// supplies the release feed token.
    pub fn apply_env(&mut self) {
        if let Some(path) = non_empty_var(TOOL_PATH_ENV) {
            self.tool_path = Some(PathBuf::from(path));
        }
        if let Some(token) = non_empty_var("GITHUB_TOKEN").or_else(|| non_empty_var("GH_TOKEN")) {
            self.github_token = Some(token);
        }
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for zero timeouts or an empty endpoint.
    pub fn validate(&self) -> Result<()> {
        if self.run_timeout_secs == 0 {
            return Err(Error::configuration("run_timeout_secs must be positive"));
        }
        if self.http_timeout_secs == 0 {
            return Err(Error::configuration("http_timeout_secs must be positive"));
        }
        if self.releases_url.trim().is_empty() {
            return Err(Error::configuration("releases_url must not be empty"));
        }
        Ok(())
    }

    /// Directory searched for a local tool.
    ///
    /// # Errors
    ///
    /// Returns an error if no directory is configured and the process working
    /// directory cannot be read.
    pub fn working_dir(&self) -> Result<PathBuf> {
        match &self.working_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir()
                .map_err(|e| Error::io(e, None, "reading working directory")),
        }
    }

    /// Directory the installer writes the tool into.
    ///
    /// # Errors
    ///
    /// See [`VerifierConfig::working_dir`].
    pub fn install_dir(&self) -> Result<PathBuf> {
        match &self.install_dir {
            Some(dir) => Ok(dir.clone()),
            None => self.working_dir(),
        }
    }

    /// Root for download and extraction scratch space.
    #[must_use]
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(SCRATCH_DIR_NAME))
    }

    /// Bound on a single tool invocation.
    #[must_use]
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    /// Bound on a single release feed request.
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Tool context seeded with the configured override path.
    #[must_use]
    pub fn tool_context(&self) -> ToolContext {
        ToolContext::new(self.tool_path.clone())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
