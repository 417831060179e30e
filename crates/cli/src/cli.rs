use crate::commands::Command;
use crate::tracing::LogLevel;
use c2pa_verifier_core::VerifierConfig;
use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use miette::{Diagnostic, Report};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Verification or install failure exit code
pub const EXIT_FAILED: i32 = 1;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;

/// CLI-specific error types with exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(c2pa_verify::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// The command ran and failed (exit code 1)
    #[error("{message}")]
    #[diagnostic(code(c2pa_verify::cli::failed))]
    Failed {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new failure
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            help: None,
        }
    }

    /// Add help text to an existing error
    #[must_use]
    pub fn with_help(self, help_text: impl Into<String>) -> Self {
        let help = Some(help_text.into());
        match self {
            Self::Config { message, .. } => Self::Config { message, help },
            Self::Failed { message, .. } => Self::Failed { message, help },
        }
    }
}

/// Configuration problems exit with [`EXIT_CLI`]; everything else with
/// [`EXIT_FAILED`], keeping the diagnostic help text.
impl From<c2pa_verifier_core::Error> for CliError {
    fn from(err: c2pa_verifier_core::Error) -> Self {
        let help = err.help().map(|h| h.to_string());
        let converted = match err {
            c2pa_verifier_core::Error::Configuration { message } => Self::config(message),
            other => Self::failed(other.to_string()),
        };
        match help {
            Some(help) => converted.with_help(help),
            None => converted,
        }
    }
}

/// Map CLI error to exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Failed { .. } => EXIT_FAILED,
    }
}

/// Render an error on the terminal, or as an envelope on stdout in JSON mode
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        match serde_json::to_string(&ErrorEnvelope::new(err.to_string())) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Current time in the envelope format, e.g. `2024-05-01T12:00:00.000Z`
#[must_use]
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Success response envelope
#[derive(Debug, Clone, Serialize)]
pub struct OkEnvelope<T> {
    /// Always `true`
    pub success: bool,
    /// The actual data payload
    pub data: T,
    /// When the response was produced
    pub timestamp: String,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope stamped with the current time
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: timestamp(),
        }
    }
}

/// Error response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope<E> {
    /// Always `false`
    pub success: bool,
    /// The error details
    pub error: E,
    /// When the response was produced
    pub timestamp: String,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope stamped with the current time
    #[must_use]
    pub fn new(error: E) -> Self {
        Self {
            success: false,
            error,
            timestamp: timestamp(),
        }
    }
}

/// Verify C2PA provenance metadata with c2patool.
#[derive(Parser, Debug)]
#[command(name = "c2pa-verify")]
#[command(about = "Verify C2PA provenance metadata with c2patool")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Logging level
    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// JSON logs and error envelopes
    #[arg(long, global = true, help = "Output logs and errors in JSON format")]
    pub json: bool,

    /// Configuration file
    #[arg(long, global = true, value_name = "FILE", help = "Load configuration from a TOML file")]
    pub config: Option<PathBuf>,

    /// Tool override
    #[arg(
        long,
        global = true,
        env = "C2PATOOL_PATH",
        value_name = "PATH",
        help = "Use this c2patool binary before any other location"
    )]
    pub tool_path: Option<PathBuf>,

    /// Install directory override
    #[arg(long, global = true, value_name = "DIR", help = "Directory to install c2patool into")]
    pub install_dir: Option<PathBuf>,

    /// Release feed override
    #[arg(long, global = true, value_name = "URL", help = "Latest-release metadata endpoint")]
    pub releases_url: Option<String>,

    /// Run timeout override
    #[arg(long, global = true, value_name = "SECS", help = "Time limit for one c2patool run")]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Resolve configuration: defaults, then the file, then the
    /// environment, then flags.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be loaded or the
    /// result is invalid.
    pub fn verifier_config(&self) -> Result<VerifierConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => VerifierConfig::load(path)?,
            None => VerifierConfig::default(),
        };
        config.apply_env();

        if let Some(path) = &self.tool_path {
            config.tool_path = Some(path.clone());
        }
        if let Some(dir) = &self.install_dir {
            config.install_dir = Some(dir.clone());
        }
        if let Some(url) = &self.releases_url {
            config.releases_url.clone_from(url);
        }
        if let Some(secs) = self.timeout {
            config.run_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Verify the provenance metadata of a file")]
    Verify {
        /// File to verify
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    #[command(about = "Install c2patool if no working copy is present")]
    Install,
    #[command(about = "Show where c2patool is looked up and which copy is used")]
    Locate,
}

impl From<Commands> for Command {
    fn from(cmd: Commands) -> Self {
        match cmd {
            Commands::Verify { file } => Self::Verify { file },
            Commands::Install => Self::Install,
            Commands::Locate => Self::Locate,
        }
    }
}

/// Parse command-line arguments
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
