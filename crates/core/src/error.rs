//! Error types for the c2pa-verifier pipeline.
//!
//! A missing provenance manifest is not an error: it is reported as
//! [`NormalizedResult::Absent`](crate::NormalizedResult::Absent). Everything
//! here is a failure the caller must handle.

use miette::Diagnostic;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Step of the install pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    /// Querying the release-metadata endpoint.
    FetchRelease,
    /// Downloading the selected asset.
    Download,
    /// Unpacking the downloaded archive.
    Extract,
    /// The archive did not contain the expected binary.
    MissingBinary,
    /// Copying the binary next to the install target.
    StageBinary,
    /// The `--version` health probe failed.
    Probe,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FetchRelease => "fetch-release",
            Self::Download => "download",
            Self::Extract => "extract",
            Self::MissingBinary => "missing-binary",
            Self::StageBinary => "stage-binary",
            Self::Probe => "probe",
        };
        f.write_str(name)
    }
}

/// Main error type for c2pa-verifier operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The running OS or CPU architecture has no published tool build.
    #[error("Unsupported platform: {os}/{arch}")]
    #[diagnostic(
        code(c2pa_verifier::platform::unsupported),
        help("c2patool is published for linux, darwin and windows on x64 and arm64")
    )]
    UnsupportedPlatform {
        /// Operating system reported by the runtime.
        os: String,
        /// Architecture reported by the runtime.
        arch: String,
    },

    /// No usable tool could be resolved, neither locally nor from the release feed.
    #[error("Tool resolution failed: {message}")]
    #[diagnostic(code(c2pa_verifier::tool::resolution))]
    ToolResolution {
        /// What could not be resolved
        message: String,
    },

    /// A step of the automatic install failed.
    #[error("Install failed during {stage}: {message}")]
    #[diagnostic(
        code(c2pa_verifier::tool::install),
        help("Set C2PATOOL_PATH to an existing c2patool binary to skip the automatic install")
    )]
    Install {
        /// The failing step
        stage: InstallStage,
        /// Error message
        message: String,
    },

    /// The verification tool could not be spawned, exited abnormally or timed out.
    #[error("Verification tool execution failed: {message}")]
    #[diagnostic(code(c2pa_verifier::tool::execution))]
    Execution {
        /// Error message, including captured stderr when available
        message: String,
    },

    /// The tool exited successfully but its output is not a JSON object.
    #[error("{message}")]
    #[diagnostic(code(c2pa_verifier::tool::output))]
    OutputParse {
        /// Error message
        message: String,
    },

    /// I/O error with path context
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(c2pa_verifier::io::error))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path where the I/O error occurred, if applicable
        path: Option<Box<Path>>,
        /// Description of the operation that failed
        operation: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    #[diagnostic(code(c2pa_verifier::config::invalid))]
    Configuration {
        /// The error message describing the configuration issue
        message: String,
    },
}

impl Error {
    /// Create an unsupported platform error
    pub fn unsupported_platform(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Create a tool resolution error
    pub fn tool_resolution(message: impl Into<String>) -> Self {
        Self::ToolResolution {
            message: message.into(),
        }
    }

    /// Create an install error for the given stage
    pub fn install(stage: InstallStage, message: impl Into<String>) -> Self {
        Self::Install {
            stage,
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Create an execution error for an invocation that exceeded its time limit
    #[must_use]
    pub fn timeout(limit: Duration) -> Self {
        Self::execution(format!("timed out after {limit:?}"))
    }

    /// Create an output parse error
    pub fn output_parse(message: impl Into<String>) -> Self {
        Self::OutputParse {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.map(PathBuf::into_boxed_path),
            operation: operation.into(),
        }
    }

    /// Create a configuration error with a message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The install stage that failed, if this is an install error.
    #[must_use]
    pub fn install_stage(&self) -> Option<InstallStage> {
        match self {
            Self::Install { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// A message safe to show to end users.
    ///
    /// Never contains file system paths or captured tool output.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::UnsupportedPlatform { .. } => {
                "Verification is not available on this server platform"
            }
            Self::ToolResolution { .. } | Self::Install { .. } => {
                "Verification tool is not available"
            }
            Self::Execution { .. } => "Failed to extract C2PA metadata",
            Self::OutputParse { .. } => "Invalid output from verification tool",
            Self::Io { .. } | Self::Configuration { .. } => "Failed to verify image",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: None,
            operation: "file operation".to_string(),
        }
    }
}

/// Result type for c2pa-verifier operations
pub type Result<T> = std::result::Result<T, Error>;
