//! Command implementations.
//!
//! Commands return their stdout text and exit code instead of printing, so
//! they can be exercised without a terminal.

pub mod install;
pub mod locate;
pub mod verify;

use crate::cli::{CliError, EXIT_OK};
use c2pa_verifier::{VerificationService, VerifierConfig};
use std::path::PathBuf;
use tracing::Instrument;

/// A parsed command ready to execute.
#[derive(Debug, Clone)]
pub enum Command {
    /// Verify one file.
    Verify {
        /// File to verify
        file: PathBuf,
    },
    /// Install the tool if needed.
    Install,
    /// Show tool lookup.
    Locate,
}

impl Command {
    /// Name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Verify { .. } => "verify",
            Self::Install => "install",
            Self::Locate => "locate",
        }
    }
}

/// What a command wants written to stdout, and how the process should exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Text for stdout, newline terminated
    pub stdout: String,
    /// Process exit code
    pub exit_code: i32,
}

impl CommandOutput {
    /// Output of a successful command.
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: EXIT_OK,
        }
    }
}

/// Runs commands against one verification service.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    service: VerificationService,
}

impl CommandExecutor {
    /// Build an executor from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the verification service cannot be created.
    pub fn new(config: &VerifierConfig) -> Result<Self, CliError> {
        Ok(Self::with_service(VerificationService::new(config)?))
    }

    /// Build an executor around an existing service.
    #[must_use]
    pub fn with_service(service: VerificationService) -> Self {
        Self { service }
    }

    /// Execute `command`.
    ///
    /// # Errors
    ///
    /// Returns an error for failures that are not reported on stdout.
    /// Verification failures are part of the `verify` output instead.
    pub async fn execute(&self, command: Command) -> Result<CommandOutput, CliError> {
        let span = crate::command_span!(command.name());
        async {
            match command {
                Command::Verify { file } => Ok(verify::execute(&self.service, &file).await),
                Command::Install => install::execute(&self.service).await,
                Command::Locate => Ok(locate::execute(&self.service)),
            }
        }
        .instrument(span)
        .await
    }
}
