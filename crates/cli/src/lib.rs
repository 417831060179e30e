//! c2pa-verify command-line interface
//!
//! Thin shell over [`c2pa_verifier::VerificationService`]: argument parsing,
//! configuration layering, log setup and JSON response envelopes.

// CLI output goes to stdout/stderr by design
#![allow(clippy::print_stdout, clippy::print_stderr)]

/// CLI argument parsing, envelopes and exit codes.
pub mod cli;
/// Command implementations.
pub mod commands;
/// Tracing configuration.
pub mod tracing;

use cli::{Cli, CliError};
use commands::{CommandExecutor, CommandOutput};

/// Build the configuration from `cli` and run its command.
///
/// # Errors
///
/// Returns configuration errors and command failures that are not reported
/// on stdout.
pub async fn run(cli: Cli) -> Result<CommandOutput, CliError> {
    let config = cli.verifier_config()?;
    let executor = CommandExecutor::new(&config)?;
    executor.execute(cli.command.into()).await
}
