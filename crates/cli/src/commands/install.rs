//! `install`: make a working tool available and print its path.

use super::CommandOutput;
use crate::cli::CliError;
use c2pa_verifier::VerificationService;

/// Ensure the tool is installed.
///
/// # Errors
///
/// Returns the install failure.
pub async fn execute(service: &VerificationService) -> Result<CommandOutput, CliError> {
    let path = service.ensure_tool().await?;
    Ok(CommandOutput::ok(format!("{}\n", path.display())))
}
