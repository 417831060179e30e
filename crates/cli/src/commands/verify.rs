//! `verify`: print the response envelope for one file.

use super::CommandOutput;
use crate::cli::{EXIT_FAILED, EXIT_OK, ErrorEnvelope, OkEnvelope};
use c2pa_verifier::VerificationService;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Verify `file` and render the outcome as a JSON envelope.
///
/// Failures are reported with their generic public message and exit code 1;
/// details go to the log.
pub async fn execute(service: &VerificationService, file: &Path) -> CommandOutput {
    match service.verify(file).await {
        Ok(result) => CommandOutput {
            stdout: render(&OkEnvelope::new(result.to_json())),
            exit_code: EXIT_OK,
        },
        Err(e) => {
            debug!(error = ?e, "Reporting verification failure");
            CommandOutput {
                stdout: render(&ErrorEnvelope::new(e.public_message())),
                exit_code: EXIT_FAILED,
            }
        }
    }
}

fn render<T: Serialize>(envelope: &T) -> String {
    let mut json = serde_json::to_string_pretty(envelope)
        .unwrap_or_else(|_| r#"{"success":false,"error":"Failed to verify image"}"#.to_string());
    json.push('\n');
    json
}
