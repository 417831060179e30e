//! Turns raw tool outcomes into a [`NormalizedResult`] or a typed error.
//!
//! An outcome is first reduced to a [`ToolState`], then resolved. Only the
//! [`ToolState::ToolMissingOrBroken`] state asks the caller to reinstall;
//! the caller decides whether a retry is still allowed.

use c2pa_verifier_core::{Error, NormalizedResult, Result};
use c2pa_verifier_tools_c2patool::RunOutput;
use serde_json::Value;
use tracing::{debug, warn};

use crate::classify::{Classification, classify_failure, signals_no_provenance};

/// Message for output that is not a JSON object.
pub const INVALID_OUTPUT_MESSAGE: &str = "Invalid output from verification tool";

/// Intermediate classification of one tool invocation.
#[derive(Debug)]
pub enum ToolState {
    /// Successful exit; stdout still has to be parsed.
    Success {
        stdout: String,
        stderr: String,
    },
    /// The tool said the file has no provenance data.
    NoProvenanceSignaled { stderr: String },
    /// The binary is missing or cannot run here.
    ToolMissingOrBroken(Error),
    /// Any other failure.
    UnclassifiedError(Error),
}

impl ToolState {
    /// Reduce a runner outcome to a state.
    #[must_use]
    pub fn from_outcome(outcome: Result<RunOutput>) -> Self {
        match outcome {
            Ok(output) => Self::from_output(output),
            Err(error) => {
                let text = error.to_string();
                Self::from_failure(&text, error)
            }
        }
    }

    fn from_output(output: RunOutput) -> Self {
        if signals_no_provenance(&output.stderr) {
            return Self::NoProvenanceSignaled {
                stderr: output.stderr,
            };
        }

        if output.exit.success {
            return Self::Success {
                stdout: output.stdout,
                stderr: output.stderr,
            };
        }

        let stderr = output.stderr.trim();
        let message = if stderr.is_empty() {
            format!("exited with {}", output.exit)
        } else {
            format!("exited with {}: {stderr}", output.exit)
        };
        Self::from_failure(&message, Error::execution(message.clone()))
    }

    fn from_failure(text: &str, error: Error) -> Self {
        let classification = classify_failure(text);
        debug!(%classification, error = %text, "Classified tool failure");
        match classification {
            Classification::NoProvenance => Self::NoProvenanceSignaled {
                stderr: text.to_string(),
            },
            Classification::ToolUnavailable => Self::ToolMissingOrBroken(error),
            Classification::Other => Self::UnclassifiedError(error),
        }
    }
}

/// What the caller should do next.
#[derive(Debug)]
pub enum Step {
    /// Verification finished.
    Done(Result<NormalizedResult>),
    /// The tool is unavailable; reinstall and run again.
    Reinstall(Error),
}

/// Maps tool outcomes to results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultNormalizer;

impl ResultNormalizer {
    /// Create a normalizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Normalize an outcome, allowing a reinstall request.
    #[must_use]
    pub fn normalize(&self, outcome: Result<RunOutput>) -> Step {
        match ToolState::from_outcome(outcome) {
            ToolState::Success { stdout, stderr } => Step::Done(parse_payload(&stdout, &stderr)),
            ToolState::NoProvenanceSignaled { stderr } => {
                debug!(stderr = %stderr.trim(), "No provenance data");
                Step::Done(Ok(NormalizedResult::absent()))
            }
            ToolState::ToolMissingOrBroken(error) => Step::Reinstall(error),
            ToolState::UnclassifiedError(error) => Step::Done(Err(error)),
        }
    }

    /// Normalize an outcome with reinstalls exhausted.
    ///
    /// # Errors
    ///
    /// Returns the failure of the invocation, including a still missing or
    /// broken tool.
    pub fn normalize_final(&self, outcome: Result<RunOutput>) -> Result<NormalizedResult> {
        match self.normalize(outcome) {
            Step::Done(result) => result,
            Step::Reinstall(error) => Err(error),
        }
    }
}

fn parse_payload(stdout: &str, stderr: &str) -> Result<NormalizedResult> {
    let payload = match serde_json::from_str::<Value>(stdout.trim()) {
        Ok(Value::Object(payload)) => payload,
        Ok(other) => {
            debug!(kind = json_kind(&other), "Tool output is not a JSON object");
            return Err(Error::output_parse(INVALID_OUTPUT_MESSAGE));
        }
        Err(e) => {
            debug!(error = %e, bytes = stdout.len(), "Tool output is not valid JSON");
            return Err(Error::output_parse(INVALID_OUTPUT_MESSAGE));
        }
    };

    let stderr = stderr.trim();
    if !stderr.is_empty() {
        warn!(%stderr, "Verification tool wrote to stderr");
    }
    Ok(NormalizedResult::Found { payload })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
