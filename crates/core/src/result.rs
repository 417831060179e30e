//! The stable result shape returned by a verification.

use serde_json::{Map, Value};

/// Marker field added to every normalized JSON response.
pub const PROVENANCE_MARKER: &str = "hasProvenanceData";

/// Status reported when the tool found no provenance manifest.
pub const ABSENT_STATUS: &str = "No provenance metadata detected";

/// Message reported alongside [`ABSENT_STATUS`].
pub const ABSENT_MESSAGE: &str = "No C2PA data found in this image";

/// Outcome of a single successful verification.
///
/// Failures are reported through [`crate::Error`].
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResult {
    /// The tool reported a provenance manifest.
    Found {
        /// JSON object emitted by the tool, unchanged
        payload: Map<String, Value>,
    },
    /// The tool reported that the file carries no provenance data.
    Absent {
        /// Human-readable status
        status: String,
    },
}

impl NormalizedResult {
    /// Result for a file without provenance data.
    #[must_use]
    pub fn absent() -> Self {
        Self::Absent {
            status: ABSENT_STATUS.to_string(),
        }
    }

    /// Whether the tool reported a provenance manifest.
    #[must_use]
    pub fn has_provenance_data(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Render the result as the JSON object returned to callers.
    ///
    /// `Found` payloads keep all of the tool's fields and gain
    /// `hasProvenanceData: true`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Found { payload } => {
                let mut object = payload.clone();
                object.insert(PROVENANCE_MARKER.to_string(), Value::Bool(true));
                Value::Object(object)
            }
            Self::Absent { status } => serde_json::json!({
                "message": ABSENT_MESSAGE,
                PROVENANCE_MARKER: false,
                "status": status,
            }),
        }
    }
}
