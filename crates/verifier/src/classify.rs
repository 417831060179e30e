//! Phrase-based classification of verification tool failures.
//!
//! The tool has no structured error channel, so failures are recognized by
//! the text it (or the operating system) writes. Every phrase the pipeline
//! reacts to is listed here.

use std::fmt;

/// Phrases the tool prints when a file carries no provenance manifest.
pub const NO_PROVENANCE_PHRASES: &[&str] = &[
    "No C2PA data",
    "No claim found",
    "No manifest",
    "Invalid C2PA",
];

/// Phrases indicating the binary is missing or cannot run on this host.
pub const TOOL_UNAVAILABLE_PHRASES: &[&str] = &[
    // Dynamic linker
    "GLIBC_",
    "symbol lookup error",
    "cannot open shared object file",
    // Missing binary
    "No such file or directory",
    "command not found",
    "c2patool: not found",
    "' not found",
    "ENOENT",
    "cannot find the file",
    "program not found",
    "is not recognized as an internal or external command",
    // Wrong architecture or format
    "Exec format error",
    "cannot execute binary file",
];

/// What a failure text says about the verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The file has no provenance data. Not a failure.
    NoProvenance,
    /// The tool binary is missing or incompatible; a reinstall may help.
    ToolUnavailable,
    /// Anything else.
    Other,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoProvenance => "no-provenance",
            Self::ToolUnavailable => "tool-unavailable",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Classify failure text from the tool's stderr or a spawn error.
///
/// "No provenance" phrases take precedence, so `No C2PA data: claim not
/// found` is never mistaken for a missing binary.
#[must_use]
pub fn classify_failure(text: &str) -> Classification {
    if contains_any(text, NO_PROVENANCE_PHRASES) {
        Classification::NoProvenance
    } else if contains_any(text, TOOL_UNAVAILABLE_PHRASES) {
        Classification::ToolUnavailable
    } else {
        Classification::Other
    }
}

/// Whether `text` carries a "no provenance" phrase.
#[must_use]
pub fn signals_no_provenance(text: &str) -> bool {
    contains_any(text, NO_PROVENANCE_PHRASES)
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}
