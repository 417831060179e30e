//! `locate`: list lookup candidates and mark the one in use.

use super::CommandOutput;
use c2pa_verifier::VerificationService;
use c2pa_verifier_tools_c2patool::ToolCandidate;
use std::fmt::Write;

/// Describe the candidate list.
#[must_use]
pub fn execute(service: &VerificationService) -> CommandOutput {
    CommandOutput::ok(render(&service.candidates(), &service.locate()))
}

fn render(candidates: &[ToolCandidate], selected: &ToolCandidate) -> String {
    let mut out = String::new();
    for candidate in candidates {
        let marker = if candidate == selected { '*' } else { ' ' };
        let state = if candidate.is_usable() { "" } else { "  (missing)" };
        let _ = writeln!(
            out,
            "{marker} {:<16} {}{state}",
            candidate.source.to_string(),
            candidate.path.display()
        );
    }
    out
}
