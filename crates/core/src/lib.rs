//! Core types and utilities for c2pa-verifier
//!
//! Shared by the tool provider and the verification service:
//!
//! - [`Error`] / [`Result`] - the failure taxonomy of the pipeline
//! - [`Platform`], [`Os`], [`Arch`] - platform identification for asset selection
//! - [`NormalizedResult`] - the stable result shape of a verification
//! - [`VerifierConfig`] - layered configuration
//! - [`ToolContext`] - the shared override tool path

mod config;
mod context;
mod error;
mod platform;
mod result;

pub use config::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_RELEASES_URL, DEFAULT_RUN_TIMEOUT_SECS,
    DEFAULT_USER_AGENT, VerifierConfig,
};
pub use context::{TOOL_PATH_ENV, ToolContext};
pub use error::{Error, InstallStage, Result};
pub use platform::{Arch, Os, Platform, TOOL_NAME};
pub use result::{ABSENT_MESSAGE, ABSENT_STATUS, NormalizedResult, PROVENANCE_MARKER};
