//! c2patool provider for c2pa-verifier.
//!
//! Locates, installs and runs the external `c2patool` binary:
//! - Layered lookup: explicit override, working directory, project root, `PATH`
//! - Automatic install from the latest GitHub release, musl preferred on Linux
//! - Archive extraction (zip, tar.gz) with a recursive binary search
//! - Time-limited invocation with captured output
//!
//! # Example
//!
//! ```ignore
//! use c2pa_verifier_core::VerifierConfig;
//! use c2pa_verifier_tools_c2patool::{Installer, ReleaseInstaller};
//!
//! let config = VerifierConfig::from_env();
//! let installer = ReleaseInstaller::new(&config, config.tool_context())?;
//! let path = installer.ensure_available().await?;
//! ```

mod extract;
mod installer;
mod locator;
mod release;
mod runner;

pub use extract::{ArchiveKind, extract_archive, find_binary};
pub use installer::{Installer, ReleaseInstaller};
pub use locator::{CandidateSource, ToolCandidate, ToolLocator, is_executable};
pub use release::{Release, ReleaseAsset, ReleaseClient, select_asset};
pub use runner::{ExitInfo, RunOutput, ToolRunner};
