//! C2PA provenance verification.
//!
//! Runs the external `c2patool` against a file and reduces whatever it does
//! (JSON on stdout, a "no manifest" message on stderr, a missing or
//! incompatible binary) to a [`NormalizedResult`] or a typed [`Error`].
//! A missing or broken tool is reinstalled once per verification.
//!
//! ```ignore
//! use c2pa_verifier::VerificationService;
//! use c2pa_verifier_core::VerifierConfig;
//!
//! let service = VerificationService::new(&VerifierConfig::from_env())?;
//! let result = service.verify(Path::new("/uploads/photo.jpg")).await?;
//! println!("{}", result.to_json());
//! ```

pub mod classify;
mod normalizer;
mod service;

pub use c2pa_verifier_core::{Error, NormalizedResult, Result, VerifierConfig};
pub use classify::{Classification, classify_failure};
pub use normalizer::{INVALID_OUTPUT_MESSAGE, ResultNormalizer, Step, ToolState};
pub use service::VerificationService;
