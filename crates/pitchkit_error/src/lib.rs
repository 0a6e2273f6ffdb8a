//! Error types for pitchkit.
//!
//! This crate provides the error taxonomy shared by every pitchkit crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! | Category | Raised when | Caller behaviour |
//! |---|---|---|
//! | [`ValidationError`] | required input is missing | surfaced immediately, never retried |
//! | [`UpstreamError`] | a model or storage backend failed | logged; batch items are skipped |
//! | [`ParseError`] | script JSON is unusable | fatal for the script stage |
//! | [`TimeoutError`] | polling exceeded its wait | fatal for that one job |
//! | [`StorageError`] | persistence failed | asset dropped, batch continues |
//!
//! # Examples
//!
//! ```
//! use pitchkit_error::{PitchkitResult, ValidationError, ValidationErrorKind};
//!
//! fn require_research() -> PitchkitResult<()> {
//!     Err(ValidationError::new(ValidationErrorKind::MissingResearch(
//!         "Acme".to_string(),
//!     )))?
//! }
//!
//! assert!(require_research().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod json;
mod parse;
mod storage;
mod timeout;
mod upstream;
mod validation;

pub use config::ConfigError;
pub use error::{PitchkitError, PitchkitErrorKind, PitchkitResult};
pub use json::JsonError;
pub use parse::{ParseError, ParseErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use timeout::TimeoutError;
pub use upstream::{RetryableError, UpstreamError, UpstreamErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
