//! Top-level error wrapper types.

use crate::{
    ConfigError, JsonError, ParseError, StorageError, TimeoutError, UpstreamError,
    ValidationError,
};

/// Every error category a pitchkit operation can fail with.
///
/// # Examples
///
/// ```
/// use pitchkit_error::{ConfigError, PitchkitError};
///
/// let err: PitchkitError = ConfigError::new("missing key").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum PitchkitErrorKind {
    /// Required input missing
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Model or storage backend failure
    #[from(UpstreamError)]
    Upstream(UpstreamError),
    /// Structured output could not be recovered
    #[from(ParseError)]
    Parse(ParseError),
    /// Polling exceeded its wait
    #[from(TimeoutError)]
    Timeout(TimeoutError),
    /// Persistence failed
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
}

/// Pitchkit error with kind discrimination.
///
/// # Examples
///
/// ```
/// use pitchkit_error::{PitchkitErrorKind, PitchkitResult, ValidationError, ValidationErrorKind};
///
/// fn might_fail() -> PitchkitResult<()> {
///     Err(ValidationError::new(ValidationErrorKind::EmptySessionKey))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), PitchkitErrorKind::Validation(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Pitchkit Error: {}", _0)]
pub struct PitchkitError(Box<PitchkitErrorKind>);

impl PitchkitError {
    /// Create a new error from a kind.
    pub fn new(kind: PitchkitErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PitchkitErrorKind {
        &self.0
    }

    /// The upstream error kind, if this is an upstream failure.
    pub fn upstream_kind(&self) -> Option<&crate::UpstreamErrorKind> {
        match self.kind() {
            PitchkitErrorKind::Upstream(e) => Some(&e.kind),
            _ => None,
        }
    }

    /// The validation error kind, if this is a validation failure.
    pub fn validation_kind(&self) -> Option<&crate::ValidationErrorKind> {
        match self.kind() {
            PitchkitErrorKind::Validation(e) => Some(&e.kind),
            _ => None,
        }
    }

    /// True for polling timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind(), PitchkitErrorKind::Timeout(_))
    }
}

// Generic From implementation for any type that converts to PitchkitErrorKind
impl<T> From<T> for PitchkitError
where
    T: Into<PitchkitErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for pitchkit operations.
pub type PitchkitResult<T> = std::result::Result<T, PitchkitError>;
