//! Validation error types.

/// Required-input failures surfaced directly to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Structured brand info without a usable name
    #[display("Brand name is required")]
    MissingBrandName,
    /// Free-text brand info that is empty or whitespace
    #[display("Brand description text is empty")]
    EmptyBrandText,
    /// Session key is empty or whitespace
    #[display("Session key is required")]
    EmptySessionKey,
    /// No research has been stored for the session
    #[display("No research found for session '{}'; run research first", _0)]
    MissingResearch(String),
    /// No script has been stored for the session
    #[display("No script found for session '{}'; generate a script first", _0)]
    MissingScript(String),
    /// Generic invalid field
    #[display("Invalid value for '{}': {}", field, reason)]
    InvalidField {
        /// Field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use pitchkit_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::MissingResearch("Unknown".to_string()));
/// assert!(format!("{}", err).contains("Unknown"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The kind of error that occurred
    pub kind: ValidationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
