//! Structured-output parse error types.

/// Reasons a model response could not be turned into the required shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ParseErrorKind {
    /// No JSON object could be recovered from the text
    #[display("No JSON object found in {} response ({} chars)", schema, length)]
    NoJson {
        /// Schema that was requested
        schema: String,
        /// Length of the raw response
        length: usize,
    },
    /// A required field is absent or has the wrong type
    #[display("{} response is missing required field '{}' ({})", schema, field, expected)]
    MissingField {
        /// Schema that was requested
        schema: String,
        /// Missing field
        field: String,
        /// Expected JSON type
        expected: String,
    },
    /// JSON was found but does not deserialize into the schema type
    #[display("{} response does not match schema: {}", schema, message)]
    Schema {
        /// Schema that was requested
        schema: String,
        /// Deserialization message
        message: String,
    },
}

/// Parse error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Parse Error: {} at line {} in {}", kind, line, file)]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ParseError {
    /// Create a new parse error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ParseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
