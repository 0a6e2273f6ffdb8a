//! Upstream (model and storage backend) error types and retry logic.

/// Failure conditions reported by, or observed while talking to, an
/// external generative-model backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum UpstreamErrorKind {
    /// Transport-level failure (connect, TLS, body read)
    #[display("Request to {} failed: {}", endpoint, message)]
    Request {
        /// Endpoint or model being called
        endpoint: String,
        /// Error message
        message: String,
    },
    /// Non-2xx HTTP response
    #[display("HTTP {} error: {}", status_code, message)]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Response body or reason
        message: String,
    },
    /// Response body did not have the expected shape
    #[display("Invalid response from {}: {}", endpoint, message)]
    InvalidResponse {
        /// Endpoint or model being called
        endpoint: String,
        /// What was wrong with it
        message: String,
    },
    /// Text model returned no candidate text
    #[display("Model '{}' returned an empty response", _0)]
    EmptyResponse(String),
    /// An asynchronous job reported FAILED
    #[display("Job {} failed: {}", request_id, message)]
    JobFailed {
        /// Provider request id
        request_id: String,
        /// Provider-reported error
        message: String,
    },
    /// Invocation finished without an output payload
    #[display("Model '{}' completed without output", _0)]
    MissingOutput(String),
    /// Every item of a generation batch failed
    #[display("All {} generation attempts failed: {}", attempted, failures.join("; "))]
    BatchFailed {
        /// Number of items attempted
        attempted: usize,
        /// One message per failed item
        failures: Vec<String>,
    },
}

impl UpstreamErrorKind {
    /// True when the backend signalled that the synchronous entry point does
    /// not exist for the model, meaning it must go through the queue instead.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamErrorKind::HttpStatus { status_code: 404, .. })
    }

    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamErrorKind::HttpStatus { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            UpstreamErrorKind::Request { .. } => true,
            _ => false,
        }
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            UpstreamErrorKind::HttpStatus { status_code, .. } => match *status_code {
                429 => (5000, 3, 40),
                503 => (2000, 5, 60),
                500 | 502 | 504 => (1000, 3, 8),
                408 => (2000, 4, 30),
                _ => (2000, 5, 60),
            },
            UpstreamErrorKind::Request { .. } => (1000, 3, 10),
            _ => (2000, 5, 60),
        }
    }
}

/// Upstream error with source location tracking.
///
/// # Examples
///
/// ```
/// use pitchkit_error::{UpstreamError, UpstreamErrorKind};
///
/// let err = UpstreamError::new(UpstreamErrorKind::HttpStatus {
///     status_code: 404,
///     message: "Not Found".to_string(),
/// });
/// assert!(err.kind.is_not_found());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Upstream Error: {} at line {} in {}", kind, line, file)]
pub struct UpstreamError {
    /// The kind of error that occurred
    pub kind: UpstreamErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl UpstreamError {
    /// Create a new UpstreamError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: UpstreamErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use pitchkit_error::{RetryableError, UpstreamError, UpstreamErrorKind};
///
/// let err = UpstreamError::new(UpstreamErrorKind::HttpStatus {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
///
/// assert!(err.is_retryable());
/// let (backoff, retries, _max_delay) = err.retry_strategy_params();
/// assert_eq!(backoff, 2000);
/// assert_eq!(retries, 5);
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503, 429 or transport failures return true.
    /// Permanent errors like 400 or 404 return false.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (2000, 5, 60)
    }
}

impl RetryableError for UpstreamError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}
