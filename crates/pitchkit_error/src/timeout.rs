//! Polling timeout error.

/// An asynchronous job did not reach a terminal state in time.
///
/// # Examples
///
/// ```
/// use pitchkit_error::TimeoutError;
///
/// let err = TimeoutError::new("req-42", 300_000, 300_000, 61);
/// assert!(format!("{}", err).contains("req-42"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display(
    "Timeout Error: job {} still pending after {}ms (limit {}ms, {} checks) at line {} in {}",
    request_id,
    elapsed_ms,
    timeout_ms,
    checks,
    line,
    file
)]
pub struct TimeoutError {
    /// Provider request id of the job
    pub request_id: String,
    /// Time spent polling
    pub elapsed_ms: u64,
    /// Configured limit
    pub timeout_ms: u64,
    /// Number of status checks performed
    pub checks: u32,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TimeoutError {
    /// Create a new timeout error with automatic location tracking.
    #[track_caller]
    pub fn new(
        request_id: impl Into<String>,
        elapsed_ms: u64,
        timeout_ms: u64,
        checks: u32,
    ) -> Self {
        let location = std::panic::Location::caller();
        Self {
            request_id: request_id.into(),
            elapsed_ms,
            timeout_ms,
            checks,
            line: location.line(),
            file: location.file(),
        }
    }
}
