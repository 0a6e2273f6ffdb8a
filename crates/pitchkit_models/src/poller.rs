//! Waiting for queued media jobs.

use pitchkit_config::PollingConfig;
use pitchkit_error::{
    PitchkitError, PitchkitResult, TimeoutError, UpstreamError, UpstreamErrorKind,
};
use pitchkit_interface::{JobHandle, JobState, MediaBackend, ProgressEvent, StatusReport};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};

/// Capacity of the progress event channel. Slow receivers lag, never block.
const EVENT_CAPACITY: usize = 64;

/// Polls a job status endpoint until the job completes, fails, or the
/// configured timeout elapses.
///
/// Progress is published as [`ProgressEvent`]s on a broadcast channel and as
/// tracing events. Neither affects control flow: only the terminal status
/// decides the outcome.
///
/// The wait between checks does not block the runtime, so other sessions'
/// jobs proceed while one is being polled.
#[derive(Debug, Clone)]
pub struct PollingCoordinator {
    config: PollingConfig,
    events: broadcast::Sender<ProgressEvent>,
}

impl PollingCoordinator {
    /// Creates a coordinator with its own event channel.
    pub fn new(config: PollingConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { config, events }
    }

    /// Creates a coordinator publishing on an existing channel.
    pub fn with_events(config: PollingConfig, events: broadcast::Sender<ProgressEvent>) -> Self {
        Self { config, events }
    }

    /// Polling settings in use.
    pub fn config(&self) -> &PollingConfig {
        &self.config
    }

    /// Receive progress events from subsequent polls.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.events.subscribe()
    }

    /// Poll `handle` until it reaches a terminal state and return its output.
    ///
    /// A completed status without inline output is resolved through
    /// [`MediaBackend::fetch_result`]. Retryable errors from the status
    /// endpoint count as a pending check.
    ///
    /// # Errors
    ///
    /// - `UpstreamErrorKind::JobFailed` when the provider reports failure
    /// - `UpstreamErrorKind::MissingOutput` when a completed job has no output
    /// - [`TimeoutError`] once the job is still pending after the timeout, or
    ///   when a single status check does not return before it
    /// - any non-retryable error from the status endpoint
    #[instrument(skip(self, backend, handle), fields(job = %handle.label()))]
    pub async fn poll(
        &self,
        backend: &dyn MediaBackend,
        handle: &JobHandle,
        model_id: Option<&str>,
    ) -> PitchkitResult<Value> {
        let started = Instant::now();
        let timeout = self.config.timeout();
        let mut check: u32 = 0;

        loop {
            check += 1;
            let remaining = timeout.saturating_sub(started.elapsed());
            let status = match tokio::time::timeout(remaining, backend.status(handle)).await {
                Ok(status) => status,
                Err(_) => {
                    warn!(check, "Status check outlived the polling timeout");
                    return Err(self.timed_out(handle, started, timeout, check));
                }
            };
            let report = match status {
                Ok(report) => report,
                Err(e) if e.upstream_kind().is_some_and(|kind| kind.is_retryable()) => {
                    warn!(check, error = %e, "Status check failed, treating job as pending");
                    StatusReport::new(JobState::Pending)
                }
                Err(e) => return Err(e),
            };
            let elapsed = started.elapsed();

            self.publish(handle, model_id, &report, check, elapsed.as_millis() as u64);

            match report.state {
                JobState::Completed => {
                    info!(check, elapsed_ms = elapsed.as_millis() as u64, "Job completed");
                    return self
                        .completed_output(backend, handle, model_id, report.output)
                        .await;
                }
                JobState::Failed => {
                    let message = report
                        .error
                        .unwrap_or_else(|| format!("provider reported {}", report.raw_status));
                    warn!(check, error = %message, "Job failed");
                    return Err(UpstreamError::new(UpstreamErrorKind::JobFailed {
                        request_id: handle.label().to_string(),
                        message,
                    })
                    .into());
                }
                JobState::Unknown => {
                    warn!(
                        check,
                        status = %report.raw_status,
                        "Unrecognised job status, still waiting"
                    );
                }
                JobState::Pending | JobState::InProgress => {
                    debug!(check, state = %report.state, "Job not finished");
                }
            }

            if elapsed >= timeout {
                warn!(check, elapsed_ms = elapsed.as_millis() as u64, "Job polling timed out");
                return Err(self.timed_out(handle, started, timeout, check));
            }

            let wait = self.config.interval_for_check(check).min(timeout - elapsed);
            sleep(wait).await;
        }
    }

    fn timed_out(
        &self,
        handle: &JobHandle,
        started: Instant,
        timeout: Duration,
        check: u32,
    ) -> PitchkitError {
        TimeoutError::new(
            handle.label(),
            started.elapsed().as_millis() as u64,
            timeout.as_millis() as u64,
            check,
        )
        .into()
    }

    async fn completed_output(
        &self,
        backend: &dyn MediaBackend,
        handle: &JobHandle,
        model_id: Option<&str>,
        inline: Option<Value>,
    ) -> PitchkitResult<Value> {
        let output = match inline {
            Some(output) => output,
            None => {
                debug!("Completed status carried no output, fetching result");
                backend.fetch_result(handle).await?
            }
        };

        if output.is_null() {
            return Err(UpstreamError::new(UpstreamErrorKind::MissingOutput(
                model_id.unwrap_or(handle.label()).to_string(),
            ))
            .into());
        }
        Ok(output)
    }

    fn publish(
        &self,
        handle: &JobHandle,
        model_id: Option<&str>,
        report: &StatusReport,
        check: u32,
        elapsed_ms: u64,
    ) {
        let mut messages = report.logs.clone();
        if let Some(position) = report.queue_position {
            messages.push(format!("queue position {}", position));
        }
        for message in &messages {
            debug!(check, message = %message, "Job progress");
        }

        // No subscribers is fine
        let _ = self.events.send(ProgressEvent {
            job: handle.label().to_string(),
            model_id: model_id.map(str::to_string),
            state: report.state,
            check,
            elapsed_ms,
            messages,
        });
    }
}
