//! Immediate-then-queued media model invocation.

use crate::PollingCoordinator;
use derive_getters::Getters;
use pitchkit_config::PollingConfig;
use pitchkit_core::{GenerationJob, GenerationMode};
use pitchkit_error::{PitchkitResult, UpstreamError, UpstreamErrorKind};
use pitchkit_interface::{MediaBackend, MediaResponse, ProgressEvent};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

/// Normalized outcome of one model invocation, regardless of how the
/// provider executed it.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ExecutionResult {
    /// Output payload
    data: Value,
    /// Provider request id, when known
    request_id: Option<String>,
    /// Which entry point produced the output
    mode: GenerationMode,
}

impl ExecutionResult {
    /// Split into `(data, request_id, mode)`.
    pub fn into_parts(self) -> (Value, Option<String>, GenerationMode) {
        (self.data, self.request_id, self.mode)
    }
}

/// Invokes media models through the synchronous entry point first and the
/// queue second.
///
/// 1. The synchronous call is tried. Inline output is returned; a polling
///    handle is polled to completion and its outcome returned as is.
/// 2. If the synchronous call fails (a 404 means the model is only served
///    through the queue) or answers without output, the job is submitted to
///    the queue, polling again if handed a handle.
/// 3. A queued submission without output is a hard failure.
pub struct ModelRequestExecutor {
    backend: Arc<dyn MediaBackend>,
    poller: PollingCoordinator,
}

impl std::fmt::Debug for ModelRequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRequestExecutor")
            .field("backend", &self.backend.provider_name())
            .field("poller", &self.poller)
            .finish()
    }
}

impl ModelRequestExecutor {
    /// Creates an executor over a media backend.
    pub fn new(backend: Arc<dyn MediaBackend>, polling: PollingConfig) -> Self {
        Self {
            backend,
            poller: PollingCoordinator::new(polling),
        }
    }

    /// Creates an executor with a preconfigured poller.
    pub fn with_poller(backend: Arc<dyn MediaBackend>, poller: PollingCoordinator) -> Self {
        Self { backend, poller }
    }

    /// Receive progress events from jobs this executor polls.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.poller.subscribe()
    }

    /// The media backend in use.
    pub fn backend(&self) -> &Arc<dyn MediaBackend> {
        &self.backend
    }

    /// Invoke `model_id` with `input` and return its output.
    ///
    /// # Errors
    ///
    /// - errors from polling a synchronous handle (no queue fallback)
    /// - errors from the queued submission or its polling
    /// - `UpstreamErrorKind::MissingOutput` if the queue answers without output
    #[instrument(skip(self, input), fields(provider = self.backend.provider_name()))]
    pub async fn execute(&self, model_id: &str, input: &Value) -> PitchkitResult<ExecutionResult> {
        let mut job = GenerationJob::new(model_id, input.clone());

        match self.backend.request(model_id, input).await {
            Ok(MediaResponse::Output { data, request_id }) => {
                debug!(request_id = ?request_id, "Immediate execution returned output");
                return Ok(ExecutionResult {
                    data,
                    request_id,
                    mode: GenerationMode::Immediate,
                });
            }
            Ok(MediaResponse::Pending(handle)) => {
                job.status_url = Some(handle.status_url.clone());
                job.request_id = handle.request_id.clone();
                debug!(job = ?job, "Immediate execution returned a polling handle");
                let data = self.poller.poll(self.backend.as_ref(), &handle, Some(model_id)).await?;
                return Ok(ExecutionResult {
                    data,
                    request_id: handle.request_id,
                    mode: GenerationMode::Immediate,
                });
            }
            Ok(MediaResponse::Empty { request_id }) => {
                warn!(
                    request_id = ?request_id,
                    "Immediate execution returned no output, falling back to queue"
                );
            }
            Err(e) if e.upstream_kind().is_some_and(UpstreamErrorKind::is_not_found) => {
                info!("Model not served synchronously, falling back to queue");
            }
            Err(e) => {
                warn!(error = %e, "Immediate execution failed, falling back to queue");
            }
        }

        job.mode = GenerationMode::Queued;
        match self.backend.submit(model_id, input).await? {
            MediaResponse::Output { data, request_id } => {
                debug!(request_id = ?request_id, "Queued submission returned output");
                Ok(ExecutionResult {
                    data,
                    request_id,
                    mode: GenerationMode::Queued,
                })
            }
            MediaResponse::Pending(handle) => {
                job.status_url = Some(handle.status_url.clone());
                job.request_id = handle.request_id.clone();
                debug!(job = ?job, "Queued submission returned a polling handle");
                let data = self.poller.poll(self.backend.as_ref(), &handle, Some(model_id)).await?;
                Ok(ExecutionResult {
                    data,
                    request_id: handle.request_id,
                    mode: GenerationMode::Queued,
                })
            }
            MediaResponse::Empty { request_id } => {
                warn!(request_id = ?request_id, "Queued submission returned no output");
                Err(
                    UpstreamError::new(UpstreamErrorKind::MissingOutput(model_id.to_string()))
                        .into(),
                )
            }
        }
    }
}
