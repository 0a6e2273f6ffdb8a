//! Wire-level value types exchanged with collaborators.

use pitchkit_core::MediaKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Handle for polling a queued job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle {
    /// Status endpoint
    pub status_url: String,
    /// Result endpoint, if the provider issued one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,
    /// Provider request id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl JobHandle {
    /// Request id if known, otherwise the status URL. Used in logs and errors.
    pub fn label(&self) -> &str {
        self.request_id.as_deref().unwrap_or(&self.status_url)
    }
}

/// What a media entry point answered.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaResponse {
    /// The output is available now
    Output {
        /// Output payload
        data: Value,
        /// Provider request id
        request_id: Option<String>,
    },
    /// The job was queued and must be polled
    Pending(JobHandle),
    /// The call succeeded but carried no output payload
    Empty {
        /// Provider request id
        request_id: Option<String>,
    },
}

impl MediaResponse {
    /// Classify a response body.
    ///
    /// A body with a `status_url` is a pending job. A body with an `output`
    /// key is unwrapped; a null output is empty. Any other non-empty body is
    /// the output itself. `fallback_request_id` (e.g. from a response
    /// header) is used when the body names none.
    ///
    /// # Examples
    ///
    /// ```
    /// use pitchkit_interface::MediaResponse;
    /// use serde_json::json;
    ///
    /// let pending = MediaResponse::from_json(
    ///     json!({"status_url": "https://queue/req-1/status", "request_id": "req-1"}),
    ///     None,
    /// );
    /// assert!(matches!(pending, MediaResponse::Pending(_)));
    ///
    /// let output = MediaResponse::from_json(json!({"images": [{"url": "https://cdn/a.png"}]}), None);
    /// assert!(matches!(output, MediaResponse::Output { .. }));
    /// ```
    pub fn from_json(body: Value, fallback_request_id: Option<String>) -> Self {
        let request_id = body
            .get("request_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or(fallback_request_id);

        if let Some(status_url) = body.get("status_url").and_then(Value::as_str) {
            return MediaResponse::Pending(JobHandle {
                status_url: status_url.to_string(),
                response_url: body
                    .get("response_url")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                request_id,
            });
        }

        let data = match body {
            Value::Object(mut map) if map.contains_key("output") => {
                map.remove("output").unwrap_or(Value::Null)
            }
            other => other,
        };

        if is_empty_payload(&data) {
            MediaResponse::Empty { request_id }
        } else {
            MediaResponse::Output { data, request_id }
        }
    }

    /// Provider request id, when known.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            MediaResponse::Output { request_id, .. } | MediaResponse::Empty { request_id } => {
                request_id.as_deref()
            }
            MediaResponse::Pending(handle) => handle.request_id.as_deref(),
        }
    }
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Normalized state of a queued job.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum JobState {
    /// Waiting to start
    #[strum(to_string = "PENDING", serialize = "IN_QUEUE", serialize = "QUEUED")]
    Pending,
    /// Running
    #[strum(to_string = "IN_PROGRESS", serialize = "RUNNING", serialize = "PROCESSING")]
    InProgress,
    /// Finished successfully
    #[strum(to_string = "COMPLETED", serialize = "SUCCEEDED", serialize = "OK")]
    Completed,
    /// Finished unsuccessfully
    #[strum(to_string = "FAILED", serialize = "ERROR", serialize = "CANCELLED")]
    Failed,
    /// A status the provider documents nowhere; treated as still running
    #[strum(to_string = "UNKNOWN")]
    Unknown,
}

impl JobState {
    /// Parse a provider status string, mapping unrecognised values to
    /// [`JobState::Unknown`].
    pub fn parse(status: &str) -> Self {
        JobState::from_str(status.trim()).unwrap_or(JobState::Unknown)
    }

    /// True for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// One answer from a job status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Normalized state
    pub state: JobState,
    /// Status string as the provider sent it
    pub raw_status: String,
    /// Output payload, when the provider inlines it
    #[serde(default)]
    pub output: Option<Value>,
    /// Provider-reported error
    #[serde(default)]
    pub error: Option<String>,
    /// Progress log lines
    #[serde(default)]
    pub logs: Vec<String>,
    /// Position in the provider's queue
    #[serde(default)]
    pub queue_position: Option<u64>,
}

impl StatusReport {
    /// Report for a given state with nothing else attached.
    pub fn new(state: JobState) -> Self {
        Self {
            state,
            raw_status: state.to_string(),
            output: None,
            error: None,
            logs: Vec::new(),
            queue_position: None,
        }
    }

    /// Parse a status endpoint body.
    ///
    /// # Examples
    ///
    /// ```
    /// use pitchkit_interface::{JobState, StatusReport};
    /// use serde_json::json;
    ///
    /// let report = StatusReport::from_json(&json!({
    ///     "status": "IN_QUEUE",
    ///     "queue_position": 3,
    ///     "logs": [{"message": "warming up"}]
    /// }));
    ///
    /// assert_eq!(report.state, JobState::Pending);
    /// assert_eq!(report.queue_position, Some(3));
    /// assert_eq!(report.logs, vec!["warming up".to_string()]);
    /// ```
    pub fn from_json(body: &Value) -> Self {
        let raw_status = body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let output = body
            .get("output")
            .filter(|value| !is_empty_payload(value))
            .cloned();

        let error = body.get("error").and_then(|error| match error {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| Some(error.to_string())),
            other => Some(other.to_string()),
        });

        let logs = body
            .get("logs")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| match entry {
                        Value::String(text) => Some(text.clone()),
                        Value::Object(map) => {
                            map.get("message").and_then(Value::as_str).map(str::to_string)
                        }
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            state: JobState::parse(&raw_status),
            raw_status,
            output,
            error,
            logs,
            queue_position: body.get("queue_position").and_then(Value::as_u64),
        }
    }
}

/// Observable progress of a polled job. Never influences control flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Provider request id or status URL
    pub job: String,
    /// Model being invoked, when known
    #[serde(default)]
    pub model_id: Option<String>,
    /// State reported by this check
    pub state: JobState,
    /// 1-based check number
    pub check: u32,
    /// Time since polling started
    pub elapsed_ms: u64,
    /// Log lines or queue position reported by the provider
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Input to [`crate::AssetStorage::store`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreRequest {
    /// Source URL of the generated asset
    pub asset_url: String,
    /// Desired file name
    pub file_name: String,
    /// Owner (e.g. the requesting user or workspace)
    pub owner_key: String,
    /// Session the asset belongs to
    pub session_key: String,
    /// Image or animation
    pub kind: MediaKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_vocabulary() {
        assert_eq!(JobState::parse("PENDING"), JobState::Pending);
        assert_eq!(JobState::parse("IN_QUEUE"), JobState::Pending);
        assert_eq!(JobState::parse("in_progress"), JobState::InProgress);
        assert_eq!(JobState::parse("COMPLETED"), JobState::Completed);
        assert_eq!(JobState::parse("CANCELLED"), JobState::Failed);
        assert_eq!(JobState::parse("ERROR"), JobState::Failed);
        assert_eq!(JobState::parse("WARMING"), JobState::Unknown);
        assert!(!JobState::Unknown.is_terminal());
    }

    #[test]
    fn test_null_output_is_empty() {
        let response = MediaResponse::from_json(json!({"output": null}), Some("hdr".into()));
        assert_eq!(
            response,
            MediaResponse::Empty {
                request_id: Some("hdr".to_string())
            }
        );
    }

    #[test]
    fn test_wrapped_output_is_unwrapped() {
        let response = MediaResponse::from_json(
            json!({"output": {"video": {"url": "https://cdn/v.mp4"}}, "request_id": "r-9"}),
            Some("ignored".into()),
        );
        match response {
            MediaResponse::Output { data, request_id } => {
                assert_eq!(data["video"]["url"], "https://cdn/v.mp4");
                assert_eq!(request_id.as_deref(), Some("r-9"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_pending_keeps_response_url() {
        let response = MediaResponse::from_json(
            json!({
                "status_url": "https://queue/r/status",
                "response_url": "https://queue/r"
            }),
            Some("r".into()),
        );
        let MediaResponse::Pending(handle) = response else {
            panic!("expected pending");
        };
        assert_eq!(handle.response_url.as_deref(), Some("https://queue/r"));
        assert_eq!(handle.label(), "r");
    }

    #[test]
    fn test_status_error_object_uses_message() {
        let report = StatusReport::from_json(&json!({
            "status": "FAILED",
            "error": {"message": "content policy"}
        }));
        assert_eq!(report.state, JobState::Failed);
        assert_eq!(report.error.as_deref(), Some("content policy"));
    }
}
