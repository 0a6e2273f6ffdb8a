//! Test utilities for pitchkit_models tests.
//!
//! Provides a scripted [`MockMediaBackend`] that records every call.

#![allow(dead_code)]

use async_trait::async_trait;
use pitchkit_error::{PitchkitResult, UpstreamError, UpstreamErrorKind};
use pitchkit_interface::{JobHandle, JobState, MediaBackend, MediaResponse, StatusReport};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::Instant;

/// What an entry point answers.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Inline output
    Output(Value),
    /// A polling handle
    Pending,
    /// Success without output
    Empty,
    /// Non-2xx status
    Http(u16),
}

/// What the status endpoint answers.
#[derive(Debug, Clone)]
pub enum MockStatus {
    Pending,
    InProgress,
    Unrecognised(&'static str),
    Completed(Option<Value>),
    Failed(&'static str),
    Http(u16),
    /// Never answers
    Hang,
}

/// Scripted media backend.
///
/// Reply queues are consumed in order; once a queue is down to its last
/// entry, that entry repeats.
pub struct MockMediaBackend {
    request_replies: Mutex<VecDeque<MockReply>>,
    submit_replies: Mutex<VecDeque<MockReply>>,
    statuses: Mutex<VecDeque<MockStatus>>,
    fetch_result: Value,
    request_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    status_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    status_instants: Mutex<Vec<Instant>>,
    jobs: AtomicUsize,
}

pub fn image_output(url: &str) -> Value {
    json!({"images": [{"url": url, "content_type": "image/png"}], "seed": 1})
}

fn take(queue: &Mutex<VecDeque<MockReply>>) -> MockReply {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue.front().cloned().unwrap_or(MockReply::Empty)
    }
}

fn http_error(status_code: u16) -> UpstreamError {
    UpstreamError::new(UpstreamErrorKind::HttpStatus {
        status_code,
        message: format!("mock status {}", status_code),
    })
}

impl MockMediaBackend {
    /// Synchronous entry point answers with `output`; queue answers empty.
    pub fn new_success(output: Value) -> Self {
        Self::scripted(vec![MockReply::Output(output)], vec![MockReply::Empty])
    }

    pub fn scripted(request: Vec<MockReply>, submit: Vec<MockReply>) -> Self {
        Self {
            request_replies: Mutex::new(request.into()),
            submit_replies: Mutex::new(submit.into()),
            statuses: Mutex::new(VecDeque::from([MockStatus::Pending])),
            fetch_result: Value::Null,
            request_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            status_instants: Mutex::new(Vec::new()),
            jobs: AtomicUsize::new(0),
        }
    }

    pub fn with_statuses(self, statuses: Vec<MockStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn with_fetch_result(mut self, value: Value) -> Self {
        self.fetch_result = value;
        self
    }

    pub fn request_calls(&self) -> usize {
        self.request_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// When each status check happened.
    pub fn status_instants(&self) -> Vec<Instant> {
        self.status_instants.lock().unwrap().clone()
    }

    fn answer(&self, model_id: &str, reply: MockReply) -> PitchkitResult<MediaResponse> {
        match reply {
            MockReply::Output(data) => Ok(MediaResponse::Output {
                data,
                request_id: Some("req-inline".to_string()),
            }),
            MockReply::Pending => {
                let n = self.jobs.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(MediaResponse::Pending(JobHandle {
                    status_url: format!(
                        "https://queue.test/{}/requests/req-{}/status",
                        model_id, n
                    ),
                    response_url: None,
                    request_id: Some(format!("req-{}", n)),
                }))
            }
            MockReply::Empty => Ok(MediaResponse::Empty { request_id: None }),
            MockReply::Http(code) => Err(http_error(code).into()),
        }
    }
}

#[async_trait]
impl MediaBackend for MockMediaBackend {
    async fn request(&self, model_id: &str, _input: &Value) -> PitchkitResult<MediaResponse> {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(model_id, take(&self.request_replies))
    }

    async fn submit(&self, model_id: &str, _input: &Value) -> PitchkitResult<MediaResponse> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(model_id, take(&self.submit_replies))
    }

    async fn status(&self, _handle: &JobHandle) -> PitchkitResult<StatusReport> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status_instants.lock().unwrap().push(Instant::now());

        let status = {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.pop_front().unwrap()
            } else {
                statuses.front().cloned().unwrap_or(MockStatus::Pending)
            }
        };

        match status {
            MockStatus::Pending => Ok(StatusReport::new(JobState::Pending)),
            MockStatus::InProgress => Ok(StatusReport {
                logs: vec!["rendering".to_string()],
                ..StatusReport::new(JobState::InProgress)
            }),
            MockStatus::Unrecognised(raw) => Ok(StatusReport {
                raw_status: raw.to_string(),
                ..StatusReport::new(JobState::parse(raw))
            }),
            MockStatus::Completed(output) => Ok(StatusReport {
                output,
                ..StatusReport::new(JobState::Completed)
            }),
            MockStatus::Failed(message) => Ok(StatusReport {
                error: Some(message.to_string()),
                ..StatusReport::new(JobState::Failed)
            }),
            MockStatus::Http(code) => Err(http_error(code).into()),
            MockStatus::Hang => std::future::pending().await,
        }
    }

    async fn fetch_result(&self, _handle: &JobHandle) -> PitchkitResult<Value> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fetch_result.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
