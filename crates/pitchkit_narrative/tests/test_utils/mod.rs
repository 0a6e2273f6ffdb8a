//! Test utilities for pitchkit_narrative tests.

#![allow(dead_code)]

use async_trait::async_trait;
use pitchkit_config::{MediaConfig, PollingConfig};
use pitchkit_core::{MediaKind, StoredAsset};
use pitchkit_error::{
    PitchkitResult, StorageError, StorageErrorKind, UpstreamError, UpstreamErrorKind,
};
use pitchkit_interface::{
    AssetStorage, JobHandle, JobState, MediaBackend, MediaResponse, StatusReport, StoreRequest,
    TextModel,
};
use pitchkit_models::ModelRequestExecutor;
use pitchkit_narrative::{ContentPipelineOrchestrator, InMemorySessionStore};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const RESEARCH_JSON: &str = r#"```json
{
  "brandEssence": {"purpose": "Make the impossible ordinary", "personality": "inventive"},
  "creativeOpportunities": {"angle": "catalogue of mishaps"},
  "strategicContext": {"market": "desert logistics"},
  "brandVoice": {"tone": "deadpan"},
  "implementation": {"channels": "billboards"}
}
```"#;

pub const SCRIPT_JSON: &str = r#"Here is your script:
{
  "sections": [
    {
      "sectionTitle": "Opening",
      "narrativeContent": "A lone road.",
      "keyMessages": "Reliability",
      "visualElements": ["desert highway at dawn", {"description": "crate marked ACME", "style": "pulp"}],
      "motionTransitions": "slow dolly along the road"
    },
    {
      "sectionTitle": "Payoff",
      "narrativeContent": "Delivery arrives.",
      "visualElements": [[{"image": "anvil mid-air", "mood": "tense"}]]
    }
  ],
  "transitions": ["cut to black"]
}"#;

/// Text model answering from a queue; the last answer repeats.
///
/// `Err(code)` entries answer with an HTTP status error.
pub struct MockTextModel {
    responses: Mutex<VecDeque<Result<String, u16>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockTextModel {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status_code: u16) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([Err(status_code)])),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextModel for MockTextModel {
    async fn generate(&self, prompt: &str) -> PitchkitResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let response = {
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.pop_front().unwrap()
            } else {
                responses.front().cloned().unwrap()
            }
        };
        response.map_err(|status_code| {
            UpstreamError::new(UpstreamErrorKind::HttpStatus {
                status_code,
                message: "mock text failure".to_string(),
            })
            .into()
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-text"
    }
}

/// Media backend that answers synchronously, failing any prompt containing
/// `FAIL` on both entry points.
#[derive(Default)]
pub struct MockMediaBackend {
    request_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    inputs: Mutex<Vec<(String, Value)>>,
}

impl MockMediaBackend {
    pub fn request_calls(&self) -> usize {
        self.request_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// `(model_id, input)` of every synchronous call.
    pub fn inputs(&self) -> Vec<(String, Value)> {
        self.inputs.lock().unwrap().clone()
    }

    fn answer(&self, model_id: &str, input: &Value) -> PitchkitResult<MediaResponse> {
        let prompt = input["prompt"].as_str().unwrap_or_default();
        if prompt.contains("FAIL") {
            return Err(UpstreamError::new(UpstreamErrorKind::HttpStatus {
                status_code: 500,
                message: format!("cannot render '{}'", prompt),
            })
            .into());
        }
        let n = self.request_calls() + self.submit_calls();
        let data = if model_id.contains("video") {
            json!({"video": {"url": format!("https://cdn.test/clip-{}.mp4", n)}})
        } else {
            json!({"images": [{"url": format!("https://cdn.test/image-{}.png", n)}]})
        };
        Ok(MediaResponse::Output {
            data,
            request_id: Some(format!("req-{}", n)),
        })
    }
}

#[async_trait]
impl MediaBackend for MockMediaBackend {
    async fn request(&self, model_id: &str, input: &Value) -> PitchkitResult<MediaResponse> {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        self.inputs
            .lock()
            .unwrap()
            .push((model_id.to_string(), input.clone()));
        self.answer(model_id, input)
    }

    async fn submit(&self, model_id: &str, input: &Value) -> PitchkitResult<MediaResponse> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(model_id, input)
    }

    async fn status(&self, _handle: &JobHandle) -> PitchkitResult<StatusReport> {
        Ok(StatusReport::new(JobState::Pending))
    }

    async fn fetch_result(&self, _handle: &JobHandle) -> PitchkitResult<Value> {
        Ok(Value::Null)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Storage that fails for URLs containing `broken`.
#[derive(Default)]
pub struct MockStorage {
    stored: Mutex<Vec<StoreRequest>>,
}

impl MockStorage {
    pub fn stored(&self) -> Vec<StoreRequest> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStorage for MockStorage {
    async fn store(&self, request: &StoreRequest) -> PitchkitResult<StoredAsset> {
        if request.asset_url.contains("broken") {
            return Err(
                StorageError::new(StorageErrorKind::Download(request.asset_url.clone())).into(),
            );
        }
        self.stored.lock().unwrap().push(request.clone());
        let kind_dir = match request.kind {
            MediaKind::Image => "images",
            MediaKind::Animation => "animations",
        };
        Ok(StoredAsset {
            id: format!("asset-{}", self.stored.lock().unwrap().len()),
            url: format!(
                "mem://{}/{}/{}/{}",
                request.owner_key, request.session_key, kind_dir, request.file_name
            ),
            name: request.file_name.clone(),
            kind: request.kind,
        })
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

pub struct Harness {
    pub orchestrator: ContentPipelineOrchestrator,
    pub text: Arc<MockTextModel>,
    pub media: Arc<MockMediaBackend>,
    pub sessions: Arc<InMemorySessionStore>,
}

pub fn harness(text: MockTextModel) -> Harness {
    let text = Arc::new(text);
    let media = Arc::new(MockMediaBackend::default());
    let sessions = Arc::new(InMemorySessionStore::new());
    let media_config = MediaConfig::default()
        .with_image_model("test/image")
        .with_animation_model("test/video");
    let orchestrator = ContentPipelineOrchestrator::new(
        text.clone(),
        ModelRequestExecutor::new(media.clone(), PollingConfig::default()),
        sessions.clone(),
        media_config,
    );
    Harness {
        orchestrator,
        text,
        media,
        sessions,
    }
}
