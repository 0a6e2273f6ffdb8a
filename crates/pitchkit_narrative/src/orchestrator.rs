//! Research, script, prompt and asset stages for one brand.

use crate::{derive_media_prompts, parse_research, parse_script, research_prompt, script_prompt};
use pitchkit_config::MediaConfig;
use pitchkit_core::{
    Asset, AssetGenerationReport, AssetMetadata, BrandInfo, CampaignBrief, FailedItem,
    GenerationLimits, GenerationMetadata, MediaKind, MediaPromptSpec, PersistFailure,
    PersistenceReport, PitchKit, ResearchResult, ScriptResult, Session,
};
use pitchkit_error::{
    PitchkitResult, StorageError, StorageErrorKind, UpstreamError, UpstreamErrorKind,
    ValidationError, ValidationErrorKind,
};
use pitchkit_interface::{AssetStorage, ProgressEvent, SessionStore, StoreRequest, TextModel};
use pitchkit_models::{ModelRequestExecutor, asset_url};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

/// Sequences the pitch-kit stages and enforces their data dependencies.
///
/// - [`run_research`](Self::run_research) starts (or replaces) the session
///   for a brand.
/// - [`run_script`](Self::run_script) requires research for the session.
/// - [`extract_media_prompts`](Self::extract_media_prompts) requires a script.
/// - [`generate_assets`](Self::generate_assets) is stateless and isolates
///   per-item failures.
pub struct ContentPipelineOrchestrator {
    text_model: Arc<dyn TextModel>,
    executor: ModelRequestExecutor,
    sessions: Arc<dyn SessionStore>,
    media: MediaConfig,
    storage: Option<Arc<dyn AssetStorage>>,
}

impl std::fmt::Debug for ContentPipelineOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentPipelineOrchestrator")
            .field("text_model", &self.text_model.model_name())
            .field("executor", &self.executor)
            .field("media", &self.media)
            .field(
                "storage",
                &self.storage.as_ref().map(|storage| storage.backend_name().to_string()),
            )
            .finish()
    }
}

impl ContentPipelineOrchestrator {
    /// Creates an orchestrator without asset storage.
    pub fn new(
        text_model: Arc<dyn TextModel>,
        executor: ModelRequestExecutor,
        sessions: Arc<dyn SessionStore>,
        media: MediaConfig,
    ) -> Self {
        Self {
            text_model,
            executor,
            sessions,
            media,
            storage: None,
        }
    }

    /// Attaches a storage backend for [`persist_assets`](Self::persist_assets).
    pub fn with_storage(mut self, storage: Arc<dyn AssetStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// The session store in use.
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Receive polling progress for media jobs.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.executor.subscribe()
    }

    /// Research a brand and store the result as a new session under the
    /// brand's session key, replacing any earlier session for that brand.
    ///
    /// Unparseable model output degrades to placeholder sections.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the brand has no usable name, or the
    /// text model's error if the call itself fails.
    #[instrument(skip(self, brand), fields(brand = %brand.display_name()))]
    pub async fn run_research(&self, brand: &BrandInfo) -> PitchkitResult<ResearchResult> {
        let session_key = brand.session_key()?;
        let prompt = research_prompt(brand)?;

        info!(model = self.text_model.model_name(), "Generating research");
        let response = self.text_model.generate(&prompt).await?;
        let research = parse_research(&response);
        if research.is_degraded() {
            warn!(session_key = %session_key, "Research degraded to placeholder sections");
        }

        self.sessions
            .set(&session_key, Session::new(brand.clone(), research.clone()))
            .await?;
        info!(session_key = %session_key, "Research stored");
        Ok(research)
    }

    /// Generate a script for a session that already has research.
    ///
    /// Storing the script discards media prompts derived from any earlier one.
    ///
    /// # Errors
    ///
    /// - `ValidationErrorKind::MissingResearch` if the session has no research
    /// - text model errors
    /// - parse errors if the response has no usable sections
    #[instrument(skip(self, brief))]
    pub async fn run_script(
        &self,
        session_key: &str,
        brief: &CampaignBrief,
    ) -> PitchkitResult<ScriptResult> {
        let mut session = self.require_session(session_key).await?;
        let prompt = script_prompt(&session.brand, &session.research.value, brief)?;

        info!(model = self.text_model.model_name(), "Generating script");
        let response = self.text_model.generate(&prompt).await?;
        let script = parse_script(&response)?;

        session.set_script(script.clone());
        self.sessions.set(session_key, session).await?;
        info!(sections = script.sections.len(), "Script stored");
        Ok(script)
    }

    /// Derive media prompts from the session's script and store them.
    ///
    /// # Errors
    ///
    /// `MissingResearch` if there is no session, `MissingScript` if the
    /// session has no script.
    #[instrument(skip(self))]
    pub async fn extract_media_prompts(
        &self,
        session_key: &str,
    ) -> PitchkitResult<Vec<MediaPromptSpec>> {
        let mut session = self.require_session(session_key).await?;
        let script = session.script.as_ref().ok_or_else(|| {
            ValidationError::new(ValidationErrorKind::MissingScript(session_key.to_string()))
        })?;

        let prompts = derive_media_prompts(&script.value);
        session.set_media_prompts(prompts.clone());
        self.sessions.set(session_key, session).await?;
        info!(prompts = prompts.len(), "Media prompts stored");
        Ok(prompts)
    }

    /// Generate assets for `prompts`, one at a time, within `limits`.
    ///
    /// Prompts beyond a kind's cap are skipped and counted, never invoked.
    /// A failing prompt is logged and recorded in the report; the batch
    /// continues.
    ///
    /// # Errors
    ///
    /// `UpstreamErrorKind::BatchFailed` if at least one prompt was attempted
    /// and none succeeded. An empty or fully skipped batch is not an error.
    #[instrument(skip(self, prompts), fields(total = prompts.len()))]
    pub async fn generate_assets(
        &self,
        prompts: &[MediaPromptSpec],
        limits: GenerationLimits,
    ) -> PitchkitResult<AssetGenerationReport> {
        let report = self.generate_report(prompts, limits).await;
        if all_failed(&report) {
            return Err(UpstreamError::new(UpstreamErrorKind::BatchFailed {
                attempted: report.metadata.attempted(),
                failures: report.failed.iter().map(|item| item.error.clone()).collect(),
            })
            .into());
        }
        Ok(report)
    }

    async fn generate_report(
        &self,
        prompts: &[MediaPromptSpec],
        limits: GenerationLimits,
    ) -> AssetGenerationReport {
        let mut report = AssetGenerationReport {
            metadata: GenerationMetadata {
                total_requested: prompts.len(),
                ..GenerationMetadata::default()
            },
            ..AssetGenerationReport::default()
        };
        let mut images_attempted = 0;
        let mut animations_attempted = 0;

        for (index, spec) in prompts.iter().enumerate() {
            let attempted = match spec.kind {
                MediaKind::Image => &mut images_attempted,
                MediaKind::Animation => &mut animations_attempted,
            };
            if *attempted >= limits.cap_for(spec.kind) {
                debug!(index, kind = %spec.kind, "Skipping prompt beyond cap");
                report.metadata.skipped_by_cap += 1;
                continue;
            }
            *attempted += 1;

            match self.generate_one(index, spec).await {
                Ok(asset) => {
                    match asset.kind {
                        MediaKind::Image => report.metadata.images_generated += 1,
                        MediaKind::Animation => report.metadata.animations_generated += 1,
                    }
                    report.assets.push(asset);
                }
                Err(e) => {
                    warn!(
                        index,
                        kind = %spec.kind,
                        error = %e,
                        "Asset generation failed, continuing"
                    );
                    report.failed.push(FailedItem {
                        prompt_index: index,
                        kind: spec.kind,
                        prompt: spec.prompt.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report.metadata.total_generated = report.assets.len();
        report.metadata.failed = report.failed.len();

        if all_failed(&report) {
            error!(
                attempted = report.metadata.attempted(),
                "Every asset generation attempt failed"
            );
        } else {
            info!(
                generated = report.metadata.total_generated,
                failed = report.metadata.failed,
                skipped = report.metadata.skipped_by_cap,
                "Asset generation finished"
            );
        }
        report
    }

    /// Hand each asset to the storage backend.
    ///
    /// Failures are logged and recorded; the remaining assets are still
    /// stored.
    ///
    /// # Errors
    ///
    /// `StorageErrorKind::Unavailable` if no storage backend is attached.
    #[instrument(skip(self, assets), fields(count = assets.len()))]
    pub async fn persist_assets(
        &self,
        session_key: &str,
        owner_key: &str,
        assets: &[Asset],
    ) -> PitchkitResult<PersistenceReport> {
        let storage = self.storage.as_ref().ok_or_else(|| {
            StorageError::new(StorageErrorKind::Unavailable(
                "no storage backend configured".to_string(),
            ))
        })?;

        let mut report = PersistenceReport::default();
        for (position, asset) in assets.iter().enumerate() {
            let request = StoreRequest {
                asset_url: asset.url.clone(),
                file_name: file_name_for(asset, position),
                owner_key: owner_key.to_string(),
                session_key: session_key.to_string(),
                kind: asset.kind,
            };
            match storage.store(&request).await {
                Ok(stored) => {
                    debug!(id = %stored.id, url = %stored.url, "Asset stored");
                    report.saved.push(stored);
                }
                Err(e) => {
                    warn!(url = %asset.url, error = %e, "Failed to store asset, dropping it");
                    report.failed.push(PersistFailure {
                        asset_url: request.asset_url,
                        file_name: request.file_name,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            saved = report.saved.len(),
            failed = report.failed.len(),
            backend = storage.backend_name(),
            "Asset persistence finished"
        );
        Ok(report)
    }

    /// Run every stage for one brand.
    ///
    /// Assets are persisted when a storage backend is attached, under
    /// `owner_key` (or the session key when absent).
    ///
    /// A failed asset batch does not fail the run: the kit is returned with
    /// every failure recorded in its asset report.
    ///
    /// # Errors
    ///
    /// Research, script or prompt stage errors, and storage being
    /// unreachable.
    #[instrument(
        skip(self, brand, brief, limits, owner_key),
        fields(brand = %brand.display_name())
    )]
    pub async fn run_pitch_kit(
        &self,
        brand: &BrandInfo,
        brief: &CampaignBrief,
        limits: GenerationLimits,
        owner_key: Option<&str>,
    ) -> PitchkitResult<PitchKit> {
        let session_key = brand.session_key()?;
        let research = self.run_research(brand).await?;
        let script = self.run_script(&session_key, brief).await?;
        let media_prompts = self.extract_media_prompts(&session_key).await?;
        let assets = self.generate_report(&media_prompts, limits).await;

        let persisted = match &self.storage {
            Some(_) => Some(
                self.persist_assets(&session_key, owner_key.unwrap_or(&session_key), &assets.assets)
                    .await?,
            ),
            None => None,
        };

        Ok(PitchKit {
            session_key,
            research,
            script,
            media_prompts,
            assets,
            persisted,
        })
    }

    async fn require_session(&self, session_key: &str) -> PitchkitResult<Session> {
        if session_key.trim().is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::EmptySessionKey).into());
        }
        self.sessions.get(session_key).await?.ok_or_else(|| {
            warn!(session_key, "No research for session");
            ValidationError::new(ValidationErrorKind::MissingResearch(session_key.to_string()))
                .into()
        })
    }

    async fn generate_one(&self, index: usize, spec: &MediaPromptSpec) -> PitchkitResult<Asset> {
        let model = match spec.kind {
            MediaKind::Image => self.media.image_model(),
            MediaKind::Animation => self.media.animation_model(),
        };
        let prompt = spec.model_prompt();
        let input = self.model_input(spec, &prompt);

        let (data, request_id, mode) = self.executor.execute(model, &input).await?.into_parts();
        let url = asset_url(&data, spec.kind).ok_or_else(|| {
            warn!(model = %model, "Output has no asset URL");
            UpstreamError::new(UpstreamErrorKind::MissingOutput(model.clone()))
        })?;

        Ok(Asset {
            kind: spec.kind,
            url,
            metadata: AssetMetadata {
                prompt_index: index,
                prompt,
                model: model.clone(),
                request_id,
                mode,
                section_title: spec.section_title.clone(),
            },
        })
    }

    fn model_input(&self, spec: &MediaPromptSpec, prompt: &str) -> Value {
        match spec.kind {
            MediaKind::Image => json!({
                "prompt": prompt,
                "image_size": self.media.image_size(),
                "num_images": 1,
            }),
            MediaKind::Animation => {
                let seconds = spec
                    .duration
                    .as_deref()
                    .and_then(leading_seconds)
                    .unwrap_or(*self.media.animation_duration_secs());
                json!({
                    "prompt": prompt,
                    "duration": seconds.to_string(),
                })
            }
        }
    }
}

/// Leading whole seconds of a duration like `"5"`, `"5s"` or `"4 seconds"`.
/// At least one prompt was attempted and none produced an asset.
fn all_failed(report: &AssetGenerationReport) -> bool {
    report.assets.is_empty() && !report.failed.is_empty()
}

fn leading_seconds(duration: &str) -> Option<u32> {
    let digits: String = duration
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok().filter(|secs| *secs > 0)
}

/// Storage file name: kind, position and the source URL's extension.
fn file_name_for(asset: &Asset, position: usize) -> String {
    let extension = asset
        .url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| match asset.kind {
            MediaKind::Image => "png".to_string(),
            MediaKind::Animation => "mp4".to_string(),
        });
    format!("{}-{}.{}", asset.kind, position + 1, extension)
}
