//! Pipeline command handlers.

use pitchkit::{
    BrandInfo, BrandProfile, CampaignBrief, ContentPipelineOrchestrator, FalMediaClient,
    FileSystemStorage, GeminiTextClient, GenerationLimits, InMemorySessionStore,
    ModelRequestExecutor, PitchkitConfig, PitchkitResult, ValidationError, ValidationErrorKind,
};
use std::path::Path;
use std::sync::Arc;

use super::BrandArgs;

/// Options for the `run` command.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Campaign brief
    pub brief: CampaignBrief,
    /// Image cap override
    pub max_images: Option<usize>,
    /// Animation cap override
    pub max_animations: Option<usize>,
    /// Persist generated assets
    pub save: bool,
    /// Owner directory for saved assets
    pub owner: Option<String>,
}

/// Load configuration from an explicit file or the default layers.
pub fn load_config(path: Option<&Path>) -> PitchkitResult<PitchkitConfig> {
    match path {
        Some(path) => PitchkitConfig::from_file(path),
        None => PitchkitConfig::load(),
    }
}

/// Research a brand and print the result.
pub async fn run_research(
    config: &PitchkitConfig,
    brand: &BrandArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let brand = brand_info(brand)?;
    let orchestrator = build_orchestrator(config, false)?;

    let research = orchestrator.run_research(&brand).await?;
    if research.is_degraded() {
        tracing::warn!("Research could not be fully structured; see rawResponse");
    }
    println!("{}", serde_json::to_string_pretty(&research)?);
    Ok(())
}

/// Run the whole pipeline and print the pitch kit.
pub async fn run_pipeline(
    config: &PitchkitConfig,
    brand: &BrandArgs,
    options: RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let brand = brand_info(brand)?;
    let orchestrator = build_orchestrator(config, options.save)?;

    let mut limits = config.limits;
    if let Some(max) = options.max_images {
        limits = limits.with_max_images(max);
    }
    if let Some(max) = options.max_animations {
        limits = limits.with_max_animations(max);
    }

    let mut progress = orchestrator.subscribe();
    let reporter = tokio::spawn(async move {
        while let Ok(event) = progress.recv().await {
            tracing::info!(
                job = %event.job,
                state = ?event.state,
                check = event.check,
                elapsed_ms = event.elapsed_ms,
                "Media job progress"
            );
        }
    });

    let result = orchestrator
        .run_pitch_kit(&brand, &options.brief, limits, options.owner.as_deref())
        .await;
    reporter.abort();

    let kit = result?;
    tracing::info!(
        session_key = %kit.session_key,
        generated = kit.assets.metadata.total_generated,
        skipped = kit.assets.metadata.skipped_by_cap,
        failed = kit.assets.metadata.failed,
        "Pitch kit complete"
    );
    println!("{}", serde_json::to_string_pretty(&kit)?);
    Ok(())
}

fn build_orchestrator(
    config: &PitchkitConfig,
    save: bool,
) -> PitchkitResult<ContentPipelineOrchestrator> {
    let text = Arc::new(GeminiTextClient::new(config.text.clone(), config.retry.clone())?);
    let media = Arc::new(FalMediaClient::new(&config.media)?);
    let sessions = Arc::new(InMemorySessionStore::from_config(&config.session));

    let orchestrator = ContentPipelineOrchestrator::new(
        text,
        ModelRequestExecutor::new(media, config.polling.clone()),
        sessions,
        config.media.clone(),
    );

    if save {
        let storage = FileSystemStorage::new(&config.storage.base_path)?;
        tracing::info!(
            base_path = %config.storage.base_path.display(),
            "Saving assets to filesystem"
        );
        Ok(orchestrator.with_storage(Arc::new(storage)))
    } else {
        Ok(orchestrator)
    }
}

/// Brand input from a file (JSON record or plain text) or from flags.
pub fn brand_info(args: &BrandArgs) -> PitchkitResult<BrandInfo> {
    if let Some(path) = &args.brand_file {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::new(ValidationErrorKind::InvalidField {
                field: "brand_file".to_string(),
                reason: format!("cannot read {}: {}", path.display(), e),
            })
        })?;
        let brand = serde_json::from_str::<BrandInfo>(&contents)
            .unwrap_or_else(|_| BrandInfo::Text(contents.trim().to_string()));
        brand.session_key()?;
        return Ok(brand);
    }

    let profile = BrandProfile::builder()
        .name(args.name.clone().unwrap_or_default())
        .description(args.description.clone())
        .values(args.values.clone())
        .target_audience(args.target_audience.clone())
        .build()
        .map_err(|e| {
            ValidationError::new(ValidationErrorKind::InvalidField {
                field: "brand".to_string(),
                reason: e.to_string(),
            })
        })?;
    let brand = BrandInfo::from(profile);
    brand.session_key()?;
    Ok(brand)
}
