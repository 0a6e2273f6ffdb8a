//! Pitchkit - brand research, narrative scripts and media assets.
//!
//! Pitchkit turns brand information into a marketing pitch kit by chaining a
//! text model (research and script) and a media model (images and short
//! animations), then optionally persisting the generated assets.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pitchkit::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PitchkitConfig::load()?;
//!     let text = Arc::new(GeminiTextClient::new(config.text.clone(), config.retry.clone())?);
//!     let media = Arc::new(FalMediaClient::new(&config.media)?);
//!     let orchestrator = ContentPipelineOrchestrator::new(
//!         text,
//!         ModelRequestExecutor::new(media, config.polling.clone()),
//!         Arc::new(InMemorySessionStore::from_config(&config.session)),
//!         config.media.clone(),
//!     );
//!
//!     let brand = BrandInfo::from("Acme Corporation\nAnvils, rockets and more.".to_string());
//!     let research = orchestrator.run_research(&brand).await?;
//!     println!("{}", serde_json::to_string_pretty(&research)?);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `pitchkit_error` - Error types
//! - `pitchkit_core` - Brand, research, script, media and batch types
//! - `pitchkit_interface` - Text model, media backend, storage and session traits
//! - `pitchkit_config` - Layered configuration
//! - `pitchkit_models` - HTTP clients, polling and the immediate/queued executor
//! - `pitchkit_storage` - Filesystem asset storage
//! - `pitchkit_narrative` - Response parsing, prompts, sessions and orchestration
//!
//! This crate re-exports everything for convenience.

pub use pitchkit_config::*;
pub use pitchkit_core::*;
pub use pitchkit_error::*;
pub use pitchkit_interface::*;
pub use pitchkit_models::{
    ExecutionResult, FalMediaClient, GeminiTextClient, ModelRequestExecutor, PollingCoordinator,
    asset_url, extract_urls,
};
pub use pitchkit_narrative::{
    ContentPipelineOrchestrator, InMemorySessionStore, RAW_RESPONSE_KEY, SchemaKind,
    derive_media_prompts, parse, parse_research, parse_script, render_template,
    research_prompt, script_prompt,
};
pub use pitchkit_storage::FileSystemStorage;
