//! Core data types for the pitchkit content pipeline.
//!
//! This crate provides the domain model shared by every pitchkit crate: the
//! brand input, the research and script artifacts produced by the text model,
//! the media prompts derived from a script, and the assets and batch reports
//! produced by the media model.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod brand;
mod limits;
mod media;
mod pitch;
mod research;
mod script;
mod session;
mod telemetry;

pub use batch::{
    AssetGenerationReport, FailedItem, GenerationMetadata, PersistFailure, PersistenceReport,
    StoredAsset,
};
pub use brand::{BrandInfo, BrandProfile, BrandProfileBuilder, MAX_SESSION_KEY_CHARS};
pub use limits::{GenerationLimits, GenerationLimitsBuilder};
pub use media::{Asset, AssetMetadata, GenerationJob, GenerationMode, MediaKind, MediaPromptSpec};
pub use pitch::PitchKit;
pub use research::{RESEARCH_SECTIONS, ResearchResult, SectionFields};
pub use script::{
    CampaignBrief, CampaignBriefBuilder, ScriptResult, ScriptSection, VisualDescriptor,
    VisualElement,
};
pub use session::{Session, Stamped};
pub use telemetry::{TelemetryFormat, init_telemetry};
