//! Complete pipeline output.

use crate::{
    AssetGenerationReport, MediaPromptSpec, PersistenceReport, ResearchResult, ScriptResult,
};
use serde::{Deserialize, Serialize};

/// Everything one pipeline run produced for a brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchKit {
    /// Session the artifacts are stored under
    pub session_key: String,
    /// Research stage output
    pub research: ResearchResult,
    /// Script stage output
    pub script: ScriptResult,
    /// Prompts derived from the script
    pub media_prompts: Vec<MediaPromptSpec>,
    /// Asset generation outcome
    pub assets: AssetGenerationReport,
    /// Persistence outcome, when a storage backend was used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted: Option<PersistenceReport>,
}
