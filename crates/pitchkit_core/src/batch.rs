//! Partial-success results for batch generation and persistence.

use crate::{Asset, MediaKind};
use serde::{Deserialize, Serialize};

/// A prompt whose generation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedItem {
    /// Position of the prompt in the request
    pub prompt_index: usize,
    /// Requested media kind
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Prompt text
    pub prompt: String,
    /// Rendered error
    pub error: String,
}

/// Counts reported alongside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    /// Prompts handed in
    pub total_requested: usize,
    /// Assets produced
    pub total_generated: usize,
    /// Images produced
    pub images_generated: usize,
    /// Animations produced
    pub animations_generated: usize,
    /// Prompts not attempted because a cap was reached
    pub skipped_by_cap: usize,
    /// Prompts attempted but failed
    pub failed: usize,
}

impl GenerationMetadata {
    /// Prompts that were actually sent to the model.
    pub fn attempted(&self) -> usize {
        self.total_generated + self.failed
    }
}

/// Outcome of one asset generation batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetGenerationReport {
    /// Successfully generated assets, in prompt order
    pub assets: Vec<Asset>,
    /// Prompts that failed
    pub failed: Vec<FailedItem>,
    /// Batch counts
    pub metadata: GenerationMetadata,
}

impl AssetGenerationReport {
    /// Successful assets of one kind.
    pub fn assets_of(&self, kind: MediaKind) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter(move |asset| asset.kind == kind)
    }
}

/// Record returned by the storage collaborator for a persisted asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoredAsset {
    /// Storage-assigned identifier
    pub id: String,
    /// Where the stored copy can be retrieved
    pub url: String,
    /// File name
    pub name: String,
    /// Image or animation
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// An asset the storage collaborator could not persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistFailure {
    /// Source URL of the asset
    pub asset_url: String,
    /// Intended file name
    pub file_name: String,
    /// Rendered error
    pub error: String,
}

/// Outcome of persisting a batch of assets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistenceReport {
    /// Assets stored
    pub saved: Vec<StoredAsset>,
    /// Assets dropped
    pub failed: Vec<PersistFailure>,
}
