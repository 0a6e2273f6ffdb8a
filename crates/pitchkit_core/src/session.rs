//! Per-brand session state.

use crate::{BrandInfo, MediaPromptSpec, ResearchResult, ScriptResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value stamped with its creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stamped<T> {
    /// The stored value
    pub value: T,
    /// When it was stored
    pub created_at: DateTime<Utc>,
}

impl<T> Stamped<T> {
    /// Stamps a value with the current time.
    pub fn now(value: T) -> Self {
        Self {
            value,
            created_at: Utc::now(),
        }
    }
}

/// Accumulated artifacts for one brand.
///
/// A session always owns research; script and prompts are added in stage
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Brand input the session was started from
    pub brand: BrandInfo,
    /// Research stage output
    pub research: Stamped<ResearchResult>,
    /// Script stage output
    #[serde(default)]
    pub script: Option<Stamped<ScriptResult>>,
    /// Prompts derived from the script
    #[serde(default)]
    pub media_prompts: Option<Stamped<Vec<MediaPromptSpec>>>,
}

impl Session {
    /// Starts a session from completed research.
    pub fn new(brand: BrandInfo, research: ResearchResult) -> Self {
        Self {
            brand,
            research: Stamped::now(research),
            script: None,
            media_prompts: None,
        }
    }

    /// Stores a script, discarding prompts derived from any earlier one.
    pub fn set_script(&mut self, script: ScriptResult) {
        self.script = Some(Stamped::now(script));
        self.media_prompts = None;
    }

    /// Stores derived media prompts.
    pub fn set_media_prompts(&mut self, prompts: Vec<MediaPromptSpec>) {
        self.media_prompts = Some(Stamped::now(prompts));
    }
}
