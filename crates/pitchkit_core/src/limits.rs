//! Per-run caps on media generation.

use crate::MediaKind;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Maximum number of assets of each kind generated per run.
///
/// Prompts beyond a cap are skipped and counted, not treated as errors.
///
/// # Examples
///
/// ```
/// use pitchkit_core::{GenerationLimits, MediaKind};
///
/// let limits = GenerationLimits::default().with_max_images(4usize);
/// assert_eq!(limits.cap_for(MediaKind::Image), 4);
/// assert_eq!(limits.cap_for(MediaKind::Animation), 1);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct GenerationLimits {
    /// Image cap (default 2)
    #[serde(default = "default_max_images")]
    max_images: usize,

    /// Animation cap (default 1)
    #[serde(default = "default_max_animations")]
    max_animations: usize,
}

fn default_max_images() -> usize {
    2
}

fn default_max_animations() -> usize {
    1
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            max_images: default_max_images(),
            max_animations: default_max_animations(),
        }
    }
}

impl GenerationLimits {
    /// Creates a new builder.
    pub fn builder() -> GenerationLimitsBuilder {
        GenerationLimitsBuilder::default()
    }

    /// Cap for one media kind.
    pub fn cap_for(&self, kind: MediaKind) -> usize {
        match kind {
            MediaKind::Image => self.max_images,
            MediaKind::Animation => self.max_animations,
        }
    }
}
