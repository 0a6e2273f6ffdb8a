//! Media prompt, generation job and asset types.

use serde::{Deserialize, Serialize};

/// Kind of media the pipeline generates.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MediaKind {
    /// Still image
    #[default]
    Image,
    /// Short video clip
    Animation,
}

/// A single, normalized media generation request derived from a script.
///
/// # Examples
///
/// ```
/// use pitchkit_core::{MediaKind, MediaPromptSpec};
///
/// let spec = MediaPromptSpec::image("anvil on a cliff edge")
///     .with_style("watercolor")
///     .with_mood("wry");
///
/// assert_eq!(spec.kind, MediaKind::Image);
/// assert_eq!(spec.style.as_deref(), Some("watercolor"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_setters::Setters)]
#[serde(rename_all = "camelCase")]
#[setters(prefix = "with_", strip_option, into)]
pub struct MediaPromptSpec {
    /// Text description of what to generate
    #[setters(skip)]
    pub prompt: String,
    /// Image or animation
    #[serde(rename = "type")]
    #[setters(skip)]
    pub kind: MediaKind,
    /// Visual style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Mood (images)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    /// Transition description (animations)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
    /// Technical specification (images)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_specs: Option<serde_json::Value>,
    /// Requested duration (animations)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Title of the script section the prompt came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
}

impl MediaPromptSpec {
    /// Creates a prompt of the given kind with no styling.
    pub fn new(kind: MediaKind, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            kind,
            style: None,
            mood: None,
            transition: None,
            technical_specs: None,
            duration: None,
            section_title: None,
        }
    }

    /// Creates an image prompt.
    pub fn image(prompt: impl Into<String>) -> Self {
        Self::new(MediaKind::Image, prompt)
    }

    /// Creates an animation prompt.
    pub fn animation(prompt: impl Into<String>) -> Self {
        Self::new(MediaKind::Animation, prompt)
    }

    /// The text sent to the media model: the prompt with style, mood and
    /// transition appended.
    ///
    /// # Examples
    ///
    /// ```
    /// use pitchkit_core::MediaPromptSpec;
    ///
    /// let spec = MediaPromptSpec::image("anvil").with_style("noir");
    /// assert_eq!(spec.model_prompt(), "anvil. Style: noir");
    /// ```
    pub fn model_prompt(&self) -> String {
        let mut text = self.prompt.trim().to_string();
        let extras = [
            ("Style", &self.style),
            ("Mood", &self.mood),
            ("Transition", &self.transition),
        ];
        for (label, value) in extras {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                text.push_str(&format!(". {label}: {value}"));
            }
        }
        text
    }
}

/// How a model invocation was ultimately executed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GenerationMode {
    /// Synchronous entry point answered (possibly after polling)
    Immediate,
    /// Fell back to the asynchronous queue
    Queued,
}

/// One in-flight model invocation. Lives only as long as the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    /// Model identifier
    pub model_id: String,
    /// Input payload
    pub input: serde_json::Value,
    /// Current execution mode
    pub mode: GenerationMode,
    /// Polling handle, once the provider issued one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_url: Option<String>,
    /// Provider request id, once known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl GenerationJob {
    /// Starts a job in immediate mode.
    pub fn new(model_id: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            model_id: model_id.into(),
            input,
            mode: GenerationMode::Immediate,
            status_url: None,
            request_id: None,
        }
    }
}

/// A generated asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Image or animation
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Where the provider serves the asset
    pub url: String,
    /// Provenance
    pub metadata: AssetMetadata,
}

/// Provenance recorded with each generated asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadata {
    /// Position of the originating prompt in the request
    pub prompt_index: usize,
    /// Prompt text as sent to the model
    pub prompt: String,
    /// Model that produced the asset
    pub model: String,
    /// Provider request id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Execution mode that produced the asset
    pub mode: GenerationMode,
    /// Originating script section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_media_kind_parses_case_insensitively() {
        assert_eq!(MediaKind::from_str("Animation").unwrap(), MediaKind::Animation);
        assert_eq!(MediaKind::Image.to_string(), "image");
        assert!(MediaKind::from_str("audio").is_err());
    }

    #[test]
    fn test_prompt_spec_serializes_type_field() {
        let spec = MediaPromptSpec::animation("logo reveal").with_duration("5s");
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["type"], "animation");
        assert_eq!(value["duration"], "5s");
        assert!(value.get("style").is_none());
    }

    #[test]
    fn test_model_prompt_skips_blank_extras() {
        let spec = MediaPromptSpec::animation("logo reveal")
            .with_mood(" ")
            .with_transition("wipe left");
        assert_eq!(spec.model_prompt(), "logo reveal. Transition: wipe left");
    }
}
