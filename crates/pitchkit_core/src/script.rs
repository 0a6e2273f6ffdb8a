//! Narrative script produced by the text model.

use derive_getters::Getters;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Creative brief passed to script generation.
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into), default)]
pub struct CampaignBrief {
    /// What the campaign should achieve
    #[serde(default)]
    campaign_goals: String,
    /// Audience override; falls back to the brand's audience when empty
    #[serde(default)]
    target_audience: String,
    /// Optional art direction
    #[serde(default)]
    creative_direction: Option<String>,
}

impl CampaignBrief {
    /// Creates a new builder.
    pub fn builder() -> CampaignBriefBuilder {
        CampaignBriefBuilder::default()
    }
}

/// A generated script: ordered sections plus the transitions between them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScriptResult {
    /// Sections in narrative order
    pub sections: Vec<ScriptSection>,
    /// Transition notes between consecutive sections
    #[serde(default, deserialize_with = "one_or_many")]
    pub transitions: Vec<String>,
}

/// One section of a script.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSection {
    /// Section heading
    #[serde(default, deserialize_with = "string_or_null")]
    pub section_title: String,
    /// Body copy
    #[serde(default, deserialize_with = "string_or_null")]
    pub narrative_content: String,
    /// Messages the section must land
    #[serde(default, deserialize_with = "one_or_many")]
    pub key_messages: Vec<String>,
    /// Imagery for the section
    #[serde(default, deserialize_with = "element_or_list")]
    pub visual_elements: Vec<VisualElement>,
    /// Motion between this section and the next
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_transitions: Option<serde_json::Value>,
    /// Craft notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub craft_and_design_details: Option<serde_json::Value>,
    /// How the section reflects the brand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_alignment_notes: Option<serde_json::Value>,
    /// Any further fields the model emitted
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A visual element as the model wrote it: a bare description, a
/// structured descriptor, or a list of either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisualElement {
    /// Bare description
    Text(String),
    /// Nested list of elements
    List(Vec<VisualElement>),
    /// Structured descriptor
    Descriptor(VisualDescriptor),
}

impl VisualElement {
    /// Flattens this element into descriptors, depth first.
    ///
    /// # Examples
    ///
    /// ```
    /// use pitchkit_core::VisualElement;
    ///
    /// let element: VisualElement = serde_json::from_str(
    ///     r#"["sunrise over the factory", {"image": "anvil close-up", "style": "macro"}]"#,
    /// ).unwrap();
    ///
    /// let flat = element.descriptors();
    /// assert_eq!(flat.len(), 2);
    /// assert_eq!(flat[1].text(), Some("anvil close-up"));
    /// ```
    pub fn descriptors(&self) -> Vec<VisualDescriptor> {
        match self {
            VisualElement::Text(text) => vec![VisualDescriptor {
                description: Some(text.clone()),
                ..VisualDescriptor::default()
            }],
            VisualElement::Descriptor(descriptor) => vec![descriptor.clone()],
            VisualElement::List(items) => items.iter().flat_map(Self::descriptors).collect(),
        }
    }
}

/// Structured visual element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualDescriptor {
    /// What to depict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Alternate key some responses use instead of `description`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Element type as written by the model (e.g. "image", "animation")
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Visual style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Mood
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    /// Free-form technical specification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_specs: Option<serde_json::Value>,
}

impl VisualDescriptor {
    /// The non-blank description, preferring `description` over `image`.
    pub fn text(&self) -> Option<&str> {
        [self.description.as_deref(), self.image.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
    }
}

/// Accepts a string, a list of strings, or null.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<serde_json::Value>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(item)) => vec![item],
        Some(OneOrMany::Many(items)) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            })
            .collect(),
        None => Vec::new(),
    })
}

/// Accepts a string or null.
fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a single visual element, a list of them, or null.
fn element_or_list<'de, D>(deserializer: D) -> Result<Vec<VisualElement>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<VisualElement>::deserialize(deserializer)? {
        Some(VisualElement::List(items)) => items,
        Some(single) => vec![single],
        None => Vec::new(),
    })
}
