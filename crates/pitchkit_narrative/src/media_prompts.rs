//! Turning script sections into media prompts.
//!
//! This is the only place visual elements are inspected by shape; the rest
//! of the pipeline sees [`MediaPromptSpec`] alone.

use pitchkit_core::{MediaKind, MediaPromptSpec, ScriptResult, ScriptSection, VisualDescriptor};
use serde_json::Value;

/// Descriptor `type` values that request motion rather than a still.
const MOTION_TYPES: [&str; 3] = ["animation", "video", "motion"];

/// Derive media prompts from a script, in section order.
///
/// For each section, every visual element becomes one prompt (images unless
/// the descriptor's `type` names motion), followed by one animation prompt
/// when the section has non-empty `motionTransitions`. Elements with no
/// usable text are skipped.
///
/// # Examples
///
/// ```
/// use pitchkit_core::{MediaKind, ScriptResult};
/// use pitchkit_narrative::derive_media_prompts;
///
/// let script: ScriptResult = serde_json::from_str(r#"{
///     "sections": [{
///         "sectionTitle": "Opening",
///         "visualElements": ["desert highway", {"description": "rocket skates", "type": "video"}],
///         "motionTransitions": "slow push in"
///     }]
/// }"#).unwrap();
///
/// let prompts = derive_media_prompts(&script);
/// assert_eq!(prompts.len(), 3);
/// assert_eq!(prompts[0].kind, MediaKind::Image);
/// assert_eq!(prompts[1].kind, MediaKind::Animation);
/// assert_eq!(prompts[2].transition.as_deref(), Some("slow push in"));
/// ```
pub fn derive_media_prompts(script: &ScriptResult) -> Vec<MediaPromptSpec> {
    let prompts: Vec<MediaPromptSpec> = script.sections.iter().flat_map(section_prompts).collect();
    tracing::debug!(
        sections = script.sections.len(),
        prompts = prompts.len(),
        "Derived media prompts"
    );
    prompts
}

fn section_prompts(section: &ScriptSection) -> Vec<MediaPromptSpec> {
    let title = section.section_title.trim();
    let mut prompts: Vec<MediaPromptSpec> = section
        .visual_elements
        .iter()
        .flat_map(|element| element.descriptors())
        .filter_map(|descriptor| from_descriptor(&descriptor))
        .collect();

    if let Some(transition) = section.motion_transitions.as_ref().and_then(transition_text) {
        let subject = if title.is_empty() { "Scene" } else { title };
        let mut spec = MediaPromptSpec::animation(format!("{subject}: {transition}"))
            .with_transition(transition);
        if let Some(duration) = section
            .motion_transitions
            .as_ref()
            .and_then(|value| value.get("duration"))
            .and_then(value_text)
        {
            spec = spec.with_duration(duration);
        }
        prompts.push(spec);
    }

    if !title.is_empty() {
        for prompt in &mut prompts {
            prompt.section_title = Some(title.to_string());
        }
    }
    prompts
}

fn from_descriptor(descriptor: &VisualDescriptor) -> Option<MediaPromptSpec> {
    let text = descriptor.text()?.trim();
    let kind = match descriptor.kind.as_deref().map(str::trim) {
        Some(kind) if MOTION_TYPES.iter().any(|m| m.eq_ignore_ascii_case(kind)) => {
            MediaKind::Animation
        }
        _ => MediaKind::Image,
    };

    let mut spec = MediaPromptSpec::new(kind, text);
    spec.style = non_blank(descriptor.style.as_deref());
    match kind {
        MediaKind::Image => {
            spec.mood = non_blank(descriptor.mood.as_deref());
            spec.technical_specs = descriptor.technical_specs.clone();
        }
        MediaKind::Animation => {
            spec.duration = descriptor
                .technical_specs
                .as_ref()
                .and_then(|specs| specs.get("duration"))
                .and_then(value_text);
        }
    }
    Some(spec)
}

/// Human-readable form of a `motionTransitions` value, if non-empty.
fn transition_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .get("description")
            .or_else(|| map.get("transition"))
            .and_then(value_text)
            .or_else(|| (!map.is_empty()).then(|| value.to_string())),
        other => value_text(other),
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(Some(s.as_str())),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_text).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
