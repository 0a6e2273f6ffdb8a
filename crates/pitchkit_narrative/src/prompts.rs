//! Prompt templates for the research and script stages.
//!
//! Templates use `{{name}}` placeholders. Rendering fails on a placeholder
//! with no value so a typo in a template never reaches the model.

use pitchkit_core::{BrandInfo, CampaignBrief, ResearchResult};
use pitchkit_error::{JsonError, PitchkitResult, ValidationError, ValidationErrorKind};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("Valid placeholder regex"));

/// Research prompt. Asks for exactly the five research sections.
pub const RESEARCH_TEMPLATE: &str = r#"You are a senior brand strategist preparing a creative pitch.

Analyze the following brand and respond with a single JSON object and nothing else.

Brand information:
{{brand}}

The JSON object must contain exactly these keys, each mapping to an object of short string fields:
- "brandEssence": purpose, personality, promise
- "creativeOpportunities": themes, angles, storytelling hooks
- "strategicContext": market position, competitors, audience insight
- "brandVoice": tone, vocabulary, phrases to avoid
- "implementation": channels, formats, next steps
"#;

/// Script prompt. Asks for `{sections, transitions}`.
pub const SCRIPT_TEMPLATE: &str = r#"You are a creative director writing a short narrative pitch script for {{brand_name}}.

Brand research:
{{research}}

Campaign goals: {{campaign_goals}}
Target audience: {{target_audience}}
Creative direction: {{creative_direction}}

Respond with a single JSON object and nothing else, shaped as:
{
  "sections": [
    {
      "sectionTitle": "string",
      "narrativeContent": "string",
      "keyMessages": ["string"],
      "visualElements": [
        {"description": "string", "type": "image or animation", "style": "string", "mood": "string", "technicalSpecs": "string"}
      ],
      "motionTransitions": "string",
      "craftAndDesignDetails": "string",
      "brandAlignmentNotes": "string"
    }
  ],
  "transitions": ["string"]
}
"#;

/// Replace every `{{name}}` in `template` with its value.
///
/// # Errors
///
/// Returns a validation error naming the first placeholder with no value.
///
/// # Examples
///
/// ```
/// use pitchkit_narrative::render_template;
/// use std::collections::BTreeMap;
///
/// let vars = BTreeMap::from([("name", "Acme".to_string())]);
/// assert_eq!(render_template("Hello {{ name }}", &vars).unwrap(), "Hello Acme");
/// assert!(render_template("{{missing}}", &vars).is_err());
/// ```
pub fn render_template(template: &str, vars: &BTreeMap<&str, String>) -> PitchkitResult<String> {
    let mut result = String::with_capacity(template.len());
    let mut last = 0;

    for cap in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let key = name.as_str().trim();
        let value = vars.get(key).ok_or_else(|| {
            let available: Vec<_> = vars.keys().copied().collect();
            ValidationError::new(ValidationErrorKind::InvalidField {
                field: key.to_string(),
                reason: format!(
                    "no value for template placeholder. Available: {}",
                    if available.is_empty() {
                        "none".to_string()
                    } else {
                        available.join(", ")
                    }
                ),
            })
        })?;
        result.push_str(&template[last..whole.start()]);
        result.push_str(value);
        last = whole.end();
    }

    result.push_str(&template[last..]);
    Ok(result)
}

/// Research prompt for a brand.
pub fn research_prompt(brand: &BrandInfo) -> PitchkitResult<String> {
    let vars = BTreeMap::from([("brand", describe_brand(brand))]);
    render_template(RESEARCH_TEMPLATE, &vars)
}

/// Script prompt for a brand, its research and a brief.
///
/// An empty audience in the brief falls back to the brand's own audience.
pub fn script_prompt(
    brand: &BrandInfo,
    research: &ResearchResult,
    brief: &CampaignBrief,
) -> PitchkitResult<String> {
    let research_json = serde_json::to_string_pretty(research)
        .map_err(|e| JsonError::new(format!("Failed to serialize research: {}", e)))?;

    let audience = match (brief.target_audience().trim(), brand) {
        ("", BrandInfo::Profile(profile)) => profile
            .target_audience()
            .clone()
            .unwrap_or_else(|| "General audience".to_string()),
        ("", BrandInfo::Text(_)) => "General audience".to_string(),
        (audience, _) => audience.to_string(),
    };

    let vars = BTreeMap::from([
        ("brand_name", brand.display_name()),
        ("research", research_json),
        ("campaign_goals", non_empty(brief.campaign_goals(), "Brand awareness")),
        ("target_audience", audience),
        (
            "creative_direction",
            brief
                .creative_direction()
                .as_deref()
                .map(|d| non_empty(d, "Open"))
                .unwrap_or_else(|| "Open".to_string()),
        ),
    ]);
    render_template(SCRIPT_TEMPLATE, &vars)
}

/// Brand block embedded in the research prompt.
fn describe_brand(brand: &BrandInfo) -> String {
    match brand {
        BrandInfo::Text(text) => text.trim().to_string(),
        BrandInfo::Profile(profile) => {
            let mut lines = vec![format!("Name: {}", profile.name().trim())];
            if !profile.description().trim().is_empty() {
                lines.push(format!("Description: {}", profile.description().trim()));
            }
            if !profile.values().is_empty() {
                lines.push(format!("Values: {}", profile.values().join(", ")));
            }
            let optional = [
                ("Target audience", profile.target_audience()),
                ("Brand voice", profile.brand_voice()),
                ("Visual identity", profile.visual_identity()),
            ];
            for (label, value) in optional {
                if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                    lines.push(format!("{label}: {}", value.trim()));
                }
            }
            lines.join("\n")
        }
    }
}

fn non_empty(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
