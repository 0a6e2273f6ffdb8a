//! Recovering structured JSON from free-form model responses.
//!
//! Text models wrap JSON in markdown fences, sprinkle control characters
//! through it, or answer in prose. [`parse`] degrades through ordered
//! strategies so research always yields an object with every required
//! section, while scripts fail loudly when they have no sections to work
//! with.

use pitchkit_core::{RESEARCH_SECTIONS, ResearchResult, ScriptResult};
use pitchkit_error::{ParseError, ParseErrorKind, PitchkitResult};
use regex::Regex;
use serde_json::{Map, Value, json};
use std::sync::LazyLock;

/// Key under which the verbatim model response is kept when extraction
/// degrades.
pub const RAW_RESPONSE_KEY: &str = "rawResponse";

/// Lines that are only a code fence, with or without a language tag.
static FENCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_+-]*[ \t]*$").expect("Valid fence regex")
});

/// Runs of blank lines.
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+\n").expect("Valid blank line regex"));

/// Shape contract a response is parsed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SchemaKind {
    /// Five-section brand research; never fails
    Research,
    /// `{sections, transitions}` script; fails without a `sections` array
    Script,
    /// Any JSON value; degrades to `{ "rawResponse": ... }`
    Freeform,
}

/// Parse a model response against a schema.
///
/// 1. The first fenced code block is parsed as JSON.
/// 2. Otherwise fences and control characters are stripped, blank lines
///    collapsed, and the text parsed whole, then as its first balanced
///    `{...}` object.
/// 3. Otherwise research degrades to placeholders plus `rawResponse`, and
///    freeform degrades to `{ "rawResponse": ... }`.
///
/// Research objects that parse but lack some sections get placeholders for
/// the missing ones plus `rawResponse`; sections that are not objects are
/// wrapped as `{ "summary": value }`.
///
/// # Errors
///
/// Only [`SchemaKind::Script`] fails: with `NoJson` when nothing parses and
/// `MissingField` when the object has no `sections` array.
///
/// # Examples
///
/// ```
/// use pitchkit_narrative::{SchemaKind, parse};
///
/// let raw = "Here you go:\n```json\n{\"sections\": [], \"transitions\": []}\n```";
/// let value = parse(raw, SchemaKind::Script).unwrap();
/// assert!(value["sections"].is_array());
///
/// let degraded = parse("I could not do that.", SchemaKind::Research).unwrap();
/// assert_eq!(degraded["rawResponse"], "I could not do that.");
/// assert!(degraded["brandEssence"].is_object());
/// ```
pub fn parse(raw: &str, schema: SchemaKind) -> PitchkitResult<Value> {
    let extracted = extract_value(raw);

    match schema {
        SchemaKind::Freeform => Ok(extracted.unwrap_or_else(|| {
            log_degraded(raw, schema);
            json!({ RAW_RESPONSE_KEY: raw })
        })),
        SchemaKind::Research => Ok(normalize_research(extracted, raw)),
        SchemaKind::Script => {
            let Some(value) = extracted else {
                log_degraded(raw, schema);
                return Err(ParseError::new(ParseErrorKind::NoJson {
                    schema: schema.to_string(),
                    length: raw.len(),
                })
                .into());
            };
            if value.get("sections").is_some_and(Value::is_array) {
                Ok(value)
            } else {
                tracing::error!(
                    keys = ?value.as_object().map(|map| map.keys().cloned().collect::<Vec<_>>()),
                    "Script response has no sections array"
                );
                Err(ParseError::new(ParseErrorKind::MissingField {
                    schema: schema.to_string(),
                    field: "sections".to_string(),
                    expected: "array".to_string(),
                })
                .into())
            }
        }
    }
}

/// Parse research, degrading to placeholders rather than failing.
pub fn parse_research(raw: &str) -> ResearchResult {
    let value = normalize_research(extract_value(raw), raw);
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Normalized research did not deserialize, using placeholders");
        placeholder_research(raw)
    })
}

/// Parse a script.
///
/// # Errors
///
/// Returns a parse error if there is no `sections` array or the sections
/// do not match the script shape.
pub fn parse_script(raw: &str) -> PitchkitResult<ScriptResult> {
    let value = parse(raw, SchemaKind::Script)?;
    serde_json::from_value(value).map_err(|e| {
        let preview = raw.chars().take(100).collect::<String>();
        tracing::error!(error = %e, json_preview = %preview, "Script JSON does not match schema");
        ParseError::new(ParseErrorKind::Schema {
            schema: SchemaKind::Script.to_string(),
            message: e.to_string(),
        })
        .into()
    })
}

/// Steps 1 and 2 of the ladder.
fn extract_value(raw: &str) -> Option<Value> {
    if let Some(block) = extract_from_code_block(raw)
        && let Ok(value) = serde_json::from_str::<Value>(&block)
    {
        tracing::debug!("Parsed JSON from fenced block");
        return Some(value);
    }

    let cleaned = sanitize(raw);
    // Raw newlines inside string literals are invalid JSON; a second pass
    // flattens all whitespace controls to spaces.
    let flattened = cleaned.replace(['\n', '\r', '\t'], " ");

    for candidate in [&cleaned, &flattened] {
        if let Ok(value) = serde_json::from_str::<Value>(candidate.trim()) {
            tracing::debug!("Parsed JSON from sanitized text");
            return Some(value);
        }
        if let Some(value) = first_balanced_object(candidate) {
            tracing::debug!("Parsed JSON from balanced braces");
            return Some(value);
        }
    }

    None
}

/// Remove fences and C0/C1 control characters (keeping newlines and tabs)
/// and collapse runs of blank lines.
fn sanitize(raw: &str) -> String {
    let without_fences = FENCE_LINE.replace_all(raw, "").replace("```", "");
    let without_controls: String = without_fences
        .chars()
        .filter(|c| matches!(c, '\n' | '\r' | '\t') || !c.is_control())
        .collect();
    BLANK_LINES
        .replace_all(&without_controls.replace("\r\n", "\n"), "\n\n")
        .into_owned()
}

/// Content of the first fenced code block.
///
/// Looks for patterns like:
/// - ```json\n...\n```
/// - ```\n...\n``` (no language specified)
///
/// An unclosed fence (truncated response) yields everything after it.
fn extract_from_code_block(response: &str) -> Option<String> {
    let start = response.find("```")?;
    let after_fence = start + 3;
    // Skip the language tag, if any
    let content_start = response[after_fence..]
        .find('\n')
        .map(|n| after_fence + n + 1)
        .unwrap_or(after_fence);

    let content = match response[content_start..].find("```") {
        Some(end) => &response[content_start..content_start + end],
        None => &response[content_start..],
    };
    Some(content.trim().to_string())
}

/// The first balanced `{...}` span that parses, trying each opening brace in
/// turn so braces in surrounding prose do not hide the payload.
fn first_balanced_object(text: &str) -> Option<Value> {
    text.match_indices('{').find_map(|(start, _)| {
        let object = extract_balanced(&text[start..], '{', '}')?;
        serde_json::from_str::<Value>(&object).ok()
    })
}

/// Content between the first `open` and its matching `close`, ignoring
/// delimiters inside string literals.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Ensure every research section is present and an object.
fn normalize_research(extracted: Option<Value>, raw: &str) -> Value {
    let Some(Value::Object(mut map)) = extracted else {
        log_degraded(raw, SchemaKind::Research);
        return placeholder_value(raw);
    };

    let mut missing = Vec::new();
    for section in RESEARCH_SECTIONS {
        match map.get_mut(section) {
            Some(Value::Object(_)) => {}
            Some(Value::Null) | None => missing.push(section),
            Some(other) => {
                let summary = other.take();
                *other = json!({ "summary": summary });
            }
        }
    }

    if !missing.is_empty() {
        tracing::warn!(
            missing = ?missing,
            "Research response is missing sections, adding placeholders"
        );
        for section in missing {
            map.insert(section.to_string(), placeholder_section(raw));
        }
        map.insert(RAW_RESPONSE_KEY.to_string(), Value::String(raw.to_string()));
    }

    Value::Object(map)
}

fn placeholder_section(raw: &str) -> Value {
    let excerpt: String = raw.trim().chars().take(200).collect();
    json!({
        "summary": excerpt,
        "note": "Structured extraction failed; see rawResponse for the full model output",
    })
}

fn placeholder_value(raw: &str) -> Value {
    let mut map = Map::new();
    for section in RESEARCH_SECTIONS {
        map.insert(section.to_string(), placeholder_section(raw));
    }
    map.insert(RAW_RESPONSE_KEY.to_string(), Value::String(raw.to_string()));
    Value::Object(map)
}

fn placeholder_research(raw: &str) -> ResearchResult {
    serde_json::from_value(placeholder_value(raw)).unwrap_or_else(|_| ResearchResult {
        raw_response: Some(raw.to_string()),
        ..ResearchResult::default()
    })
}

fn log_degraded(raw: &str, schema: SchemaKind) {
    let preview = raw.chars().take(100).collect::<String>();
    tracing::warn!(
        schema = %schema,
        response_length = raw.len(),
        response_preview = %preview,
        "No JSON found in model response"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_json_is_lossless() {
        let object = json!({
            "brandEssence": {"purpose": "Make \"great\" anvils", "traits": ["sturdy", "loud"]},
            "creativeOpportunities": {"angle": "falling objects"},
            "strategicContext": {"market": "cartoons"},
            "brandVoice": {"tone": "deadpan"},
            "implementation": {"channels": ["billboards"], "budget": 3}
        });
        let raw = format!("Sure!\n```json\n{}\n```\nAnything else?", object);
        assert_eq!(parse(&raw, SchemaKind::Research).unwrap(), object);
        assert_eq!(parse(&raw, SchemaKind::Freeform).unwrap(), object);
    }

    #[test]
    fn test_untagged_fence() {
        let raw = "```\n{\"sections\": [{\"sectionTitle\": \"Hook\"}]}\n```";
        let value = parse(raw, SchemaKind::Script).unwrap();
        assert_eq!(value["sections"][0]["sectionTitle"], "Hook");
    }

    #[test]
    fn test_control_characters_are_stripped() {
        let raw = "\u{0007}{\"sections\": [],\u{0085} \"transitions\": [\"fade\"]}\u{0000}";
        let value = parse(raw, SchemaKind::Script).unwrap();
        assert_eq!(value["transitions"][0], "fade");
    }

    #[test]
    fn test_raw_newline_inside_string_is_recovered() {
        let raw = "{\"sections\": [{\"narrativeContent\": \"line one\nline two\"}]}";
        let value = parse(raw, SchemaKind::Script).unwrap();
        assert_eq!(value["sections"][0]["narrativeContent"], "line one line two");
    }

    #[test]
    fn test_prose_around_object() {
        let raw = "Here is the script {\"sections\": [], \"note\": \"a } inside\"} hope it helps";
        let value = parse(raw, SchemaKind::Script).unwrap();
        assert_eq!(value["note"], "a } inside");
    }

    #[test]
    fn test_braces_in_prose_before_object() {
        let raw = r#"Use {brand} and {tagline}. Script: {"sections": [{"sectionTitle": "Hook"}]}"#;
        let value = parse(raw, SchemaKind::Script).unwrap();
        assert_eq!(value["sections"][0]["sectionTitle"], "Hook");
    }

    #[test]
    fn test_truncated_fence_still_parses() {
        let raw = "```json\n{\"sections\": []}";
        assert!(parse(raw, SchemaKind::Script).is_ok());
    }

    #[test]
    fn test_non_json_research_has_every_section() {
        let raw = "The brand is about anvils.\n\n\n\nAnd rockets.";
        let value = parse(raw, SchemaKind::Research).unwrap();
        for section in RESEARCH_SECTIONS {
            assert!(value[section].is_object(), "missing {section}");
        }
        assert_eq!(value[RAW_RESPONSE_KEY], raw);
    }

    #[test]
    fn test_partial_research_keeps_parsed_sections() {
        let raw = r#"{"brandEssence": {"purpose": "build"}, "brandVoice": "dry and direct"}"#;
        let value = parse(raw, SchemaKind::Research).unwrap();
        assert_eq!(value["brandEssence"]["purpose"], "build");
        assert_eq!(value["brandVoice"]["summary"], "dry and direct");
        assert!(value["implementation"]["note"].is_string());
        assert_eq!(value[RAW_RESPONSE_KEY], raw);
    }

    #[test]
    fn test_complete_research_has_no_raw_response() {
        let raw = r#"{"brandEssence": {}, "creativeOpportunities": {}, "strategicContext": {}, "brandVoice": {}, "implementation": {}}"#;
        let research = parse_research(raw);
        assert!(!research.is_degraded());
    }

    #[test]
    fn test_research_array_degrades() {
        let research = parse_research("[1, 2, 3]");
        assert!(research.is_degraded());
        assert_eq!(research.raw_response.as_deref(), Some("[1, 2, 3]"));
    }

    #[test]
    fn test_script_without_json_is_no_json_error() {
        let err = parse("I'd rather not.", SchemaKind::Script).unwrap_err();
        assert!(err.to_string().contains("No JSON object found"));
    }

    #[test]
    fn test_script_without_sections_array_is_rejected() {
        let err = parse(r#"{"sections": "none"}"#, SchemaKind::Script).unwrap_err();
        assert!(err.to_string().contains("sections"));
    }

    #[test]
    fn test_freeform_degrades_to_raw_response() {
        let value = parse("just words", SchemaKind::Freeform).unwrap();
        assert_eq!(value, json!({"rawResponse": "just words"}));
    }

    #[test]
    fn test_sanitize_collapses_blank_lines() {
        assert_eq!(sanitize("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(sanitize("```json\n{}\n```"), "\n{}\n");
    }

    #[test]
    fn test_parse_script_typed() {
        let raw = r#"{"sections": [{"sectionTitle": "Open", "visualElements": ["anvil"]}], "transitions": ["cut"]}"#;
        let script = parse_script(raw).unwrap();
        assert_eq!(script.sections.len(), 1);
        assert_eq!(script.transitions, vec!["cut".to_string()]);
    }
}
