//! Locating asset URLs in media model output.

use pitchkit_core::MediaKind;
use serde_json::Value;

/// The primary asset URL in a model output payload.
///
/// Known shapes are checked first (`video.url` for animations,
/// `images[].url` / `image.url` for images, then a top-level `url`); any
/// other nested `http` URL is the last resort.
///
/// # Examples
///
/// ```
/// use pitchkit_core::MediaKind;
/// use pitchkit_models::asset_url;
/// use serde_json::json;
///
/// let output = json!({"images": [{"url": "https://cdn/a.png", "width": 1024}], "seed": 7});
/// assert_eq!(asset_url(&output, MediaKind::Image).as_deref(), Some("https://cdn/a.png"));
///
/// let video = json!({"video": {"url": "https://cdn/clip.mp4"}});
/// assert_eq!(asset_url(&video, MediaKind::Animation).as_deref(), Some("https://cdn/clip.mp4"));
/// ```
pub fn asset_url(output: &Value, kind: MediaKind) -> Option<String> {
    let video = || url_at(output, &["video", "url"]);
    let image = || {
        output
            .get("images")
            .and_then(Value::as_array)
            .and_then(|images| images.iter().find_map(|image| url_at(image, &["url"])))
            .or_else(|| url_at(output, &["image", "url"]))
    };

    let preferred = match kind {
        MediaKind::Animation => video().or_else(image),
        MediaKind::Image => image().or_else(video),
    };

    preferred
        .or_else(|| url_at(output, &["url"]))
        .or_else(|| extract_urls(output).into_iter().next())
}

/// Every distinct `http` URL in a payload, depth first.
pub fn extract_urls(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_urls(value, &mut out);
    out
}

fn collect_urls(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.starts_with("http") && !out.iter().any(|existing| existing == trimmed) {
                out.push(trimmed.to_string());
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_urls(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_urls(item, out)),
        _ => {}
    }
}

fn url_at(value: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_output_prefers_images_array() {
        let output = json!({
            "url": "https://cdn/top.png",
            "images": [{"url": "https://cdn/first.png"}, {"url": "https://cdn/second.png"}]
        });
        assert_eq!(
            asset_url(&output, MediaKind::Image).as_deref(),
            Some("https://cdn/first.png")
        );
    }

    #[test]
    fn test_nested_url_is_last_resort() {
        let output = json!({"result": {"files": ["ftp://nope", "https://cdn/deep.mp4"]}});
        assert_eq!(
            asset_url(&output, MediaKind::Animation).as_deref(),
            Some("https://cdn/deep.mp4")
        );
    }

    #[test]
    fn test_no_url_is_none() {
        let output = json!({"images": [], "seed": 42});
        assert_eq!(asset_url(&output, MediaKind::Image), None);
    }

    #[test]
    fn test_extract_urls_deduplicates() {
        let output = json!(["https://a", {"x": "https://a"}, "https://b"]);
        assert_eq!(extract_urls(&output), vec!["https://a", "https://b"]);
    }
}
