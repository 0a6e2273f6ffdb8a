//! Brand input and session key derivation.

use derive_getters::Getters;
use pitchkit_error::{ValidationError, ValidationErrorKind};
use serde::{Deserialize, Serialize};

/// Longest session key derived from free-text brand input, in characters.
pub const MAX_SESSION_KEY_CHARS: usize = 64;

/// Structured brand record.
///
/// # Examples
///
/// ```
/// use pitchkit_core::BrandProfile;
///
/// let profile = BrandProfile::builder()
///     .name("Acme")
///     .description("Anvils and rockets")
///     .values(vec!["A".to_string(), "B".to_string()])
///     .build()
///     .unwrap();
///
/// assert_eq!(profile.name(), "Acme");
/// assert_eq!(profile.values().len(), 2);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct BrandProfile {
    /// Brand name; the session key is derived from it.
    #[serde(default)]
    name: String,

    /// What the brand does.
    #[builder(default)]
    #[serde(default)]
    description: String,

    /// Brand values, in priority order.
    #[builder(default)]
    #[serde(default)]
    values: Vec<String>,

    /// Who the brand speaks to.
    #[builder(default)]
    #[serde(default)]
    target_audience: Option<String>,

    /// Tone of voice.
    #[builder(default)]
    #[serde(default)]
    brand_voice: Option<String>,

    /// Colours, typography, imagery.
    #[builder(default)]
    #[serde(default)]
    visual_identity: Option<String>,
}

impl BrandProfile {
    /// Creates a new builder.
    pub fn builder() -> BrandProfileBuilder {
        BrandProfileBuilder::default()
    }
}

/// Brand information submitted for one session: a structured record or
/// free-form text.
///
/// Deserializes from either a JSON object or a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::From)]
#[serde(untagged)]
pub enum BrandInfo {
    /// Structured brand record
    Profile(BrandProfile),
    /// Free-text brand description
    Text(String),
}

impl BrandInfo {
    /// Derives the session key for this brand.
    ///
    /// A structured record is keyed by its trimmed name. Free text is keyed
    /// by its first non-empty line, trimmed and truncated to
    /// [`MAX_SESSION_KEY_CHARS`] characters. The same brand always maps to
    /// the same key.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrorKind::MissingBrandName`] for a record without
    /// a name and [`ValidationErrorKind::EmptyBrandText`] for blank text.
    ///
    /// # Examples
    ///
    /// ```
    /// use pitchkit_core::{BrandInfo, BrandProfile};
    ///
    /// let brand = BrandInfo::from(BrandProfile::builder().name(" Acme ").build().unwrap());
    /// assert_eq!(brand.session_key().unwrap(), "Acme");
    ///
    /// let text = BrandInfo::from("Globex Corporation\nWe make everything.".to_string());
    /// assert_eq!(text.session_key().unwrap(), "Globex Corporation");
    /// ```
    pub fn session_key(&self) -> Result<String, ValidationError> {
        match self {
            BrandInfo::Profile(profile) => {
                let name = profile.name.trim();
                if name.is_empty() {
                    return Err(ValidationError::new(ValidationErrorKind::MissingBrandName));
                }
                Ok(name.to_string())
            }
            BrandInfo::Text(text) => {
                let first_line = text
                    .lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .ok_or_else(|| ValidationError::new(ValidationErrorKind::EmptyBrandText))?;
                Ok(first_line.chars().take(MAX_SESSION_KEY_CHARS).collect())
            }
        }
    }

    /// Human-readable brand name used in prompts and file names.
    pub fn display_name(&self) -> String {
        self.session_key().unwrap_or_else(|_| "Unnamed brand".to_string())
    }
}
