//! Configuration structures for the pitchkit pipeline.
//!
//! Every field has a default, so partial files only need the values they
//! override.

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use pitchkit_core::GenerationLimits;
use pitchkit_error::{ConfigError, PitchkitError, PitchkitResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../pitchkit.toml");

/// Top-level pitchkit configuration.
///
/// # Example
///
/// ```no_run
/// use pitchkit_config::PitchkitConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PitchkitConfig::load()?;
/// println!("Polling every {:?}", config.polling.interval());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PitchkitConfig {
    /// Text model settings
    pub text: TextConfig,
    /// Media model settings
    pub media: MediaConfig,
    /// Job polling settings
    pub polling: PollingConfig,
    /// Text-model retry overrides
    pub retry: RetryConfig,
    /// Per-run generation caps
    pub limits: GenerationLimits,
    /// Session store settings
    pub session: SessionConfig,
    /// Filesystem storage settings
    pub storage: StorageConfig,
}

/// Text model settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Getters, derive_setters::Setters)]
#[serde(default)]
#[setters(prefix = "with_", into)]
pub struct TextConfig {
    /// API base URL
    base_url: String,
    /// Model identifier
    model: String,
    /// Environment variable holding the API key
    api_key_env: String,
    /// Sampling temperature
    temperature: f32,
    /// Output token ceiling
    max_output_tokens: u32,
    /// Per-request HTTP timeout
    request_timeout_secs: u64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            temperature: 0.7,
            max_output_tokens: 8192,
            request_timeout_secs: 120,
        }
    }
}

impl TextConfig {
    /// Read the API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the variable is unset or blank.
    pub fn api_key(&self) -> PitchkitResult<String> {
        read_key(&self.api_key_env)
    }
    /// Per-request HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Media model settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Getters, derive_setters::Setters)]
#[serde(default)]
#[setters(prefix = "with_", into)]
pub struct MediaConfig {
    /// Synchronous entry point base URL
    sync_base_url: String,
    /// Queue entry point base URL
    queue_base_url: String,
    /// Environment variable holding the API key
    api_key_env: String,
    /// Model used for images
    image_model: String,
    /// Model used for animations
    animation_model: String,
    /// Image size preset passed to the image model
    image_size: String,
    /// Clip length passed to the animation model
    animation_duration_secs: u32,
    /// Per-request HTTP timeout
    request_timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            sync_base_url: "https://fal.run".to_string(),
            queue_base_url: "https://queue.fal.run".to_string(),
            api_key_env: "FAL_KEY".to_string(),
            image_model: "fal-ai/flux/schnell".to_string(),
            animation_model: "fal-ai/kling-video/v1/standard/text-to-video".to_string(),
            image_size: "landscape_16_9".to_string(),
            animation_duration_secs: 5,
            request_timeout_secs: 120,
        }
    }
}

impl MediaConfig {
    /// Read the API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the variable is unset or blank.
    pub fn api_key(&self) -> PitchkitResult<String> {
        read_key(&self.api_key_env)
    }
    /// Per-request HTTP timeout, status checks included.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Job polling settings.
///
/// Defaults are generous because media generation is slow.
///
/// # Examples
///
/// ```
/// use pitchkit_config::PollingConfig;
/// use std::time::Duration;
///
/// let polling = PollingConfig::default()
///     .with_interval_ms(1000u64)
///     .with_backoff_factor(2.0);
///
/// assert_eq!(polling.interval_for_check(1), Duration::from_millis(1000));
/// assert_eq!(polling.interval_for_check(3), Duration::from_millis(4000));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Getters, derive_setters::Setters)]
#[serde(default)]
#[setters(prefix = "with_")]
pub struct PollingConfig {
    /// Wait between status checks
    interval_ms: u64,
    /// Give up after this long
    timeout_secs: u64,
    /// Interval multiplier per check; 1.0 keeps the interval fixed
    backoff_factor: f64,
    /// Ceiling on the interval when backing off
    max_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            timeout_secs: 300,
            backoff_factor: 1.0,
            max_interval_ms: 30_000,
        }
    }
}

impl PollingConfig {
    /// Base interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Overall timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Interval to wait after the given 1-based check.
    ///
    /// Grows by `backoff_factor` per check, capped at `max_interval_ms`
    /// but never below the base interval.
    pub fn interval_for_check(&self, check: u32) -> Duration {
        let factor = self.backoff_factor.max(1.0);
        let exponent = check.saturating_sub(1).min(64) as i32;
        let scaled = self.interval_ms as f64 * factor.powi(exponent);
        let ceiling = self.max_interval_ms.max(self.interval_ms) as f64;
        Duration::from_millis(scaled.min(ceiling) as u64)
    }
}

/// Text-model retry overrides.
///
/// Unset values fall back to the per-error strategy.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retry retryable failures at all
    pub enabled: bool,
    /// Override initial backoff
    pub initial_backoff_ms: Option<u64>,
    /// Override maximum attempts
    pub max_retries: Option<usize>,
    /// Override backoff ceiling
    pub max_delay_secs: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_backoff_ms: None,
            max_retries: None,
            max_delay_secs: None,
        }
    }
}

impl RetryConfig {
    /// Apply overrides to a per-error `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn apply(&self, (initial_ms, retries, delay_secs): (u64, usize, u64)) -> (u64, usize, u64) {
        (
            self.initial_backoff_ms.unwrap_or(initial_ms),
            self.max_retries.unwrap_or(retries),
            self.max_delay_secs.unwrap_or(delay_secs),
        )
    }
}

/// Session store settings. Absent values mean sessions live for the whole
/// process.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Expire sessions this long after their last write
    pub ttl_secs: Option<u64>,
    /// Evict the oldest sessions beyond this count
    pub max_sessions: Option<usize>,
}

impl SessionConfig {
    /// TTL as a duration.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

/// Filesystem storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for stored assets
    pub base_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("pitchkit-assets"),
        }
    }
}

impl PitchkitConfig {
    /// Load configuration from a specific file path.
    ///
    /// Values absent from the file take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> PitchkitResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                PitchkitError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                PitchkitError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: env > current dir > home dir > bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if any present source fails to parse.
    #[instrument]
    pub fn load() -> PitchkitResult<Self> {
        debug!(
            "Loading configuration with precedence: env > current dir > home dir > bundled defaults"
        );

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/pitchkit/pitchkit.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("pitchkit").required(false))
            .add_source(
                Environment::with_prefix("PITCHKIT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder
            .build()
            .map_err(|e| {
                PitchkitError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                PitchkitError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Parse configuration from a TOML string layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid configuration.
    pub fn from_toml_str(overrides: &str) -> PitchkitResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(overrides, FileFormat::Toml))
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| {
                PitchkitError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}

fn read_key(var: &str) -> PitchkitResult<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::new(format!("Environment variable {} is not set", var)).into()),
    }
}
