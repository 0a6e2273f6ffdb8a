//! Gemini REST client.

use super::dto::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use crate::http::{ensure_success, http_client, request_error};
use async_trait::async_trait;
use pitchkit_config::{RetryConfig, TextConfig};
use pitchkit_error::{PitchkitResult, RetryableError, UpstreamError, UpstreamErrorKind};
use pitchkit_interface::TextModel;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

/// Gemini text model client.
///
/// Retries transient failures (408, 429, 5xx, transport errors) with
/// jittered exponential backoff. The strategy comes from the first error's
/// kind, adjusted by [`RetryConfig`] overrides.
#[derive(Debug, Clone)]
pub struct GeminiTextClient {
    client: Client,
    api_key: String,
    config: TextConfig,
    retry: RetryConfig,
}

impl GeminiTextClient {
    /// Creates a client, reading the API key from the configured variable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API key variable is not set.
    #[instrument(name = "gemini_text_client_new", skip_all)]
    pub fn new(config: TextConfig, retry: RetryConfig) -> PitchkitResult<Self> {
        let api_key = config.api_key()?;
        Self::with_api_key(api_key, config, retry)
    }

    /// Creates a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns an upstream error if the HTTP client cannot be built.
    pub fn with_api_key(
        api_key: impl Into<String>,
        config: TextConfig,
        retry: RetryConfig,
    ) -> PitchkitResult<Self> {
        Ok(Self {
            client: http_client(config.request_timeout())?,
            api_key: api_key.into(),
            config,
            retry,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url().trim_end_matches('/'),
            self.config.model()
        )
    }

    /// One request, no retry.
    async fn generate_once(&self, prompt: &str) -> Result<String, UpstreamError> {
        let endpoint = self.endpoint();
        let body = GenerateContentRequest::builder()
            .contents(vec![Content::user_text(prompt)])
            .generation_config(Some(GenerationConfig {
                temperature: *self.config.temperature(),
                max_output_tokens: *self.config.max_output_tokens(),
            }))
            .build()
            .map_err(|e| {
                UpstreamError::new(UpstreamErrorKind::InvalidResponse {
                    endpoint: endpoint.clone(),
                    message: format!("Failed to build request: {}", e),
                })
            })?;

        debug!(endpoint = %endpoint, prompt_len = prompt.len(), "Sending Gemini request");

        let response = self
            .client
            .post(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(&endpoint, e))?;

        let response = ensure_success(response).await?;

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            UpstreamError::new(UpstreamErrorKind::InvalidResponse {
                endpoint: endpoint.clone(),
                message: format!("Failed to parse response: {}", e),
            })
        })?;

        let text = parsed.text().ok_or_else(|| {
            warn!(
                finish_reason = parsed.finish_reason().unwrap_or("none"),
                "Gemini returned no text"
            );
            UpstreamError::new(UpstreamErrorKind::EmptyResponse(self.config.model().clone()))
        })?;

        debug!(response_len = text.len(), "Gemini request succeeded");
        Ok(text)
    }
}

#[async_trait]
impl TextModel for GeminiTextClient {
    #[instrument(skip(self, prompt), fields(model = %self.config.model()))]
    async fn generate(&self, prompt: &str) -> PitchkitResult<String> {
        use tokio_retry2::{Retry, RetryError, strategy::ExponentialBackoff, strategy::jitter};

        if !self.retry.enabled {
            return Ok(self.generate_once(prompt).await?);
        }

        // Try once to get an error-specific strategy
        let (initial_ms, max_retries, max_delay_secs) = match self.generate_once(prompt).await {
            Ok(text) => return Ok(text),
            Err(e) => {
                if !e.is_retryable() {
                    warn!(error = %e, "Permanent Gemini error, failing immediately");
                    return Err(e.into());
                }

                let (init_ms, retries, delay_secs) = self.retry.apply(e.retry_strategy_params());
                info!(
                    error = %e,
                    initial_backoff_ms = init_ms,
                    max_retries = retries,
                    max_delay_secs = delay_secs,
                    "Gemini request failed, will retry with configured strategy"
                );
                (init_ms, retries, delay_secs)
            }
        };

        let retry_strategy = ExponentialBackoff::from_millis(initial_ms)
            .factor(2)
            .max_delay(std::time::Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(max_retries);

        let text = Retry::spawn(retry_strategy, || {
            let client = self;
            async move {
                match client.generate_once(prompt).await {
                    Ok(text) => Ok(text),
                    Err(e) if e.is_retryable() => {
                        warn!(error = %e, "Gemini request failed, will retry");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => {
                        warn!(error = %e, "Permanent Gemini error, failing immediately");
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await?;

        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        self.config.model()
    }
}
