//! fal.ai client for the synchronous (`fal.run`) and queue (`queue.fal.run`)
//! entry points.

use crate::http::{ensure_success, http_client, json_body, request_error};
use async_trait::async_trait;
use pitchkit_config::MediaConfig;
use pitchkit_error::{PitchkitResult, UpstreamError, UpstreamErrorKind};
use pitchkit_interface::{JobHandle, MediaBackend, MediaResponse, StatusReport};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Header fal uses to report the request id.
const REQUEST_ID_HEADER: &str = "x-fal-request-id";

/// fal.ai media backend.
#[derive(Debug, Clone)]
pub struct FalMediaClient {
    client: Client,
    api_key: String,
    sync_base_url: String,
    queue_base_url: String,
}

impl FalMediaClient {
    /// Creates a client from configuration, reading the API key from the
    /// configured variable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API key variable is not set.
    #[instrument(name = "fal_media_client_new", skip_all)]
    pub fn new(config: &MediaConfig) -> PitchkitResult<Self> {
        let api_key = config.api_key()?;
        Self::with_api_key(
            api_key,
            config.sync_base_url(),
            config.queue_base_url(),
            config.request_timeout(),
        )
    }

    /// Creates a client with an explicit key and endpoints.
    ///
    /// # Errors
    ///
    /// Returns an upstream error if the HTTP client cannot be built.
    pub fn with_api_key(
        api_key: impl Into<String>,
        sync_base_url: impl AsRef<str>,
        queue_base_url: impl AsRef<str>,
        request_timeout: Duration,
    ) -> PitchkitResult<Self> {
        Ok(Self {
            client: http_client(request_timeout)?,
            api_key: api_key.into(),
            sync_base_url: sync_base_url.as_ref().trim_end_matches('/').to_string(),
            queue_base_url: queue_base_url.as_ref().trim_end_matches('/').to_string(),
        })
    }

    fn sync_url(&self, model_id: &str) -> String {
        format!("{}/{}", self.sync_base_url, model_id.trim_matches('/'))
    }

    fn queue_url(&self, model_id: &str) -> String {
        format!("{}/{}", self.queue_base_url, model_id.trim_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("Key {}", self.api_key))
    }

    async fn send(
        &self,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<Response, UpstreamError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| request_error(endpoint, e))?;
        ensure_success(response).await
    }

    async fn post_input(&self, endpoint: String, input: &Value) -> PitchkitResult<MediaResponse> {
        debug!(endpoint = %endpoint, "Posting media request");
        let response = self.send(&endpoint, self.client.post(&endpoint).json(input)).await?;
        let header_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = json_body(&endpoint, response).await?;
        Ok(MediaResponse::from_json(body, header_id))
    }
}

/// Result URL for a job whose handle carries none: the status URL without
/// its trailing `/status` segment.
fn result_url(handle: &JobHandle) -> String {
    handle.response_url.clone().unwrap_or_else(|| {
        handle
            .status_url
            .trim_end_matches('/')
            .trim_end_matches("/status")
            .to_string()
    })
}

#[async_trait]
impl MediaBackend for FalMediaClient {
    #[instrument(skip(self, input))]
    async fn request(&self, model_id: &str, input: &Value) -> PitchkitResult<MediaResponse> {
        self.post_input(self.sync_url(model_id), input).await
    }

    #[instrument(skip(self, input))]
    async fn submit(&self, model_id: &str, input: &Value) -> PitchkitResult<MediaResponse> {
        self.post_input(self.queue_url(model_id), input).await
    }

    #[instrument(skip(self), fields(job = %handle.label()))]
    async fn status(&self, handle: &JobHandle) -> PitchkitResult<StatusReport> {
        let endpoint = &handle.status_url;
        let response = self
            .send(endpoint, self.client.get(endpoint).query(&[("logs", "1")]))
            .await?;
        let body = json_body(endpoint, response).await?;
        Ok(StatusReport::from_json(&body))
    }

    #[instrument(skip(self), fields(job = %handle.label()))]
    async fn fetch_result(&self, handle: &JobHandle) -> PitchkitResult<Value> {
        let endpoint = result_url(handle);
        let response = self.send(&endpoint, self.client.get(&endpoint)).await?;
        let body = json_body(&endpoint, response).await?;

        match body {
            Value::Object(mut map) if map.contains_key("response") => {
                Ok(map.remove("response").unwrap_or(Value::Null))
            }
            Value::Null => Err(UpstreamError::new(UpstreamErrorKind::InvalidResponse {
                endpoint,
                message: "empty result body".to_string(),
            })
            .into()),
            other => Ok(other),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_join_model_path() {
        let client = FalMediaClient::with_api_key(
            "k",
            "https://fal.run/",
            "https://queue.fal.run",
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(
            client.sync_url("fal-ai/flux/schnell"),
            "https://fal.run/fal-ai/flux/schnell"
        );
        assert_eq!(
            client.queue_url("/fal-ai/flux/schnell"),
            "https://queue.fal.run/fal-ai/flux/schnell"
        );
    }

    #[test]
    fn test_result_url_falls_back_to_status_url() {
        let handle = JobHandle {
            status_url: "https://queue.fal.run/fal-ai/flux/requests/abc/status".to_string(),
            response_url: None,
            request_id: Some("abc".to_string()),
        };
        assert_eq!(
            result_url(&handle),
            "https://queue.fal.run/fal-ai/flux/requests/abc"
        );

        let explicit = JobHandle {
            response_url: Some("https://queue.fal.run/r/abc".to_string()),
            ..handle
        };
        assert_eq!(result_url(&explicit), "https://queue.fal.run/r/abc");
    }
}
