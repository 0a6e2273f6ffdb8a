//! Shared HTTP plumbing for the model clients.

use pitchkit_error::{UpstreamError, UpstreamErrorKind};
use reqwest::{Client, Response};
use std::time::Duration;

/// Build an HTTP client whose requests give up after `timeout`.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, UpstreamError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| request_error("client setup", e))
}

/// Map a transport failure.
pub(crate) fn request_error(endpoint: &str, error: reqwest::Error) -> UpstreamError {
    UpstreamError::new(UpstreamErrorKind::Request {
        endpoint: endpoint.to_string(),
        message: error.to_string(),
    })
}

/// Pass 2xx responses through; turn anything else into an `HttpStatus` error
/// carrying the response body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        body
    };

    Err(UpstreamError::new(UpstreamErrorKind::HttpStatus {
        status_code: status.as_u16(),
        message,
    }))
}

/// Decode a JSON body.
pub(crate) async fn json_body(
    endpoint: &str,
    response: Response,
) -> Result<serde_json::Value, UpstreamError> {
    response.json().await.map_err(|e| {
        UpstreamError::new(UpstreamErrorKind::InvalidResponse {
            endpoint: endpoint.to_string(),
            message: format!("Failed to decode JSON body: {}", e),
        })
    })
}
