//! Trait definitions for external collaborators.

use crate::{JobHandle, MediaResponse, StatusReport, StoreRequest};
use async_trait::async_trait;
use pitchkit_core::{Session, StoredAsset};
use pitchkit_error::PitchkitResult;

/// A generative text model: prompt in, text out.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Generate a response for a single prompt.
    async fn generate(&self, prompt: &str) -> PitchkitResult<String>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

/// A generative media service exposing both a synchronous and a queued
/// entry point for the same models.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Invoke a model through the synchronous entry point.
    ///
    /// May still answer with a polling handle.
    async fn request(
        &self,
        model_id: &str,
        input: &serde_json::Value,
    ) -> PitchkitResult<MediaResponse>;

    /// Submit a model invocation to the asynchronous queue.
    async fn submit(
        &self,
        model_id: &str,
        input: &serde_json::Value,
    ) -> PitchkitResult<MediaResponse>;

    /// Check the status of a queued job.
    async fn status(&self, handle: &JobHandle) -> PitchkitResult<StatusReport>;

    /// Fetch the output of a completed job whose status carried none.
    async fn fetch_result(&self, handle: &JobHandle) -> PitchkitResult<serde_json::Value>;

    /// Provider name (e.g., "fal").
    fn provider_name(&self) -> &'static str;
}

/// Persistence for generated assets.
///
/// Each call is independent; a failure affects only that asset.
#[async_trait]
pub trait AssetStorage: Send + Sync {
    /// Copy the asset at `request.asset_url` into storage.
    async fn store(&self, request: &StoreRequest) -> PitchkitResult<StoredAsset>;

    /// Backend name for logging.
    fn backend_name(&self) -> &str;
}

/// Keyed storage of per-brand session state.
///
/// Writes are last-write-wins per key.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up a session.
    async fn get(&self, key: &str) -> PitchkitResult<Option<Session>>;

    /// Insert or replace a session.
    async fn set(&self, key: &str, session: Session) -> PitchkitResult<()>;

    /// Remove a session. Returns whether one was present.
    async fn clear(&self, key: &str) -> PitchkitResult<bool>;
}
