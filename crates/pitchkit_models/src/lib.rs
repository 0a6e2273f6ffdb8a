//! Generative model integrations for pitchkit.
//!
//! - [`GeminiTextClient`] implements [`TextModel`](pitchkit_interface::TextModel)
//!   over the Gemini `generateContent` REST endpoint, with retry on transient
//!   failures.
//! - [`FalMediaClient`] implements [`MediaBackend`](pitchkit_interface::MediaBackend)
//!   over fal.ai's synchronous and queue endpoints.
//! - [`PollingCoordinator`] waits for a queued job to finish.
//! - [`ModelRequestExecutor`] runs one media invocation end to end: the
//!   synchronous entry point first, then the queue, normalizing both into one
//!   [`ExecutionResult`].
//!
//! ```no_run
//! use pitchkit_config::PitchkitConfig;
//! use pitchkit_models::{FalMediaClient, ModelRequestExecutor};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PitchkitConfig::load()?;
//! let backend = Arc::new(FalMediaClient::new(&config.media)?);
//! let executor = ModelRequestExecutor::new(backend, config.polling.clone());
//!
//! let result = executor
//!     .execute(config.media.image_model(), &json!({"prompt": "an anvil at dawn"}))
//!     .await?;
//! println!("{} via {}", result.data(), result.mode());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod executor;
mod fal;
mod gemini;
mod http;
mod output;
mod poller;

pub use executor::{ExecutionResult, ModelRequestExecutor};
pub use fal::FalMediaClient;
pub use gemini::GeminiTextClient;
pub use output::{asset_url, extract_urls};
pub use poller::PollingCoordinator;
