//! Layered configuration for the pitchkit content pipeline.
//!
//! Sources, lowest precedence first:
//! - bundled defaults (`pitchkit.toml` shipped with the library)
//! - `~/.config/pitchkit/pitchkit.toml`
//! - `./pitchkit.toml`
//! - `PITCHKIT__<SECTION>__<KEY>` environment variables

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;

pub use config::{
    MediaConfig, PitchkitConfig, PollingConfig, RetryConfig, SessionConfig, StorageConfig,
    TextConfig,
};
