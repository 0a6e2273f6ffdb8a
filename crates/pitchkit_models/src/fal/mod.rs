//! fal.ai media generation over REST.

mod client;

pub use client::FalMediaClient;
