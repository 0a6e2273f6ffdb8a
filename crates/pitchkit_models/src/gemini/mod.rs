//! Google Gemini text generation over REST.

mod client;
mod dto;

pub use client::GeminiTextClient;
