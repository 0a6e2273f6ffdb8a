//! Collaborator traits for the pitchkit content pipeline.
//!
//! The pipeline talks to three external services (a text model, a media
//! model and an asset store) and keeps its intermediate state in a session
//! store. Each is reached only through the traits defined here, so tests and
//! alternative backends can be swapped in without touching the pipeline.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{AssetStorage, MediaBackend, SessionStore, TextModel};
pub use types::{JobHandle, JobState, MediaResponse, ProgressEvent, StatusReport, StoreRequest};
