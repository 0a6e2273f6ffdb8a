//! Pitch-kit pipeline: response parsing, prompts, sessions and orchestration.
//!
//! # Stages
//!
//! 1. **Research**: the text model analyses a brand; [`parse_research`]
//!    always yields all five sections, degrading to placeholders.
//! 2. **Script**: requires research for the session; [`parse_script`] fails
//!    without a `sections` array.
//! 3. **Media prompts**: [`derive_media_prompts`] normalises visual elements
//!    into [`MediaPromptSpec`](pitchkit_core::MediaPromptSpec)s.
//! 4. **Assets**: capped, sequential generation through
//!    [`ModelRequestExecutor`](pitchkit_models::ModelRequestExecutor) with
//!    per-item failure isolation.
//!
//! [`ContentPipelineOrchestrator`] runs the stages against an injected
//! [`SessionStore`](pitchkit_interface::SessionStore);
//! [`InMemorySessionStore`] is the process-local implementation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extraction;
mod media_prompts;
mod orchestrator;
mod prompts;
mod state;

pub use extraction::{RAW_RESPONSE_KEY, SchemaKind, parse, parse_research, parse_script};
pub use media_prompts::derive_media_prompts;
pub use orchestrator::ContentPipelineOrchestrator;
pub use prompts::{
    RESEARCH_TEMPLATE, SCRIPT_TEMPLATE, render_template, research_prompt, script_prompt,
};
pub use state::InMemorySessionStore;
