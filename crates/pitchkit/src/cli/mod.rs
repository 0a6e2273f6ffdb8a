//! Command-line interface module.

mod commands;
mod run;

pub use commands::{BrandArgs, Cli, Commands, LogFormat};
pub use run::{RunOptions, load_config, run_pipeline, run_research};
