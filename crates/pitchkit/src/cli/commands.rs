//! CLI command definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pitchkit - brand research, narrative scripts and generated media
#[derive(Parser, Debug)]
#[command(name = "pitchkit")]
#[command(about = "Turn brand information into a marketing pitch kit", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Load configuration from this file instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a brand and print the result as JSON
    Research {
        #[command(flatten)]
        brand: BrandArgs,
    },

    /// Run research, script, media prompts and asset generation
    Run {
        #[command(flatten)]
        brand: BrandArgs,

        /// What the campaign should achieve
        #[arg(long)]
        goals: String,

        /// Who the campaign speaks to (defaults to the brand's audience)
        #[arg(long, default_value = "")]
        audience: String,

        /// Optional art direction
        #[arg(long)]
        direction: Option<String>,

        /// Override the configured image cap
        #[arg(long)]
        max_images: Option<usize>,

        /// Override the configured animation cap
        #[arg(long)]
        max_animations: Option<usize>,

        /// Save generated assets to the configured storage directory
        #[arg(long)]
        save: bool,

        /// Owner directory for saved assets (defaults to the session key)
        #[arg(long)]
        owner: Option<String>,
    },
}

/// Brand input, from a file or from flags.
#[derive(Args, Debug, Clone)]
pub struct BrandArgs {
    /// JSON brand record or plain-text brand description
    #[arg(long, conflicts_with = "name")]
    pub brand_file: Option<PathBuf>,

    /// Brand name
    #[arg(long, required_unless_present = "brand_file")]
    pub name: Option<String>,

    /// What the brand does
    #[arg(long, default_value = "")]
    pub description: String,

    /// Brand value (repeatable)
    #[arg(long = "value")]
    pub values: Vec<String>,

    /// Who the brand speaks to
    #[arg(long)]
    pub target_audience: Option<String>,
}

/// Log output format options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogFormat {
    /// Human-readable lines
    Pretty,
    /// One JSON object per line
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_parses_brand_flags() {
        let cli = Cli::try_parse_from([
            "pitchkit", "run", "--name", "Acme", "--value", "A", "--value", "B", "--goals",
            "Launch", "--max-images", "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                brand,
                goals,
                max_images,
                save,
                ..
            } => {
                assert_eq!(brand.name.as_deref(), Some("Acme"));
                assert_eq!(brand.values, vec!["A".to_string(), "B".to_string()]);
                assert_eq!(goals, "Launch");
                assert_eq!(max_images, Some(3));
                assert!(!save);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_brand_source_is_required() {
        assert!(Cli::try_parse_from(["pitchkit", "research"]).is_err());
        assert!(
            Cli::try_parse_from(["pitchkit", "research", "--brand-file", "b.json", "--name", "x"])
                .is_err()
        );
    }
}
