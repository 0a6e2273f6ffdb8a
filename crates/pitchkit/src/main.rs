//! Pitchkit CLI binary.
//!
//! - `research`: research a brand and print the structured result
//! - `run`: generate a complete pitch kit, optionally saving assets

use clap::Parser;
use pitchkit::{CampaignBrief, TelemetryFormat, init_telemetry};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, LogFormat, RunOptions, load_config, run_pipeline, run_research};

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_telemetry(match cli.log_format {
        LogFormat::Pretty => TelemetryFormat::Pretty,
        LogFormat::Json => TelemetryFormat::Json,
    })?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Research { brand } => {
            run_research(&config, &brand).await?;
        }

        Commands::Run {
            brand,
            goals,
            audience,
            direction,
            max_images,
            max_animations,
            save,
            owner,
        } => {
            let brief = CampaignBrief::builder()
                .campaign_goals(goals)
                .target_audience(audience)
                .creative_direction(direction)
                .build()?;
            let options = RunOptions {
                brief,
                max_images,
                max_animations,
                save,
                owner,
            };
            run_pipeline(&config, &brand, options).await?;
        }
    }

    Ok(())
}
