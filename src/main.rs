use anyhow::Result;
use clap::Parser;

use tourguide::cli::commands::{Command, ReplayCommand, ValidateCommand};
use tourguide::cli::{Cli, Commands};
use tourguide::config::TourGuideConfig;
use tourguide::{config, init_config, init_telemetry, shutdown_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _ = TourGuideConfig::load_env_file();
    let settings = config()?;
    init_telemetry(&settings.observability.log_level)?;
    init_config()?;

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?
        .block_on(async {
            match cli.command {
                Commands::Replay {
                    catalog,
                    script,
                    missing,
                    discrete,
                    settle_ms,
                    halt_on_missing,
                } => {
                    let summary = ReplayCommand::new(catalog, script, settings.tour_options())
                        .with_missing(missing)
                        .with_discrete(discrete)
                        .with_settle_ms(settle_ms)
                        .with_halt_on_missing(halt_on_missing)
                        .execute()
                        .await?;
                    eprintln!(
                        "replayed {} commands: {} events, {} rejected",
                        summary.commands, summary.events, summary.rejected
                    );
                    Ok(())
                }
                Commands::Validate { catalog } => ValidateCommand::new(catalog).execute().await,
            }
        });

    shutdown_telemetry();
    result
}
