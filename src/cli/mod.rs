use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "tourguide")]
#[command(about = "Step orchestrator for guided product tours")]
#[command(long_about = "Tourguide drives a guided tour through its steps, reporting every \
                       transition as a JSON callback event. Use 'tourguide replay' to run a \
                       script of host commands against a step catalog.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a script of host commands and print every callback event as JSON
    Replay {
        /// Step catalog (TOML, or JSON when the extension is .json)
        #[arg(long, help = "Path to the step catalog file")]
        catalog: PathBuf,
        /// Script with one host command per line
        #[arg(long, help = "Path to the command script (start N, next, prev, go N, update N, stop, close, skip, open, settle, reset, press ACTION)")]
        script: PathBuf,
        /// Targets that cannot be resolved during the replay
        #[arg(long = "missing", value_name = "TARGET", help = "Treat this target as absent from the page (repeatable)")]
        missing: Vec<String>,
        /// Wait at READY until an 'open' command
        #[arg(long, help = "Run the tour in discrete (beacon) mode")]
        discrete: bool,
        /// Settle delay between STEP_BEFORE and TOOLTIP
        #[arg(long, value_name = "MS", help = "Settle delay in milliseconds (defaults to configuration)")]
        settle_ms: Option<u64>,
        /// Stop the tour instead of skipping a missing target
        #[arg(long, help = "Halt the tour when a target is missing")]
        halt_on_missing: bool,
    },
    /// Load a step catalog and print a summary
    Validate {
        /// Step catalog (TOML, or JSON when the extension is .json)
        #[arg(long, help = "Path to the step catalog file")]
        catalog: PathBuf,
    },
}
