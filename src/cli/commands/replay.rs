use anyhow::{Context, Result};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing::{info, warn};

use super::script::{parse_script, ScriptCommand};
use crate::catalog::{MissingTargetPolicy, StepCatalog, TourOptions};
use crate::tour::{Action, CallbackEvent, StaticResolver, Tour, TourError};

/// Outcome of a replay, for the final summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub commands: usize,
    pub events: usize,
    pub rejected: usize,
}

pub struct ReplayCommand {
    pub catalog: PathBuf,
    pub script: PathBuf,
    pub missing: Vec<String>,
    pub options: TourOptions,
}

impl ReplayCommand {
    pub fn new(catalog: PathBuf, script: PathBuf, options: TourOptions) -> Self {
        Self {
            catalog,
            script,
            missing: Vec::new(),
            options,
        }
    }

    pub fn with_missing(mut self, missing: Vec<String>) -> Self {
        self.missing = missing;
        self
    }

    pub fn with_discrete(mut self, discrete: bool) -> Self {
        if discrete {
            self.options.continuous = false;
        }
        self
    }

    pub fn with_settle_ms(mut self, settle_ms: Option<u64>) -> Self {
        if let Some(ms) = settle_ms {
            self.options.settle_delay = Duration::from_millis(ms);
        }
        self
    }

    pub fn with_halt_on_missing(mut self, halt: bool) -> Self {
        if halt {
            self.options.missing_target = MissingTargetPolicy::Halt;
        }
        self
    }

    /// Replay every script command, printing each callback event as one JSON
    /// line on stdout. Rejected commands are reported on stderr and the replay
    /// carries on.
    pub async fn execute(&self) -> Result<ReplaySummary> {
        let catalog = StepCatalog::load(&self.catalog)?;
        let content = std::fs::read_to_string(&self.script)
            .with_context(|| format!("Failed to read script {}", self.script.display()))?;
        let commands = parse_script(&content)
            .with_context(|| format!("Invalid script {}", self.script.display()))?;

        let resolver = StaticResolver::with_missing(self.missing.iter().cloned());
        let tour = Tour::new(catalog, self.options.clone(), resolver);

        let printed = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&printed);
        tour.on_event(move |event: &CallbackEvent| match serde_json::to_string(event) {
            Ok(line) => {
                println!("{line}");
                counter.set(counter.get() + 1);
            }
            Err(e) => warn!(error = %e, "Failed to serialize callback event"),
        })?;

        let mut summary = ReplaySummary {
            commands: commands.len(),
            ..ReplaySummary::default()
        };
        for command in &commands {
            if let Err(e) = run_command(&tour, *command).await {
                eprintln!("rejected '{command}': {e}");
                summary.rejected += 1;
            }
        }
        summary.events = printed.get();

        info!(
            commands = summary.commands,
            events = summary.events,
            rejected = summary.rejected,
            "Replay finished"
        );
        Ok(summary)
    }
}

async fn run_command(tour: &Tour<StaticResolver>, command: ScriptCommand) -> Result<(), TourError> {
    match command {
        ScriptCommand::Start(index) => tour.start(index),
        ScriptCommand::Advance(action, index) => tour.advance(action, index),
        ScriptCommand::Press(action) => tour.press(action).map(|_| ()),
        ScriptCommand::Open => tour.open().map(|_| ()),
        ScriptCommand::Settle => tour.settle().await.map(|_| ()),
        ScriptCommand::Reset => tour.advance(Action::Reset, None),
    }
}
