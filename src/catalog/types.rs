use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::tour::TourError;

/// Where the tooltip should float relative to its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    #[default]
    Auto,
    Top,
    Bottom,
    Left,
    Right,
    /// Centered over the page; the target is only used for scrolling.
    Center,
}

/// What happens when a step's target cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingTargetPolicy {
    /// Freeze the run at the missing step with status ERROR.
    Halt,
    /// Move on to the neighbouring step in the direction of travel.
    #[default]
    SkipToNext,
}

/// Per-step overrides of the tour-wide options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepOverrides {
    /// Open the tooltip right away even in discrete mode.
    pub skip_beacon: bool,
    pub settle_delay_ms: Option<u64>,
    pub missing_target: Option<MissingTargetPolicy>,
}

/// One tour stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    /// Host-defined reference to the element to highlight (usually a selector).
    pub target: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub overrides: StepOverrides,
}

impl StepDescriptor {
    pub fn new(target: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            content: content.into(),
            title: None,
            placement: Placement::default(),
            overrides: StepOverrides::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_overrides(mut self, overrides: StepOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Tour-wide options consumed by the run controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourOptions {
    /// Continuous tours open each tooltip automatically; discrete tours wait
    /// at READY for `open()`.
    pub continuous: bool,
    /// Whether the host owns progression. Carried into every event.
    pub controlled: bool,
    pub missing_target: MissingTargetPolicy,
    pub settle_delay: Duration,
}

impl Default for TourOptions {
    fn default() -> Self {
        Self {
            continuous: true,
            controlled: true,
            missing_target: MissingTargetPolicy::SkipToNext,
            settle_delay: Duration::from_millis(100),
        }
    }
}

impl TourOptions {
    pub fn with_continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }

    pub fn with_controlled(mut self, controlled: bool) -> Self {
        self.controlled = controlled;
        self
    }

    pub fn with_missing_target(mut self, policy: MissingTargetPolicy) -> Self {
        self.missing_target = policy;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Settle delay for one step, honouring its override.
    pub fn settle_delay_for(&self, step: &StepDescriptor) -> Duration {
        step.overrides
            .settle_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(self.settle_delay)
    }

    pub fn missing_target_for(&self, step: &StepDescriptor) -> MissingTargetPolicy {
        step.overrides.missing_target.unwrap_or(self.missing_target)
    }

    /// Whether an entered step proceeds to its tooltip without `open()`.
    pub fn opens_immediately(&self, step: &StepDescriptor) -> bool {
        self.continuous || step.overrides.skip_beacon
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    steps: Vec<StepDescriptor>,
}

/// Ordered, immutable list of steps. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCatalog {
    steps: Vec<StepDescriptor>,
}

impl StepCatalog {
    pub fn new(steps: Vec<StepDescriptor>) -> Result<Self, TourError> {
        if steps.is_empty() {
            return Err(TourError::EmptyCatalog);
        }
        Ok(Self { steps })
    }

    pub fn size(&self) -> usize {
        self.steps.len()
    }

    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.steps.len()
    }

    pub fn get(&self, index: usize) -> Result<&StepDescriptor, TourError> {
        self.steps.get(index).ok_or(TourError::IndexOutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            size: self.steps.len(),
        })
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content).context("Invalid TOML step catalog")?;
        Ok(Self::new(file.steps)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(content).context("Invalid JSON step catalog")?;
        Ok(Self::new(file.steps)?)
    }

    /// Load a catalog file; `.json` files are read as JSON, everything else as TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read step catalog {}", path.display()))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }
}
