use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::catalog::{MissingTargetPolicy, TourOptions};

/// Main configuration structure for tourguide
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TourGuideConfig {
    /// Tour-wide defaults applied to every run
    pub tour: TourSettings,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TourSettings {
    /// Open each step's tooltip without waiting for a beacon click
    pub continuous: bool,
    /// Tooltip controls only complete the step; the host picks the next index
    pub controlled: bool,
    /// What to do when a step's target cannot be resolved
    pub missing_target: MissingTargetPolicy,
    /// Delay between STEP_BEFORE and TOOLTIP
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when RUST_LOG is unset
    pub log_level: String,
}

impl Default for TourSettings {
    fn default() -> Self {
        Self {
            continuous: true,
            controlled: true,
            missing_target: MissingTargetPolicy::SkipToNext,
            settle_delay_ms: 100,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl From<&TourSettings> for TourOptions {
    fn from(settings: &TourSettings) -> Self {
        TourOptions::default()
            .with_continuous(settings.continuous)
            .with_controlled(settings.controlled)
            .with_missing_target(settings.missing_target)
            .with_settle_delay(Duration::from_millis(settings.settle_delay_ms))
    }
}

impl TourGuideConfig {
    /// Load configuration from the current directory. Precedence:
    /// 1. Default values
    /// 2. Configuration files (tourguide.toml, .tourguide-rc)
    /// 3. Environment variables (prefixed with TOURGUIDE_, `__` between keys)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        let toml_file = dir.join("tourguide.toml");
        if toml_file.exists() {
            builder = builder.add_source(File::from(toml_file).format(FileFormat::Toml));
        }

        let rc_file = dir.join(".tourguide-rc");
        if rc_file.exists() {
            builder = builder.add_source(File::from(rc_file).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("TOURGUIDE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to read configuration sources")?;
        let tourguide_config: TourGuideConfig = config
            .try_deserialize()
            .context("Invalid tourguide configuration")?;

        Ok(tourguide_config)
    }

    pub fn tour_options(&self) -> TourOptions {
        TourOptions::from(&self.tour)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<TourGuideConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = TourGuideConfig::load_env_file();
        TourGuideConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static TourGuideConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let config = config()?;
    tracing::debug!(
        continuous = config.tour.continuous,
        settle_delay_ms = config.tour.settle_delay_ms,
        "Configuration loaded"
    );
    Ok(())
}
