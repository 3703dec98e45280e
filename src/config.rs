use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_INPUTS: &str = "data/inputs.sample.txt";
pub const DEFAULT_OUTPUT: &str = "data/sample_output.json";
pub const DEFAULT_SETTINGS: &str = "config/settings.example.json";
pub const DEFAULT_SCHEMA: &str = "schemas/product.schema.json";
pub const DEFAULT_DELAY_SECONDS: f64 = 1.0;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 20;

const ENV_PREFIX: &str = "G2";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Pause between consecutive network fetches.
    pub delay_seconds: f64,
    pub timeout_seconds: u64,
}

impl Settings {
    /// Layers: built-in defaults (delay from the CLI), then the JSON settings
    /// file if it exists, then `G2_*` environment variables.
    pub fn load(path: &Path, cli_delay: f64) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("delay_seconds", cli_delay)?
            .set_default("timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?;

        if path.exists() {
            builder = builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Json));
        } else {
            warn!("Settings file not found at {}, using defaults.", path.display());
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to load settings from {}", path.display()))?
            .try_deserialize()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        info!(
            delay_seconds = settings.delay_seconds,
            timeout_seconds = settings.timeout_seconds,
            "Settings loaded"
        );
        Ok(settings)
    }

    /// `None` for zero, negative or non-finite delays.
    pub fn delay(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.delay_seconds)
            .ok()
            .filter(|d| !d.is_zero())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delay_seconds: DEFAULT_DELAY_SECONDS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}
