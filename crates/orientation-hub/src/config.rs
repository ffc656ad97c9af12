//! Simulated provider configuration persistence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use orientation_core::Result;
use serde::{Deserialize, Serialize};

/// Persisted settings for [`SimulatedProvider`](crate::SimulatedProvider).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedProviderConfig {
    /// Interval between emitted readings.
    #[serde(default = "default_sample_interval")]
    pub sample_interval_ms: u64,
    /// Delay before the first reading, while the provider is starting.
    #[serde(default = "default_startup_delay")]
    pub startup_delay_ms: u64,
    /// Give up and report failure if no reading arrives within this window.
    #[serde(default = "default_start_timeout")]
    pub start_timeout_ms: u64,
    /// Report that the sensors are unavailable instead of starting.
    #[serde(default)]
    pub fail_to_start: bool,
    /// Azimuth advance per reading, in degrees.
    #[serde(default = "default_azimuth_step")]
    pub azimuth_step: f64,
    /// Path to config file (not serialized).
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_sample_interval() -> u64 {
    100
}
fn default_startup_delay() -> u64 {
    50
}
fn default_start_timeout() -> u64 {
    2000
}
fn default_azimuth_step() -> f64 {
    1.5
}

impl Default for SimulatedProviderConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 100,
            startup_delay_ms: 50,
            start_timeout_ms: 2000,
            fail_to_start: false,
            azimuth_step: 1.5,
            config_path: PathBuf::new(),
        }
    }
}

impl SimulatedProviderConfig {
    /// Load config from `simulator.json` in `config_dir`, or return defaults.
    pub fn load(config_dir: &Path) -> Self {
        let config_path = config_dir.join("simulator.json");
        let mut config: SimulatedProviderConfig = std::fs::read_to_string(&config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        config.config_path = config_path;
        config
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.config_path, json)?;
        Ok(())
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms)
    }
}
