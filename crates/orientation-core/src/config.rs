//! Hub configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Watch interval used when a request does not name one (10 seconds).
pub const DEFAULT_FREQUENCY_MS: u64 = 10_000;

/// Top-level hub configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Interval for watches that do not request a frequency.
    #[serde(default = "default_frequency_ms")]
    pub default_frequency_ms: u64,
}

fn default_frequency_ms() -> u64 {
    DEFAULT_FREQUENCY_MS
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            default_frequency_ms: DEFAULT_FREQUENCY_MS,
        }
    }
}

impl HubConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Self {
        let default_frequency_ms = match std::env::var("ORIENTATION_DEFAULT_FREQUENCY_MS") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    warn!(
                        "Ignoring ORIENTATION_DEFAULT_FREQUENCY_MS={:?}, using {}ms",
                        raw, DEFAULT_FREQUENCY_MS
                    );
                    DEFAULT_FREQUENCY_MS
                }
            },
            Err(_) => DEFAULT_FREQUENCY_MS,
        };

        Self {
            default_frequency_ms,
        }
    }

    pub fn default_frequency(&self) -> Duration {
        Duration::from_millis(self.default_frequency_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.default_frequency(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_missing_field_uses_default() {
        let config: HubConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.default_frequency_ms, DEFAULT_FREQUENCY_MS);
    }
}
