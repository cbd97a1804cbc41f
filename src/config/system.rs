//! Driver configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use super::motor::MotorConfig;
use crate::error::{ConfigError, Result};
use crate::motor::DEFAULT_PERIOD_MS;

/// Shared step timer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimerConfig {
    /// Pulse period in milliseconds, within [7, 50].
    #[serde(default = "default_period_ms")]
    pub period_ms: u16,
}

fn default_period_ms() -> u16 {
    DEFAULT_PERIOD_MS
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
        }
    }
}

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverConfig {
    /// Shared step timer.
    #[serde(default)]
    pub timer: TimerConfig,

    /// Named motor configurations.
    #[serde(default)]
    pub motors: FnvIndexMap<String<32>, MotorConfig, 8>,
}

impl DriverConfig {
    /// Get a motor configuration by name.
    pub fn motor(&self, name: &str) -> Option<&MotorConfig> {
        self.motors
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Get a motor configuration by name, failing with `MotorNotFound`.
    pub fn require_motor(&self, name: &str) -> Result<&MotorConfig> {
        self.motor(name).ok_or_else(|| {
            let mut missing = String::new();
            // Names longer than a key can never match; keep what fits.
            for c in name.chars() {
                if missing.push(c).is_err() {
                    break;
                }
            }
            ConfigError::MotorNotFound(missing).into()
        })
    }
}
