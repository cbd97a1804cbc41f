//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::motor::check_period;

use super::DriverConfig;

/// Validate a driver configuration.
///
/// Checks:
/// - The step period is within [7, 50] ms
pub fn validate_config(config: &DriverConfig) -> Result<()> {
    check_period(config.timer.period_ms)
        .map_err(|_| Error::Config(ConfigError::InvalidPeriod(config.timer.period_ms)))?;

    Ok(())
}
