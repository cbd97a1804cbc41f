//! Reading a driver configuration from TOML (std only).
//!
//! Both entry points validate before returning, so an out-of-range step
//! period surfaces as `ConfigError::InvalidPeriod` rather than a parse error.

use core::fmt::Write;
use std::path::Path;

use heapless::String;

use crate::error::{ConfigError, Result};

use super::validation::validate_config;
use super::DriverConfig;

/// Read and validate a configuration file.
///
/// ```rust,ignore
/// let config = stepper_pool::load_config("steppers.toml")?;
/// let pan = config.require_motor("pan")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DriverConfig> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => parse_config(&text),
        Err(e) => {
            let msg = clipped(format_args!("{}: {}", path.display(), e));
            Err(ConfigError::IoError(msg).into())
        }
    }
}

/// Parse and validate configuration text.
///
/// Unknown modes and malformed tables are `ParseError`; values that parse
/// but fall outside their range come from [`validate_config`].
pub fn parse_config(text: &str) -> Result<DriverConfig> {
    let config: DriverConfig = toml::from_str(text)
        .map_err(|e| ConfigError::ParseError(clipped(format_args!("{}", e.message()))))?;
    validate_config(&config)?;
    Ok(config)
}

/// Render into a bounded message, keeping the leading part when it overflows.
fn clipped(args: core::fmt::Arguments<'_>) -> String<128> {
    let mut out = ClipWriter(String::new());
    // ClipWriter never reports an error.
    let _ = out.write_fmt(args);
    out.0
}

struct ClipWriter(String<128>);

impl Write for ClipWriter {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}
