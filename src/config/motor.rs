//! Motor configuration from TOML.

use heapless::String;
use serde::Deserialize;

use crate::hal::LinePolarity;
use crate::motor::Mode;

/// Line settings for one motor.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Enable input is asserted by driving it low.
    #[serde(default)]
    pub enable_active_low: bool,

    /// Clockwise is signalled by driving the direction line low.
    #[serde(default)]
    pub invert_direction: bool,

    /// Microstep mode applied when the motor is bound.
    #[serde(default)]
    pub mode: Mode,
}

impl MotorConfig {
    /// Line polarity described by this configuration.
    pub fn polarity(&self) -> LinePolarity {
        LinePolarity {
            enable_active_low: self.enable_active_low,
            invert_direction: self.invert_direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: MotorConfig = toml::from_str(r#"name = "X""#).unwrap();
        assert_eq!(config.name.as_str(), "X");
        assert_eq!(config.polarity(), LinePolarity::default());
        assert_eq!(config.mode, Mode::Full);
    }

    #[test]
    fn test_active_low_half_step() {
        let config: MotorConfig = toml::from_str(
            r#"
name = "Y"
enable_active_low = true
mode = "half"
"#,
        )
        .unwrap();
        assert!(config.polarity().enable_active_low);
        assert!(!config.polarity().invert_direction);
        assert_eq!(config.mode, Mode::Half);
    }
}
