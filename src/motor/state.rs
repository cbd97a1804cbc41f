//! Motor state, direction and microstep mode.

use serde::Deserialize;

use crate::error::InvalidValue;

/// Observable state of one handle.
///
/// Derived from the handle's fields rather than stored: a handle is
/// `Running` exactly when it is enabled with steps left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorState {
    /// Not receiving step pulses.
    #[default]
    Idle,
    /// Enabled and consuming one step per update event.
    Running,
}

/// Rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise rotation (direction line high unless inverted).
    #[default]
    Clockwise,
    /// Counter-clockwise rotation.
    CounterClockwise,
}

impl Direction {
    /// Wire code used by command-driven callers.
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            Direction::Clockwise => 0,
            Direction::CounterClockwise => 1,
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Clockwise),
            1 => Ok(Direction::CounterClockwise),
            other => Err(InvalidValue::Direction(other)),
        }
    }
}

/// Microstep resolution selected through the MS1 line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// One pulse per full step.
    #[default]
    Full,
    /// Two pulses per full step.
    Half,
}

impl TryFrom<u8> for Mode {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Mode::Full),
            2 => Ok(Mode::Half),
            other => Err(InvalidValue::Mode(other)),
        }
    }
}
