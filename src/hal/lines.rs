//! GPIO lines bound to one stepper driver.

use embedded_hal::digital::{OutputPin, PinState};

use crate::error::DriverError;
use crate::motor::{Direction, Mode};

/// Electrical polarity of the control lines.
///
/// Many driver boards (A4988, DRV8825) take an active-low enable input and
/// some harnesses swap the coil order, reversing the direction sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinePolarity {
    /// Enable input is asserted by driving it low.
    pub enable_active_low: bool,

    /// Clockwise is signalled by driving the direction line low.
    pub invert_direction: bool,
}

/// The three output lines of one stepper driver.
#[derive(Debug)]
pub struct StepperLines<EN, DIR, MS> {
    /// Driver enable input.
    pub enable: EN,
    /// Driver direction input.
    pub direction: DIR,
    /// Microstep select input (MS1).
    pub microstep: MS,
}

impl<EN, DIR, MS> StepperLines<EN, DIR, MS>
where
    EN: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
{
    /// Bundle three lines.
    pub fn new(enable: EN, direction: DIR, microstep: MS) -> Self {
        Self {
            enable,
            direction,
            microstep,
        }
    }

    /// Drive the enable line to the asserted or released level.
    pub(crate) fn drive_enable(
        &mut self,
        enabled: bool,
        polarity: LinePolarity,
    ) -> Result<(), DriverError> {
        let high = enabled != polarity.enable_active_low;
        self.enable
            .set_state(PinState::from(high))
            .map_err(|_| DriverError::PinError)
    }

    /// Drive the direction line.
    pub(crate) fn drive_direction(
        &mut self,
        direction: Direction,
        polarity: LinePolarity,
    ) -> Result<(), DriverError> {
        let high = match direction {
            Direction::Clockwise => !polarity.invert_direction,
            Direction::CounterClockwise => polarity.invert_direction,
        };
        self.direction
            .set_state(PinState::from(high))
            .map_err(|_| DriverError::PinError)
    }

    /// Drive the microstep select line. Full step is MS1 low, half step MS1 high.
    pub(crate) fn drive_mode(&mut self, mode: Mode) -> Result<(), DriverError> {
        let high = match mode {
            Mode::Full => false,
            Mode::Half => true,
        };
        self.microstep
            .set_state(PinState::from(high))
            .map_err(|_| DriverError::PinError)
    }

    /// Give the lines back.
    pub fn release(self) -> (EN, DIR, MS) {
        (self.enable, self.direction, self.microstep)
    }
}
