//! Per-motor handle state.

use embedded_hal::digital::OutputPin;

use crate::error::DriverError;
use crate::hal::{LinePolarity, StepperLines};

use super::state::{Direction, Mode, MotorState};

/// Opaque reference to one motor of a [`StepperPool`](super::StepperPool).
///
/// Handles are slot indices. A slot is never released, so a handle handed out
/// by `create()` stays valid for as long as its pool exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepperId(u8);

impl StepperId {
    /// Build a handle from a raw slot index.
    ///
    /// Meant for command-driven callers that address motors by number; the
    /// pool rejects indices it never allocated with `NullHandle`.
    #[inline]
    pub const fn from_index(index: u8) -> Self {
        Self(index)
    }

    /// Slot index of this handle.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One slot of the pool.
pub(crate) struct Stepper<EN, DIR, MS> {
    /// Bound lines, `None` until `init`.
    lines: Option<StepperLines<EN, DIR, MS>>,

    polarity: LinePolarity,

    /// Pulses remaining before auto-stop.
    steps_left: u32,

    /// True iff the enable line is asserted.
    enabled: bool,

    /// Last mode written to the microstep line.
    mode: Option<Mode>,

    /// Last direction written to the direction line.
    direction: Option<Direction>,
}

impl<EN, DIR, MS> Stepper<EN, DIR, MS>
where
    EN: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
{
    pub(crate) const fn new() -> Self {
        Self {
            lines: None,
            polarity: LinePolarity {
                enable_active_low: false,
                invert_direction: false,
            },
            steps_left: 0,
            enabled: false,
            mode: None,
            direction: None,
        }
    }

    #[inline]
    pub(crate) fn steps_left(&self) -> u32 {
        self.steps_left
    }

    #[inline]
    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub(crate) fn mode(&self) -> Option<Mode> {
        self.mode
    }

    #[inline]
    pub(crate) fn direction(&self) -> Option<Direction> {
        self.direction
    }

    #[inline]
    pub(crate) fn is_bound(&self) -> bool {
        self.lines.is_some()
    }

    pub(crate) fn state(&self) -> MotorState {
        if self.enabled && self.steps_left > 0 {
            MotorState::Running
        } else {
            MotorState::Idle
        }
    }

    /// Replace the bound lines.
    ///
    /// The new enable line is driven inactive (and `mode` applied, if given)
    /// before the old enable line is released. Only when every write succeeds
    /// does the handle take the new lines; otherwise it is untouched and the
    /// lines come back with the error.
    #[allow(clippy::type_complexity)]
    pub(crate) fn bind(
        &mut self,
        mut lines: StepperLines<EN, DIR, MS>,
        polarity: LinePolarity,
        mode: Option<Mode>,
    ) -> Result<Option<StepperLines<EN, DIR, MS>>, (StepperLines<EN, DIR, MS>, DriverError)> {
        if let Err(e) = prepare(&mut lines, polarity, mode) {
            return Err((lines, e));
        }
        if let Some(old) = self.lines.as_mut() {
            if let Err(e) = old.drive_enable(false, self.polarity) {
                return Err((lines, e));
            }
        }

        self.steps_left = 0;
        self.enabled = false;
        self.polarity = polarity;
        self.mode = mode;
        self.direction = None;
        Ok(self.lines.replace(lines))
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) -> Result<(), DriverError> {
        let lines = self.lines.as_mut().ok_or(DriverError::Unbound)?;
        lines.drive_mode(mode)?;
        self.mode = Some(mode);
        Ok(())
    }

    /// Start a run of `steps` pulses.
    ///
    /// If the enable write fails the direction line is put back, so a running
    /// handle keeps its previous command unchanged.
    pub(crate) fn rotate(&mut self, steps: u32, direction: Direction) -> Result<(), DriverError> {
        let polarity = self.polarity;
        let previous = self.direction;
        let lines = self.lines.as_mut().ok_or(DriverError::Unbound)?;

        lines.drive_direction(direction, polarity)?;

        // A zero-step command would leave an enabled motor with nothing to
        // count down; it settles as a stopped handle instead.
        let run = steps > 0;
        if let Err(e) = lines.drive_enable(run, polarity) {
            if let Some(previous) = previous {
                if lines.drive_direction(previous, polarity).is_err() {
                    warn!("direction line restore failed");
                }
            }
            return Err(e);
        }

        self.direction = Some(direction);
        self.steps_left = steps;
        self.enabled = run;
        Ok(())
    }

    /// Cancel any remaining steps and release the enable line.
    ///
    /// Counters are cleared even when the line write fails.
    pub(crate) fn halt(&mut self) -> Result<(), DriverError> {
        self.steps_left = 0;
        self.enabled = false;
        match self.lines.as_mut() {
            Some(lines) => lines.drive_enable(false, self.polarity),
            None => Ok(()),
        }
    }

    /// Consume one step. Returns `true` if the motor stopped on this tick.
    ///
    /// Runs in interrupt context and cannot fail: a failing enable line is
    /// reported through the log and the handle is still marked stopped.
    pub(crate) fn tick(&mut self) -> bool {
        if self.steps_left > 0 {
            self.steps_left -= 1;
        }

        if self.steps_left == 0 && self.enabled {
            self.enabled = false;
            if let Some(lines) = self.lines.as_mut() {
                if lines.drive_enable(false, self.polarity).is_err() {
                    warn!("enable line write failed during auto-stop");
                }
            }
            return true;
        }

        false
    }
}

/// Put fresh lines into a known state before they are bound.
fn prepare<EN, DIR, MS>(
    lines: &mut StepperLines<EN, DIR, MS>,
    polarity: LinePolarity,
    mode: Option<Mode>,
) -> Result<(), DriverError>
where
    EN: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
{
    lines.drive_enable(false, polarity)?;
    if let Some(mode) = mode {
        lines.drive_mode(mode)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Debug)]
    struct NullPin;

    impl ErrorType for NullPin {
        type Error = Infallible;
    }

    impl OutputPin for NullPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn bound() -> Stepper<NullPin, NullPin, NullPin> {
        let mut stepper = Stepper::new();
        stepper
            .bind(
                StepperLines::new(NullPin, NullPin, NullPin),
                LinePolarity::default(),
                None,
            )
            .unwrap();
        stepper
    }

    #[test]
    fn test_new_handle_is_idle() {
        let stepper: Stepper<NullPin, NullPin, NullPin> = Stepper::new();
        assert_eq!(stepper.state(), MotorState::Idle);
        assert_eq!(stepper.steps_left(), 0);
        assert!(!stepper.is_enabled());
        assert!(!stepper.is_bound());
    }

    #[test]
    fn test_tick_on_idle_handle_does_not_underflow() {
        let mut stepper: Stepper<NullPin, NullPin, NullPin> = Stepper::new();
        assert!(!stepper.tick());
        assert_eq!(stepper.steps_left(), 0);
    }

    #[test]
    fn test_tick_counts_down_and_stops() {
        let mut stepper = bound();
        stepper.rotate(3, Direction::Clockwise).unwrap();

        assert!(!stepper.tick());
        assert!(!stepper.tick());
        assert_eq!(stepper.state(), MotorState::Running);
        assert!(stepper.tick());
        assert_eq!(stepper.state(), MotorState::Idle);
        assert!(!stepper.tick());
        assert_eq!(stepper.steps_left(), 0);
    }

    #[test]
    fn test_rotate_zero_steps_stays_idle() {
        let mut stepper = bound();
        stepper.rotate(0, Direction::CounterClockwise).unwrap();
        assert!(!stepper.is_enabled());
        assert_eq!(stepper.direction(), Some(Direction::CounterClockwise));
    }

    /// Accepts writes until `fail` is set.
    #[derive(Debug)]
    struct FlakyPin<'a>(&'a Cell<bool>);

    impl ErrorType for FlakyPin<'_> {
        type Error = embedded_hal::digital::ErrorKind;
    }

    impl OutputPin for FlakyPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.0.get() {
                Err(embedded_hal::digital::ErrorKind::Other)
            } else {
                Ok(())
            }
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.set_low()
        }
    }

    #[test]
    fn test_halt_clears_state_even_if_line_fails() {
        let fail = Cell::new(false);
        let mut stepper = Stepper::new();
        stepper
            .bind(
                StepperLines::new(FlakyPin(&fail), NullPin, NullPin),
                LinePolarity::default(),
                None,
            )
            .unwrap();
        stepper.rotate(10, Direction::Clockwise).unwrap();

        fail.set(true);
        assert_eq!(stepper.halt(), Err(DriverError::PinError));
        assert_eq!(stepper.state(), MotorState::Idle);
        assert_eq!(stepper.steps_left(), 0);
    }

    #[test]
    fn test_auto_stop_survives_line_failure() {
        let fail = Cell::new(false);
        let mut stepper = Stepper::new();
        stepper
            .bind(
                StepperLines::new(FlakyPin(&fail), NullPin, NullPin),
                LinePolarity::default(),
                None,
            )
            .unwrap();
        stepper.rotate(1, Direction::Clockwise).unwrap();

        fail.set(true);
        assert!(stepper.tick());
        assert!(!stepper.is_enabled());
    }

    #[test]
    fn test_unbound_rotate_fails() {
        let mut stepper: Stepper<NullPin, NullPin, NullPin> = Stepper::new();
        assert_eq!(
            stepper.rotate(5, Direction::Clockwise),
            Err(DriverError::Unbound)
        );
        assert_eq!(stepper.steps_left(), 0);
    }

    /// Remembers its level; never fails.
    #[derive(Debug)]
    struct Level<'a>(&'a Cell<bool>);

    impl ErrorType for Level<'_> {
        type Error = Infallible;
    }

    impl OutputPin for Level<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.set(true);
            Ok(())
        }
    }

    #[test]
    fn test_failed_retarget_keeps_running_command() {
        let fail = Cell::new(false);
        let dir = Cell::new(false);
        let mut stepper = Stepper::new();
        stepper
            .bind(
                StepperLines::new(FlakyPin(&fail), Level(&dir), NullPin),
                LinePolarity::default(),
                None,
            )
            .unwrap();
        stepper.rotate(5, Direction::Clockwise).unwrap();
        assert!(dir.get());

        fail.set(true);
        assert_eq!(
            stepper.rotate(9, Direction::CounterClockwise),
            Err(DriverError::PinError)
        );
        assert!(dir.get());
        assert_eq!(stepper.direction(), Some(Direction::Clockwise));
        assert_eq!(stepper.steps_left(), 5);
        assert_eq!(stepper.state(), MotorState::Running);
    }

    #[test]
    fn test_failed_first_rotate_records_nothing() {
        let fail = Cell::new(false);
        let mut stepper = Stepper::new();
        stepper
            .bind(
                StepperLines::new(FlakyPin(&fail), NullPin, NullPin),
                LinePolarity::default(),
                None,
            )
            .unwrap();

        fail.set(true);
        assert!(stepper.rotate(3, Direction::Clockwise).is_err());
        assert_eq!(stepper.direction(), None);
        assert_eq!(stepper.steps_left(), 0);
    }

    #[test]
    fn test_rebind_with_failing_old_line_returns_new_lines() {
        let old_fail = Cell::new(false);
        let new_fail = Cell::new(false);
        let mut stepper = Stepper::new();
        stepper
            .bind(
                StepperLines::new(FlakyPin(&old_fail), NullPin, NullPin),
                LinePolarity::default(),
                None,
            )
            .unwrap();
        stepper.rotate(5, Direction::Clockwise).unwrap();

        old_fail.set(true);
        let new = StepperLines::new(FlakyPin(&new_fail), NullPin, NullPin);
        let (returned, error) = match stepper.bind(new, LinePolarity::default(), Some(Mode::Half)) {
            Err(rejected) => rejected,
            Ok(_) => panic!("rebind should fail while the old line fails"),
        };
        assert_eq!(error, DriverError::PinError);
        assert!(core::ptr::eq(returned.enable.0, &new_fail));

        // Still running its old command on the old lines.
        assert_eq!(stepper.state(), MotorState::Running);
        assert_eq!(stepper.steps_left(), 5);
        assert_eq!(stepper.mode(), None);

        // Once the old line recovers, the same lines bind.
        old_fail.set(false);
        let previous = stepper
            .bind(returned, LinePolarity::default(), Some(Mode::Half))
            .unwrap();
        assert!(previous.is_some());
        assert_eq!(stepper.state(), MotorState::Idle);
        assert_eq!(stepper.mode(), Some(Mode::Half));
    }

    #[test]
    fn test_rebind_with_failing_new_line_keeps_old_binding() {
        let old_fail = Cell::new(false);
        let new_fail = Cell::new(true);
        let mut stepper = Stepper::new();
        stepper
            .bind(
                StepperLines::new(FlakyPin(&old_fail), NullPin, NullPin),
                LinePolarity::default(),
                None,
            )
            .unwrap();
        stepper.rotate(4, Direction::Clockwise).unwrap();

        let new = StepperLines::new(FlakyPin(&new_fail), NullPin, NullPin);
        assert!(stepper.bind(new, LinePolarity::default(), None).is_err());
        assert_eq!(stepper.steps_left(), 4);
        assert_eq!(stepper.state(), MotorState::Running);
        assert!(stepper.is_bound());
    }
}
