//! Fixed-capacity stepper handle pool.
//!
//! The pool owns the shared step timer and every motor's state. Control calls
//! run in thread mode; [`StepperPool::on_update`] runs from the timer's update
//! interrupt. Each control call that touches handle state does so inside an
//! [`UpdateDeferred`] section, so the callback never sees a half-applied
//! command.

use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::config::{DriverConfig, MotorConfig};
use crate::error::{BindError, BindResult, ConfigError, DriverError, Error, InvalidValue, Result};
use crate::hal::{LinePolarity, StepTimer, StepperLines, UpdateDeferred};

use super::handle::{Stepper, StepperId};
use super::state::{Direction, Mode, MotorState};

/// Default number of handles in a pool.
pub const DEFAULT_CAPACITY: usize = 2;

/// Shortest accepted step period in milliseconds.
pub const MIN_PERIOD_MS: u16 = 7;

/// Longest accepted step period in milliseconds.
pub const MAX_PERIOD_MS: u16 = 50;

/// Step period programmed by [`StepperPool::from_config`] when none is given.
pub const DEFAULT_PERIOD_MS: u16 = 10;

/// Handles that reached their step count on one update event.
pub type Stopped<const N: usize> = Vec<StepperId, N>;

/// Check a step period against the accepted range.
pub fn check_period(period_ms: u16) -> core::result::Result<u16, InvalidValue> {
    if (MIN_PERIOD_MS..=MAX_PERIOD_MS).contains(&period_ms) {
        Ok(period_ms)
    } else {
        Err(InvalidValue::Period(period_ms))
    }
}

/// A fixed pool of up to `N` stepper motors sharing one step timer.
///
/// Generic over:
/// - `EN`, `DIR`, `MS`: enable, direction and microstep line types (must
///   implement `OutputPin`; use the HAL's type-erased pins to mix ports)
/// - `TIM`: the shared step timer
/// - `N`: pool capacity (at most 256)
///
/// Slots are allocated once and never freed, so a [`StepperId`] is valid for
/// the whole lifetime of the pool.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_pool::{Direction, StepperPool};
///
/// let mut pool: StepperPool<_, _, _, _> = StepperPool::new(tim2);
/// let x = pool.create()?;
/// pool.init(x, en_x, dir_x, ms_x)?;
/// pool.start();
/// pool.rotate(x, 200, Direction::Clockwise)?;
///
/// // TIM2 update interrupt
/// pool.on_update();
/// ```
pub struct StepperPool<EN, DIR, MS, TIM, const N: usize = DEFAULT_CAPACITY>
where
    EN: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    TIM: StepTimer,
{
    /// Shared step timer.
    timer: TIM,

    /// Allocated handles, in allocation order.
    steppers: Vec<Stepper<EN, DIR, MS>, N>,

    /// Whether the update interrupt is unmasked.
    listening: bool,
}

impl<EN, DIR, MS, TIM, const N: usize> StepperPool<EN, DIR, MS, TIM, N>
where
    EN: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    TIM: StepTimer,
{
    /// Create an empty pool around the shared step timer.
    ///
    /// The timer's output and update interrupt are left untouched until
    /// [`start`](Self::start).
    pub fn new(timer: TIM) -> Self {
        Self {
            timer,
            steppers: Vec::new(),
            listening: false,
        }
    }

    /// Create a pool and program the configured step period.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the period is out of range or more
    /// motors are configured than the pool can hold.
    pub fn from_config(mut timer: TIM, config: &DriverConfig) -> Result<Self> {
        crate::config::validate_config(config)?;

        let count = config.motors.len();
        if count > N {
            return Err(Error::Config(ConfigError::TooManyMotors {
                count,
                capacity: N,
            }));
        }

        timer.set_period_ms(config.timer.period_ms);
        debug!("step period {} ms", config.timer.period_ms);
        Ok(Self::new(timer))
    }

    /// Allocate the next free handle.
    ///
    /// The new handle is idle with no lines bound.
    ///
    /// # Errors
    ///
    /// Returns `OutOfHandles` once all `N` slots are taken.
    pub fn create(&mut self) -> Result<StepperId> {
        let index = u8::try_from(self.steppers.len()).map_err(|_| DriverError::OutOfHandles)?;
        self.steppers
            .push(Stepper::new())
            .map_err(|_| DriverError::OutOfHandles)?;

        trace!("stepper {} allocated", index);
        Ok(StepperId::from_index(index))
    }

    /// Bind the enable, direction and microstep lines to a handle.
    ///
    /// Uses the default [`LinePolarity`]. See
    /// [`init_with_polarity`](Self::init_with_polarity).
    pub fn init(
        &mut self,
        id: StepperId,
        enable: EN,
        direction: DIR,
        microstep: MS,
    ) -> BindResult<EN, DIR, MS> {
        self.init_with_polarity(
            id,
            StepperLines::new(enable, direction, microstep),
            LinePolarity::default(),
        )
    }

    /// Bind lines with an explicit polarity.
    ///
    /// Binding again replaces the previous lines, which are returned. The
    /// handle is halted and the new enable line driven inactive.
    ///
    /// # Errors
    ///
    /// Returns `NullHandle` if `id` was not allocated by this pool, or
    /// `PinError` if a write to the new or the old enable line fails. The
    /// handle is then unchanged and the [`BindError`] holds the lines.
    pub fn init_with_polarity(
        &mut self,
        id: StepperId,
        lines: StepperLines<EN, DIR, MS>,
        polarity: LinePolarity,
    ) -> BindResult<EN, DIR, MS> {
        self.bind(id, lines, polarity, None)
    }

    /// Bind lines and apply a motor's configured polarity and mode.
    ///
    /// The mode is written before the lines are taken, so a failing
    /// microstep line leaves the handle unchanged as well.
    pub fn init_from_config(
        &mut self,
        id: StepperId,
        lines: StepperLines<EN, DIR, MS>,
        config: &MotorConfig,
    ) -> BindResult<EN, DIR, MS> {
        self.bind(id, lines, config.polarity(), Some(config.mode))
    }

    fn bind(
        &mut self,
        id: StepperId,
        lines: StepperLines<EN, DIR, MS>,
        polarity: LinePolarity,
        mode: Option<Mode>,
    ) -> BindResult<EN, DIR, MS> {
        let stepper = match slot_mut(&mut self.steppers, id) {
            Ok(stepper) => stepper,
            Err(e) => return Err(BindError::new(lines, e)),
        };
        let _cs = UpdateDeferred::new(&mut self.timer, self.listening);

        let previous = stepper
            .bind(lines, polarity, mode)
            .map_err(|(lines, e)| BindError::new(lines, e))?;
        trace!("stepper {} bound", id);
        Ok(previous)
    }

    /// Select the microstep mode.
    ///
    /// Accepts a [`Mode`] or a raw microstep divisor (`1` or `2`).
    ///
    /// # Errors
    ///
    /// `NullHandle`, `Unbound`, or `InvalidValue` for an unrecognized mode,
    /// in which case the microstep line is not written.
    pub fn set_mode<M>(&mut self, id: StepperId, mode: M) -> Result<()>
    where
        M: TryInto<Mode>,
        Error: From<M::Error>,
    {
        let stepper = slot_mut(&mut self.steppers, id)?;
        let mode = mode.try_into()?;
        let _cs = UpdateDeferred::new(&mut self.timer, self.listening);

        stepper.set_mode(mode)?;
        Ok(())
    }

    /// Set the period of the shared step timer.
    ///
    /// This changes the pulse rate of every motor in the pool at once.
    ///
    /// # Errors
    ///
    /// `InvalidValue` unless `period_ms` is within [7, 50]; the timer keeps
    /// its current period.
    pub fn set_period(&mut self, period_ms: u16) -> Result<()> {
        let period_ms = check_period(period_ms)?;
        self.timer.set_period_ms(period_ms);
        debug!("step period {} ms", period_ms);
        Ok(())
    }

    /// Currently programmed step period.
    #[inline]
    pub fn period_ms(&self) -> u16 {
        self.timer.period_ms()
    }

    /// Command a handle to run `steps` pulses in `direction`.
    ///
    /// Accepts a [`Direction`] or a raw code (`0` clockwise, `1`
    /// counter-clockwise). Returns immediately; the pulses are counted off by
    /// [`on_update`](Self::on_update). A running handle is re-targeted.
    /// `steps == 0` sets the direction and leaves the handle idle.
    ///
    /// # Errors
    ///
    /// `NullHandle`, `Unbound`, `InvalidValue` for an unrecognized
    /// direction (no line is written), or `PinError`.
    pub fn rotate<D>(&mut self, id: StepperId, steps: u32, direction: D) -> Result<()>
    where
        D: TryInto<Direction>,
        Error: From<D::Error>,
    {
        let stepper = slot_mut(&mut self.steppers, id)?;
        let direction = direction.try_into()?;
        let _cs = UpdateDeferred::new(&mut self.timer, self.listening);

        stepper.rotate(steps, direction)?;
        trace!("stepper {} rotate {} steps", id, steps);
        Ok(())
    }

    /// Stop a handle immediately, discarding any remaining steps.
    ///
    /// Halting an idle handle is a no-op apart from re-driving its enable
    /// line inactive. Once this returns, the next update event cannot
    /// consume a step from this handle.
    ///
    /// # Errors
    ///
    /// `NullHandle`, or `PinError` if the enable line write fails (the
    /// handle is marked stopped regardless).
    pub fn halt(&mut self, id: StepperId) -> Result<()> {
        let stepper = slot_mut(&mut self.steppers, id)?;
        let _cs = UpdateDeferred::new(&mut self.timer, self.listening);

        stepper.halt()?;
        trace!("stepper {} halted", id);
        Ok(())
    }

    /// Halt every allocated handle.
    ///
    /// All handles are stopped even if one enable line fails; the first
    /// failure is reported.
    pub fn halt_all(&mut self) -> Result<()> {
        let _cs = UpdateDeferred::new(&mut self.timer, self.listening);

        let mut result = Ok(());
        for stepper in self.steppers.iter_mut() {
            if let Err(e) = stepper.halt() {
                if result.is_ok() {
                    result = Err(Error::from(e));
                }
            }
        }
        result
    }

    /// Whether the handle is currently receiving step pulses.
    pub fn is_enabled(&self, id: StepperId) -> Result<bool> {
        Ok(slot(&self.steppers, id)?.is_enabled())
    }

    /// Pulses left before the handle stops on its own.
    pub fn steps_left(&self, id: StepperId) -> Result<u32> {
        Ok(slot(&self.steppers, id)?.steps_left())
    }

    /// Last mode written to the handle, if any.
    pub fn mode(&self, id: StepperId) -> Result<Option<Mode>> {
        Ok(slot(&self.steppers, id)?.mode())
    }

    /// Last direction written to the handle, if any.
    pub fn direction(&self, id: StepperId) -> Result<Option<Direction>> {
        Ok(slot(&self.steppers, id)?.direction())
    }

    /// Whether lines have been bound to the handle.
    pub fn is_bound(&self, id: StepperId) -> Result<bool> {
        Ok(slot(&self.steppers, id)?.is_bound())
    }

    /// Observable state of the handle.
    pub fn state(&self, id: StepperId) -> Result<MotorState> {
        Ok(slot(&self.steppers, id)?.state())
    }

    /// Number of allocated handles.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.steppers.len()
    }

    /// Pool capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of handles currently running.
    pub fn running(&self) -> usize {
        self.steppers
            .iter()
            .filter(|s| s.state() == MotorState::Running)
            .count()
    }

    /// Shared step timer.
    #[inline]
    pub fn timer(&self) -> &TIM {
        &self.timer
    }

    /// Whether the update interrupt is unmasked.
    #[inline]
    pub fn is_started(&self) -> bool {
        self.listening
    }

    /// Enable the pulse output and unmask the update interrupt.
    pub fn start(&mut self) {
        self.timer.enable_output();
        self.timer.listen_update();
        self.listening = true;
        debug!("step timer started");
    }

    /// Mask the update interrupt, halt every handle and disable the pulse
    /// output.
    pub fn stop(&mut self) -> Result<()> {
        self.timer.unlisten_update();
        self.listening = false;
        let result = self.halt_all();
        self.timer.disable_output();
        debug!("step timer stopped");
        result
    }

    /// Update-event callback. Call once per timer update interrupt.
    ///
    /// For every allocated handle, consumes one step if any are left and
    /// stops the handle when its count reaches zero. Returns the handles that
    /// stopped on this tick. Must not be re-entered.
    pub fn on_update(&mut self) -> Stopped<N> {
        let mut stopped = Stopped::new();
        for (index, stepper) in self.steppers.iter_mut().enumerate() {
            if stepper.tick() {
                // `create` never hands out a slot past u8::MAX.
                let id = StepperId::from_index(index as u8);
                trace!("stepper {} done", id);
                // At most one entry per slot, so this cannot overflow.
                let _ = stopped.push(id);
            }
        }
        stopped
    }
}

fn slot<EN, DIR, MS, const N: usize>(
    steppers: &Vec<Stepper<EN, DIR, MS>, N>,
    id: StepperId,
) -> core::result::Result<&Stepper<EN, DIR, MS>, DriverError> {
    steppers.get(id.index()).ok_or(DriverError::NullHandle)
}

fn slot_mut<EN, DIR, MS, const N: usize>(
    steppers: &mut Vec<Stepper<EN, DIR, MS>, N>,
    id: StepperId,
) -> core::result::Result<&mut Stepper<EN, DIR, MS>, DriverError> {
    steppers.get_mut(id.index()).ok_or(DriverError::NullHandle)
}
