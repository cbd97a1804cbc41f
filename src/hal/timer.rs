//! Periodic step timer capability.

/// A hardware timer shared by every motor of a pool.
///
/// The timer produces the step pulse waveform on its output channel and
/// raises an update event once per period. Implementations wrap the vendor
/// registers; all methods are plain register writes and cannot fail.
pub trait StepTimer {
    /// Program the pulse period in milliseconds.
    ///
    /// Range checking is done by the caller; implementations may assume
    /// `period_ms` is within [7, 50].
    fn set_period_ms(&mut self, period_ms: u16);

    /// Currently programmed pulse period in milliseconds.
    fn period_ms(&self) -> u16;

    /// Start driving the step pulse output.
    fn enable_output(&mut self);

    /// Stop driving the step pulse output.
    fn disable_output(&mut self);

    /// Unmask the update-event interrupt.
    fn listen_update(&mut self);

    /// Mask the update-event interrupt. A pending event is delivered once it
    /// is unmasked again.
    fn unlisten_update(&mut self);
}

/// Scoped critical section over the timer's update interrupt.
///
/// While the guard lives the update event is masked, so the callback cannot
/// observe a half-finished read-modify-write of handle state. The interrupt
/// is unmasked on drop, which covers every exit path including `?`.
/// If the interrupt was not live when the guard was taken, nothing is
/// masked and nothing is restored.
pub struct UpdateDeferred<'a, TIM: StepTimer> {
    timer: &'a mut TIM,
    restore: bool,
}

impl<'a, TIM: StepTimer> UpdateDeferred<'a, TIM> {
    /// Mask the update interrupt if `live`.
    pub fn new(timer: &'a mut TIM, live: bool) -> Self {
        if live {
            timer.unlisten_update();
        }
        Self {
            timer,
            restore: live,
        }
    }
}

impl<TIM: StepTimer> Drop for UpdateDeferred<'_, TIM> {
    fn drop(&mut self) {
        if self.restore {
            self.timer.listen_update();
        }
    }
}
