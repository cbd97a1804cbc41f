//! Motor module for stepper-pool.
//!
//! Provides the fixed-capacity handle pool, the per-motor state and the
//! update-event accounting that stops each motor when its steps run out.

mod handle;
mod pool;
pub mod state;

pub use handle::StepperId;
pub use pool::{
    check_period, StepperPool, Stopped, DEFAULT_CAPACITY, DEFAULT_PERIOD_MS, MAX_PERIOD_MS,
    MIN_PERIOD_MS,
};
pub use state::{Direction, Mode, MotorState};
