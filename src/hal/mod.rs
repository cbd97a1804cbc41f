//! Hardware capabilities consumed by the driver.
//!
//! GPIO lines are plain embedded-hal 1.0 [`OutputPin`](embedded_hal::digital::OutputPin)s.
//! The shared step timer is abstracted by [`StepTimer`] so the accounting
//! logic runs unchanged against a register-backed timer or a test double.

mod lines;
mod timer;

pub use lines::{LinePolarity, StepperLines};
pub use timer::{StepTimer, UpdateDeferred};
