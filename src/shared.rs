//! Process-wide pool shared between thread mode and the timer interrupt.
//!
//! A [`SharedPool`] is meant to live in a `static`. Thread-mode code installs
//! the pool once during bring-up and then reaches it through
//! [`with`](SharedPool::with); the timer's interrupt handler calls
//! [`on_update`](SharedPool::on_update) with no other context.
//!
//! ```rust,ignore
//! static STEPPERS: SharedPool<Pool> = SharedPool::new();
//!
//! #[interrupt]
//! fn TIM2() {
//!     tim2_clear_update_flag();
//!     STEPPERS.on_update();
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

use crate::error::{DriverError, Result};
use crate::hal::StepTimer;
use crate::motor::{StepperPool, Stopped};

/// Statically allocatable slot holding one pool.
pub struct SharedPool<P> {
    inner: Mutex<RefCell<Option<P>>>,
}

impl<P> SharedPool<P> {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install the pool.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInstalled` if a pool is already present; the new pool
    /// is dropped.
    pub fn install(&self, pool: P) -> Result<()> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow_ref_mut(cs);
            if slot.is_some() {
                return Err(DriverError::AlreadyInstalled.into());
            }
            *slot = Some(pool);
            Ok(())
        })
    }

    /// Remove and return the installed pool.
    pub fn take(&self) -> Option<P> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    /// Whether a pool is installed.
    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).is_some())
    }

    /// Run `f` on the installed pool inside a critical section.
    ///
    /// # Errors
    ///
    /// Returns `NotInstalled` if no pool is present.
    pub fn with<R>(&self, f: impl FnOnce(&mut P) -> R) -> Result<R> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow_ref_mut(cs);
            let pool = slot.as_mut().ok_or(DriverError::NotInstalled)?;
            Ok(f(pool))
        })
    }
}

impl<P> Default for SharedPool<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<EN, DIR, MS, TIM, const N: usize> SharedPool<StepperPool<EN, DIR, MS, TIM, N>>
where
    EN: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    TIM: StepTimer,
{
    /// Interrupt entry point: run the update-event callback.
    ///
    /// An update event that fires before a pool is installed is ignored.
    pub fn on_update(&self) -> Stopped<N> {
        self.with(|pool| pool.on_update()).unwrap_or_default()
    }
}
