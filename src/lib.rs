//! # stepper-pool
//!
//! Interrupt-driven stepper motor control with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Fixed handle pool**: motors are allocated once from a const-sized pool
//!   and live as long as it does
//! - **embedded-hal 1.0**: `OutputPin` for the enable, direction and
//!   microstep lines
//! - **Shared step timer**: one hardware timer paces every motor; its update
//!   interrupt counts steps down and stops each motor on its own
//! - **Critical sections**: control calls mask the update interrupt while
//!   they modify motor state
//! - **no_std compatible**: core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_pool::{Direction, Mode, SharedPool, StepperPool};
//!
//! static STEPPERS: SharedPool<Pool> = SharedPool::new();
//!
//! let mut pool = StepperPool::new(step_timer);
//! let x = pool.create()?;
//! pool.init(x, en_pin, dir_pin, ms1_pin)?;
//! pool.set_mode(x, Mode::Half)?;
//! pool.set_period(10)?;
//! pool.start();
//! STEPPERS.install(pool)?;
//!
//! STEPPERS.with(|pool| pool.rotate(x, 400, Direction::Clockwise))??;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::result_large_err)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod hal;
pub mod motor;
pub mod shared;

// Re-exports for ergonomic API
pub use config::{validate_config, DriverConfig, MotorConfig, TimerConfig};
pub use error::{BindError, BindResult, ConfigError, DriverError, Error, InvalidValue, Result};
pub use hal::{LinePolarity, StepTimer, StepperLines, UpdateDeferred};
pub use motor::{Direction, Mode, MotorState, StepperId, StepperPool, Stopped};
pub use shared::SharedPool;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};
