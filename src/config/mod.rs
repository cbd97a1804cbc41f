//! Configuration module for stepper-pool.
//!
//! Provides types for loading and validating the step timer and per-motor
//! line settings from TOML files (with `std` feature) or pre-parsed data.

mod motor;
mod system;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use motor::MotorConfig;
pub use system::{DriverConfig, TimerConfig};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
