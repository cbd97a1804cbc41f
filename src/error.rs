//! Error types for stepper-pool.
//!
//! Every operation reports failure synchronously to its caller. Nothing is
//! retried or logged here; escalation is the application's decision.

use core::convert::Infallible;
use core::fmt;

use crate::hal::StepperLines;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Outcome of binding lines: the replaced lines, or the rejected ones.
pub type BindResult<EN, DIR, MS> =
    core::result::Result<Option<StepperLines<EN, DIR, MS>>, BindError<EN, DIR, MS>>;

/// Unified error type for all stepper-pool operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Handle pool or motor control error
    Driver(DriverError),
    /// Configuration parsing or validation error
    Config(ConfigError),
}

/// Errors raised by the handle pool and the control API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Handle was not produced by this pool
    NullHandle,
    /// Every slot of the pool is already allocated
    OutOfHandles,
    /// Argument outside its accepted domain
    InvalidValue(InvalidValue),
    /// Handle is allocated but its lines were never bound
    Unbound,
    /// A GPIO line reported a failure
    PinError,
    /// The shared context has no pool installed
    NotInstalled,
    /// The shared context already holds a pool
    AlreadyInstalled,
}

/// Which argument domain an [`DriverError::InvalidValue`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidValue {
    /// Unrecognized microstep mode (raw divisor)
    Mode(u8),
    /// Unrecognized direction code
    Direction(u8),
    /// Step period in milliseconds outside [7, 50]
    Period(u16),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Configured step period outside [7, 50] ms
    InvalidPeriod(u16),
    /// More motors configured than the pool can hold
    TooManyMotors {
        /// Number of configured motors
        count: usize,
        /// Pool capacity
        capacity: usize,
    },
    /// Motor name not found in configuration
    MotorNotFound(heapless::String<32>),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// A rejected line binding.
///
/// The handle is left exactly as it was and the lines go back to the caller.
/// Converts into [`Error`] so `?` still works where the lines are not needed.
pub struct BindError<EN, DIR, MS> {
    lines: StepperLines<EN, DIR, MS>,
    error: Error,
}

impl<EN, DIR, MS> BindError<EN, DIR, MS> {
    pub(crate) fn new(lines: StepperLines<EN, DIR, MS>, error: impl Into<Error>) -> Self {
        Self {
            lines,
            error: error.into(),
        }
    }

    /// Why the binding was rejected.
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Take back the lines that were not bound.
    pub fn into_lines(self) -> StepperLines<EN, DIR, MS> {
        self.lines
    }

    /// Split into the unbound lines and the error.
    pub fn into_parts(self) -> (StepperLines<EN, DIR, MS>, Error) {
        (self.lines, self.error)
    }
}

impl<EN, DIR, MS> fmt::Debug for BindError<EN, DIR, MS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<EN, DIR, MS> fmt::Display for BindError<EN, DIR, MS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Binding failed: {}", self.error)
    }
}

impl<EN, DIR, MS> From<BindError<EN, DIR, MS>> for Error {
    fn from(e: BindError<EN, DIR, MS>) -> Self {
        e.error
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Driver(e) => write!(f, "Driver error: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::NullHandle => write!(f, "Handle does not belong to this pool"),
            DriverError::OutOfHandles => write!(f, "No free stepper handles left"),
            DriverError::InvalidValue(v) => write!(f, "Invalid value: {}", v),
            DriverError::Unbound => write!(f, "Stepper lines not bound"),
            DriverError::PinError => write!(f, "GPIO pin operation failed"),
            DriverError::NotInstalled => write!(f, "No stepper pool installed"),
            DriverError::AlreadyInstalled => write!(f, "Stepper pool already installed"),
        }
    }
}

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidValue::Mode(v) => write!(f, "mode {}. Valid values: 1, 2", v),
            InvalidValue::Direction(v) => write!(f, "direction {}. Valid values: 0, 1", v),
            InvalidValue::Period(v) => write!(f, "period {} ms. Must be 7-50", v),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidPeriod(v) => {
                write!(f, "Invalid step period: {} ms. Must be 7-50", v)
            }
            ConfigError::TooManyMotors { count, capacity } => {
                write!(f, "{} motors configured but the pool holds {}", count, capacity)
            }
            ConfigError::MotorNotFound(name) => write!(f, "Motor '{}' not found", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

// Conversion impls
impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Error::Driver(e)
    }
}

impl From<InvalidValue> for Error {
    fn from(e: InvalidValue) -> Self {
        Error::Driver(DriverError::InvalidValue(e))
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

// Lets typed arguments go through the same `TryInto` path as raw codes.
impl From<Infallible> for Error {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for DriverError {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl<EN, DIR, MS> std::error::Error for BindError<EN, DIR, MS> {}
