//! Unified error type for the temperature logger.
//!
//! Three categories cover everything the core can report: a bus transaction
//! that did not complete, a setting that was rejected before it reached the
//! hardware, and a peripheral that was not found at startup.  All variants
//! are `Copy` so the control loop can log and flag them without allocation.

use core::fmt;

use embedded_hal::i2c::{self, ErrorKind};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An I2C transaction failed (device not present, NACK, timeout, ...).
    /// Retried by the next scheduled cycle.
    Bus(ErrorKind),
    /// An address or setting is out of range.  Returned before any bus
    /// traffic, so cached driver state is unchanged.
    Configuration(&'static str),
    /// An expected peripheral did not answer during startup.
    HardwareAbsent(&'static str),
}

impl Error {
    /// Collapse any HAL-specific I2C error into [`Error::Bus`].
    pub fn bus<E: i2c::Error>(err: E) -> Self {
        Self::Bus(err.kind())
    }

    /// True for transport failures, which the loop recovers from locally.
    pub const fn is_bus(&self) -> bool {
        matches!(self, Self::Bus(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(kind) => write!(f, "bus: {kind}"),
            Self::Configuration(msg) => write!(f, "configuration: {msg}"),
            Self::HardwareAbsent(what) => write!(f, "hardware absent: {what}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
