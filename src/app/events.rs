//! Records the monitor loop emits.

use core::fmt;

use chrono::{DateTime, Local};

use super::format::float_repr;
use crate::sensors::celsius_to_fahrenheit;

/// `ctime(3)` layout, e.g. `Sun Oct 18 14:03:05 2026`.
pub const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// One scheduled sample: both sensors, read in the same iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRecord {
    pub timestamp: DateTime<Local>,
    /// Inside, outside (°C).
    pub temperatures: [f64; 2],
}

impl SampleRecord {
    pub fn new(timestamp: DateTime<Local>, temperatures: [f64; 2]) -> Self {
        Self {
            timestamp,
            temperatures,
        }
    }
}

/// CSV line without terminator: `ctime,t0,f0,t1,f1`.
impl fmt::Display for SampleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.timestamp.format(CTIME_FORMAT))?;
        for t in self.temperatures {
            write!(
                f,
                ",{},{}",
                float_repr(t),
                float_repr(celsius_to_fahrenheit(t))
            )?;
        }
        Ok(())
    }
}
