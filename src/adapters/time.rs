//! Wall-clock adapter.
//!
//! Sample timestamps are local time as reported by the OS; the Pi has no
//! RTC, so they are only meaningful once NTP has synced.

use chrono::{DateTime, Local};

use crate::app::ports::Clock;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
