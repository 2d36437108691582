//! Port traits: the boundary between the monitor loop and its adapters.
//!
//! ```text
//!   EventScheduler ──▶ EventSource ──▶ MonitorController ──▶ SampleSink
//!                                          ▲
//!                         Clock ───────────┘
//! ```

use chrono::{DateTime, Local};

use crate::scheduler::ScheduleEvent;

use super::events::SampleRecord;

// ───────────────────────────────────────────────────────────────
// Event source (driving adapter: timers / signals → domain)
// ───────────────────────────────────────────────────────────────

/// Where the loop blocks between iterations.
pub trait EventSource {
    /// Block until exactly one source is ready.  Must return within a
    /// bounded time so a stop request is observed.
    fn wait(&mut self) -> ScheduleEvent;

    /// Make the next display refresh happen soon instead of on the regular
    /// period.
    fn restart_display_timer(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Sample sink (driven adapter: domain → log file)
// ───────────────────────────────────────────────────────────────

/// Append-only destination for scheduled samples.
pub trait SampleSink {
    fn record(&mut self, sample: &SampleRecord) -> std::io::Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Wall-clock time for sample timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}
