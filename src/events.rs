//! Cross-thread signalling between the monitor loop and its collaborators.
//!
//! The loop thread owns the bus and every driver.  Anything else (a request
//! server, the GPIO interrupt callback, a signal handler) only gets a
//! [`MonitorHandle`], which can raise a signal, ask the loop to stop, or
//! read the last published readings.
//!
//! ```text
//! ┌──────────────┐ request_reading ┌──────────┐
//! │ request srv  │───────────────▶│          │
//! │              │◀───────────────│          │
//! └──────────────┘     latest      │  monitor │
//! ┌──────────────┐ raise_interrupt │   loop   │
//! │ GPIO edge cb │───────────────▶│          │
//! └──────────────┘                 └──────────┘
//! ```
//!
//! Signals coalesce: raising one twice before the loop looks at it is the
//! same as raising it once.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// The most recent successful reading of both sensors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReadingSnapshot {
    /// `None` until the first successful read.
    pub timestamp: Option<DateTime<Local>>,
    /// Inside, outside (°C).
    pub temperatures: [Option<f64>; 2],
}

impl ReadingSnapshot {
    pub const EMPTY: Self = Self {
        timestamp: None,
        temperatures: [None, None],
    };
}

/// Shared state between the monitor loop and everything else.
pub struct MonitorSignals {
    pub(crate) wake: Signal<CriticalSectionRawMutex, ()>,
    pub(crate) interrupt: Signal<CriticalSectionRawMutex, ()>,
    stop: AtomicBool,
    latest: Mutex<CriticalSectionRawMutex, Cell<ReadingSnapshot>>,
}

impl MonitorSignals {
    pub const fn new() -> Self {
        Self {
            wake: Signal::new(),
            interrupt: Signal::new(),
            stop: AtomicBool::new(false),
            latest: Mutex::new(Cell::new(ReadingSnapshot::EMPTY)),
        }
    }

    /// Ask for an immediate sensor read.  Never blocks.
    pub fn request_wake(&self) {
        self.wake.signal(());
    }

    /// Report a falling edge on the expander interrupt line.
    pub fn raise_interrupt(&self) {
        self.interrupt.signal(());
    }

    /// Ask the loop to exit.  The loop is woken so it notices promptly.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
        self.wake.signal(());
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub fn publish(&self, snapshot: ReadingSnapshot) {
        self.latest.lock(|cell| cell.set(snapshot));
    }

    pub fn latest(&self) -> ReadingSnapshot {
        self.latest.lock(Cell::get)
    }
}

impl Default for MonitorSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable view for threads other than the monitor loop.
#[derive(Clone)]
pub struct MonitorHandle {
    signals: Arc<MonitorSignals>,
}

impl MonitorHandle {
    pub fn new(signals: Arc<MonitorSignals>) -> Self {
        Self { signals }
    }

    /// Last published readings.
    pub fn latest(&self) -> ReadingSnapshot {
        self.signals.latest()
    }

    /// Wake the loop for a fresh reading.
    pub fn request_reading(&self) {
        self.signals.request_wake();
    }

    pub fn raise_interrupt(&self) {
        self.signals.raise_interrupt();
    }

    pub fn stop(&self) {
        self.signals.request_stop();
    }
}
