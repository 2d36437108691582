//! Event multiplexer for the monitor loop.
//!
//! Four sources feed one blocking wait, bounded by `max_wait` so a stop
//! request is never starved:
//!
//! ```text
//! ┌────────────────┐
//! │ interrupt sig  │──┐
//! │ wake sig       │──┤     ┌───────────────────┐
//! │ log timer      │──┼────▶│ EventScheduler    │──▶ ScheduleEvent
//! │ display timer  │──┘     │  wait()           │
//! └────────────────┘        └───────────────────┘
//! ```
//!
//! Exactly one source is reported per call, in this priority order:
//! interrupt, wake, log timer, display timer.  Timers and the wake signal
//! are acknowledged before `wait` returns; the interrupt signal is consumed
//! too, but the expander itself is acknowledged by the caller (INTCAPA).
//!
//! Timers are deadline-based on `embassy_time::Instant`.  Missed periods
//! are skipped rather than replayed.

use std::sync::Arc;

use embassy_time::{Duration, Instant, Timer};
use futures_lite::future;
use log::debug;

use crate::app::ports::EventSource;
use crate::events::MonitorSignals;

/// What woke the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleEvent {
    LogTick,
    DisplayTick,
    HardwareInterrupt,
    WakeRequest,
    Timeout,
}

// ═══════════════════════════════════════════════════════════════
//  Periodic timer
// ═══════════════════════════════════════════════════════════════

/// A repeating deadline: first expiry `offset` after start, then every
/// `interval`.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTimer {
    offset: Duration,
    interval: Duration,
    next: Option<Instant>,
}

impl PeriodicTimer {
    /// A stopped timer.
    pub const fn new(offset: Duration, interval: Duration) -> Self {
        Self {
            offset,
            interval,
            next: None,
        }
    }

    /// (Re)arm relative to `now`.
    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.offset);
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.next
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next.is_some_and(|at| at <= now)
    }

    /// Consume an expiry: move the deadline to the first period boundary
    /// after `now`.
    pub fn acknowledge(&mut self, now: Instant) {
        if let Some(mut at) = self.next {
            if self.interval == Duration::from_ticks(0) {
                self.next = None;
                return;
            }
            while at <= now {
                at += self.interval;
            }
            self.next = Some(at);
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

pub struct EventScheduler {
    signals: Arc<MonitorSignals>,
    log_timer: PeriodicTimer,
    /// `None` when no display is attached; the interrupt line is then
    /// ignored as well.
    display_timer: Option<PeriodicTimer>,
    max_wait: Duration,
}

impl EventScheduler {
    /// Build the scheduler and start its timers.
    pub fn new(
        signals: Arc<MonitorSignals>,
        mut log_timer: PeriodicTimer,
        mut display_timer: Option<PeriodicTimer>,
        max_wait: Duration,
    ) -> Self {
        let now = Instant::now();
        log_timer.start(now);
        if let Some(t) = display_timer.as_mut() {
            t.start(now);
        }
        Self {
            signals,
            log_timer,
            display_timer,
            max_wait,
        }
    }

    pub fn has_display_timer(&self) -> bool {
        self.display_timer.is_some()
    }

    /// Report and acknowledge the highest-priority ready source.
    fn take_ready(&mut self, now: Instant) -> Option<ScheduleEvent> {
        if self.display_timer.is_some() {
            if self.signals.interrupt.try_take().is_some() {
                return Some(ScheduleEvent::HardwareInterrupt);
            }
        } else {
            self.signals.interrupt.reset();
        }
        if self.signals.wake.try_take().is_some() {
            return Some(ScheduleEvent::WakeRequest);
        }
        if self.log_timer.is_due(now) {
            self.log_timer.acknowledge(now);
            return Some(ScheduleEvent::LogTick);
        }
        if let Some(t) = self.display_timer.as_mut() {
            if t.is_due(now) {
                t.acknowledge(now);
                return Some(ScheduleEvent::DisplayTick);
            }
        }
        None
    }

    fn next_deadline(&self, limit: Instant) -> Instant {
        [
            self.log_timer.deadline(),
            self.display_timer.and_then(|t| t.deadline()),
        ]
        .into_iter()
        .flatten()
        .fold(limit, Instant::min)
    }

    /// Park until a signal fires or `deadline` passes.  A signal that
    /// completes here is consumed and returned.
    fn park(&self, deadline: Instant) -> Option<ScheduleEvent> {
        let watch_interrupt = self.display_timer.is_some();
        let signals = &self.signals;

        let interrupt = async {
            if watch_interrupt {
                signals.interrupt.wait().await;
                Some(ScheduleEvent::HardwareInterrupt)
            } else {
                future::pending::<Option<ScheduleEvent>>().await
            }
        };
        let wake = async {
            signals.wake.wait().await;
            Some(ScheduleEvent::WakeRequest)
        };
        let timer = async {
            Timer::at(deadline).await;
            None
        };

        future::block_on(future::or(interrupt, future::or(wake, timer)))
    }

    /// Block until exactly one source is ready, or `max_wait` elapses.
    pub fn wait(&mut self) -> ScheduleEvent {
        let limit = Instant::now() + self.max_wait;
        loop {
            let now = Instant::now();
            if let Some(event) = self.take_ready(now) {
                debug!("Scheduler: {:?}", event);
                return event;
            }
            if now >= limit || self.signals.stop_requested() {
                return ScheduleEvent::Timeout;
            }
            if let Some(event) = self.park(self.next_deadline(limit)) {
                debug!("Scheduler: {:?}", event);
                return event;
            }
        }
    }

    /// Re-arm the display timer so it fires one offset from now.
    pub fn restart_display_timer(&mut self) {
        if let Some(t) = self.display_timer.as_mut() {
            t.start(Instant::now());
        }
    }
}

impl EventSource for EventScheduler {
    fn wait(&mut self) -> ScheduleEvent {
        EventScheduler::wait(self)
    }

    fn restart_display_timer(&mut self) {
        EventScheduler::restart_display_timer(self);
    }
}
