//! The monitor loop, which is the application core.
//!
//! [`MonitorController`] owns both sensor channels, the optional LCD plate
//! and the selected display format.  Everything time- or file-related comes
//! in through the ports, so one iteration ([`step`](MonitorController::step))
//! is a plain function of the event it is handed.
//!
//! ```text
//!  EventSource ──▶ ┌──────────────────────────┐ ──▶ SampleSink
//!                  │    MonitorController     │
//!        Clock ──▶ │ sensors · plate · format │ ──▶ MonitorSignals
//!                  └──────────────────────────┘      (snapshot)
//! ```
//!
//! One iteration:
//!
//! 1. green LED off, then block in the event source;
//! 2. stop requested → leave without touching the bus;
//! 3. anything but a timeout → read both sensors;
//! 4. dispatch on the event (log / refresh / buttons / nothing).
//!
//! A failed sensor read lights the red LED, keeps the previous readings and
//! skips that iteration's log or refresh.  Button interrupts are still
//! serviced so the expander line is re-armed.  If acknowledging the
//! expander fails, the acknowledge is retried on every following iteration
//! (timeouts included) until it goes through; INTA stays low until then and
//! would never produce another edge.

use std::sync::Arc;

use chrono::{DateTime, Local};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{error, info, warn};

use crate::drivers::lcd::{LcdPlate, Led};
use crate::error::{Error, Result};
use crate::events::{MonitorSignals, ReadingSnapshot};
use crate::scheduler::ScheduleEvent;
use crate::sensors::{SensorChannel, Tmp100Codec};

use super::events::SampleRecord;
use super::format::DisplayFormat;
use super::ports::{Clock, EventSource, SampleSink};

/// Try to bring up the LCD plate.  A missing plate is not an error for the
/// monitor; it simply runs without a display.
pub fn probe_display<B: I2c, D: DelayNs>(bus: B, address: u8, delay: D) -> Option<LcdPlate<B, D>> {
    match LcdPlate::probe(bus, address, delay) {
        Ok(lcd) => {
            info!("Monitor: LCD is attached");
            Some(lcd)
        }
        Err(Error::HardwareAbsent(_)) => {
            info!("Monitor: LCD is not attached");
            None
        }
        Err(e) => {
            warn!("Monitor: LCD init failed, running without display: {}", e);
            None
        }
    }
}

/// Whether the loop should go round again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Stopped,
}

// ───────────────────────────────────────────────────────────────
// MonitorController
// ───────────────────────────────────────────────────────────────

pub struct MonitorController<B, D> {
    /// Inside, outside.
    sensors: [SensorChannel<B, Tmp100Codec>; 2],
    display: Option<LcdPlate<B, D>>,
    format: DisplayFormat,
    temperatures: [Option<f64>; 2],
    timestamp: Option<DateTime<Local>>,
    /// INTCAPA/GPIOA read failed; the interrupt is still asserted.
    button_ack_pending: bool,
    signals: Arc<MonitorSignals>,
}

impl<B: I2c, D: DelayNs> MonitorController<B, D> {
    pub fn new(
        sensors: [SensorChannel<B, Tmp100Codec>; 2],
        display: Option<LcdPlate<B, D>>,
        signals: Arc<MonitorSignals>,
    ) -> Self {
        Self {
            sensors,
            display,
            format: DisplayFormat::default(),
            temperatures: [None, None],
            timestamp: None,
            button_ack_pending: false,
            signals,
        }
    }

    pub fn has_display(&self) -> bool {
        self.display.is_some()
    }

    pub fn display_format(&self) -> DisplayFormat {
        self.format
    }

    pub fn temperatures(&self) -> [Option<f64>; 2] {
        self.temperatures
    }

    pub fn snapshot(&self) -> ReadingSnapshot {
        ReadingSnapshot {
            timestamp: self.timestamp,
            temperatures: self.temperatures,
        }
    }

    /// Run `op` against the plate if there is one.
    fn with_display(&mut self, op: impl FnOnce(&mut LcdPlate<B, D>) -> Result<()>) -> Result<()> {
        match self.display.as_mut() {
            Some(lcd) => op(lcd),
            None => Ok(()),
        }
    }

    fn set_led(&mut self, led: Led, on: bool) {
        if let Err(e) = self.with_display(|lcd| lcd.set_led(led, on)) {
            warn!("Monitor: LED {:?} update failed: {}", led, e);
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Loop until a stop is requested, then power the plate down.
    pub fn run(
        &mut self,
        events: &mut impl EventSource,
        sink: &mut impl SampleSink,
        clock: &impl Clock,
    ) {
        info!("Monitor: temperature logging starting");
        while self.step(events, sink, clock) == StepOutcome::Continue {}
        self.shutdown();
        info!("Monitor: temperature logging stopped");
    }

    /// Blank the display and switch every light off.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.with_display(LcdPlate::power_down) {
            warn!("Monitor: display shutdown failed: {}", e);
        }
    }

    // ── One iteration ─────────────────────────────────────────

    pub fn step(
        &mut self,
        events: &mut impl EventSource,
        sink: &mut impl SampleSink,
        clock: &impl Clock,
    ) -> StepOutcome {
        self.set_led(Led::Green, false);

        let event = events.wait();
        if self.signals.stop_requested() {
            return StepOutcome::Stopped;
        }
        if self.button_ack_pending && event != ScheduleEvent::HardwareInterrupt {
            self.handle_buttons(events);
        }
        if event == ScheduleEvent::Timeout {
            return StepOutcome::Continue;
        }

        let fresh = match self.read_sensors(clock) {
            Ok(()) => {
                self.set_led(Led::Green, true);
                self.set_led(Led::Red, false);
                true
            }
            Err(e) => {
                error!("Monitor: error reading sensors: {}", e);
                self.set_led(Led::Red, true);
                false
            }
        };

        match event {
            ScheduleEvent::LogTick if fresh => self.log_sample(sink),
            ScheduleEvent::DisplayTick if fresh => self.refresh_display(),
            ScheduleEvent::HardwareInterrupt => self.handle_buttons(events),
            ScheduleEvent::LogTick
            | ScheduleEvent::DisplayTick
            | ScheduleEvent::WakeRequest
            | ScheduleEvent::Timeout => {}
        }
        StepOutcome::Continue
    }

    /// Read both sensors.  The stored pair is replaced only when both reads
    /// succeed.
    fn read_sensors(&mut self, clock: &impl Clock) -> Result<()> {
        let mut fresh = [0.0; 2];
        for (slot, sensor) in fresh.iter_mut().zip(self.sensors.iter_mut()) {
            *slot = sensor.read_celsius()?;
        }
        self.temperatures = fresh.map(Some);
        self.timestamp = Some(clock.now());
        self.signals.publish(self.snapshot());
        Ok(())
    }

    fn log_sample(&mut self, sink: &mut impl SampleSink) {
        let (Some(timestamp), [Some(inside), Some(outside)]) = (self.timestamp, self.temperatures)
        else {
            return;
        };
        let record = SampleRecord::new(timestamp, [inside, outside]);
        if let Err(e) = sink.record(&record) {
            error!("Monitor: sample log write failed: {}", e);
        }
    }

    fn refresh_display(&mut self) {
        let text = self.format.render(self.temperatures);
        if let Err(e) = self.with_display(|lcd| {
            lcd.clear()?;
            lcd.message(&text)
        }) {
            warn!("Monitor: display refresh failed: {}", e);
        }
    }

    fn handle_buttons(&mut self, events: &mut impl EventSource) {
        let Some(lcd) = self.display.as_mut() else {
            return;
        };
        // Reading INTCAPA re-arms the interrupt line.
        let mask = lcd.acknowledge_interrupt().and_then(|_| lcd.buttons());
        let mask = match mask {
            Ok(mask) => mask,
            Err(e) => {
                warn!("Monitor: button read failed, retrying next cycle: {}", e);
                self.button_ack_pending = true;
                return;
            }
        };
        self.button_ack_pending = false;
        if let Some(format) = DisplayFormat::for_buttons(mask) {
            info!("Monitor: buttons 0x{:02x} -> {:?}", mask.bits(), format);
            self.format = format;
            events.restart_display_timer();
        }
    }
}
