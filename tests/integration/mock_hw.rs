//! Mock hardware for integration tests.
//!
//! [`FakeBus`] emulates the whole I2C segment: an MCP23017 on the plate
//! (register file, button inputs, interrupt capture) and any number of
//! TMP100-class sensors.  Bank-B writes are decoded back into HD44780
//! bytes so tests can assert on what the display was sent.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use thermoplate::app::events::SampleRecord;
use thermoplate::app::ports::{Clock, EventSource, SampleSink};
use thermoplate::app::service::{MonitorController, probe_display};
use thermoplate::drivers::lcd::{CLEAR, FLIP, ROW2_ADDRESS, SET_DDRAM};
use thermoplate::events::MonitorSignals;
use thermoplate::pins;
use thermoplate::scheduler::ScheduleEvent;
use thermoplate::sensors::{Resolution, SensorChannel};

pub const EXPANDER: u8 = 0x20;
pub const INSIDE: u8 = 0x48;
pub const OUTSIDE: u8 = 0x4A;

const GPIOA: u8 = 0x12;
const GPIOB: u8 = 0x13;
const OLATA: u8 = 0x14;
const INTCAPA: u8 = 0x10;

// ── Emulated devices ──────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeExpander {
    pub registers: [u8; 0x16],
    /// Raw button state (active-high, as seen after IPOLA).
    pub buttons: u8,
    pub intcap_reads: usize,
    /// Number of upcoming INTCAPA reads to NACK.
    pub intcap_failures: usize,
    pub bank_b_writes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct FakeSensor {
    pub temperature: [u8; 2],
    pub config: u8,
    pub temperature_reads: usize,
    pub failing: bool,
}

#[derive(Debug, Default)]
pub struct BusState {
    pub expander: Option<FakeExpander>,
    pub sensors: HashMap<u8, FakeSensor>,
    /// Every transaction attempted, by address.
    pub transactions: Vec<u8>,
}

/// Shared, cloneable handle on the emulated bus.
#[derive(Clone, Default)]
pub struct FakeBus(pub Rc<RefCell<BusState>>);

impl FakeBus {
    pub fn new(with_plate: bool) -> Self {
        let bus = Self::default();
        {
            let mut s = bus.0.borrow_mut();
            if with_plate {
                s.expander = Some(FakeExpander::default());
            }
            s.sensors.insert(INSIDE, FakeSensor::default());
            s.sensors.insert(OUTSIDE, FakeSensor::default());
        }
        bus
    }

    pub fn set_temperature(&self, address: u8, raw: [u8; 2]) {
        self.0.borrow_mut().sensors.get_mut(&address).unwrap().temperature = raw;
    }

    pub fn set_sensors_failing(&self, failing: bool) {
        for s in self.0.borrow_mut().sensors.values_mut() {
            s.failing = failing;
        }
    }

    pub fn temperature_reads(&self) -> usize {
        self.0.borrow().sensors.values().map(|s| s.temperature_reads).sum()
    }

    pub fn sensor_config(&self, address: u8) -> u8 {
        self.0.borrow().sensors[&address].config
    }

    pub fn press(&self, buttons: u8) {
        self.with_plate(|p| p.buttons = buttons);
    }

    pub fn with_plate<R>(&self, f: impl FnOnce(&mut FakeExpander) -> R) -> R {
        f(self.0.borrow_mut().expander.as_mut().expect("no plate on this bus"))
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.with_plate(|p| p.registers[usize::from(reg)])
    }

    pub fn fail_intcap_reads(&self, count: usize) {
        self.with_plate(|p| p.intcap_failures = count);
    }

    pub fn intcap_reads(&self) -> usize {
        self.with_plate(|p| p.intcap_reads)
    }

    pub fn transactions_to(&self, address: u8) -> usize {
        self.0.borrow().transactions.iter().filter(|a| **a == address).count()
    }

    /// Bytes latched by the display controller, as (rs, byte).
    pub fn lcd_bytes(&self) -> Vec<(bool, u8)> {
        let writes = self.with_plate(|p| p.bank_b_writes.clone());
        let mut nibbles = Vec::new();
        let mut prev_en = false;
        for w in writes {
            let en = w & pins::LCD_EN != 0;
            if prev_en && !en {
                let n = FLIP.iter().position(|f| *f == w & 0x1E).unwrap() as u8;
                nibbles.push((w & pins::LCD_RS != 0, n));
            }
            prev_en = en;
        }
        nibbles
            .chunks(2)
            .map(|pair| (pair[0].0, pair[0].1 << 4 | pair[1].1))
            .collect()
    }

    /// Text written since the last CLEAR, with the row-2 jump as `'\n'`.
    pub fn screen_text(&self) -> String {
        let bytes = self.lcd_bytes();
        let start = bytes
            .iter()
            .rposition(|b| *b == (false, CLEAR))
            .map_or(0, |i| i + 1);
        bytes[start..]
            .iter()
            .filter_map(|(rs, b)| match (rs, *b) {
                (true, c) => Some(c as char),
                (false, c) if c == SET_DDRAM | ROW2_ADDRESS => Some('\n'),
                _ => None,
            })
            .collect()
    }

    pub fn last_command(&self) -> Option<u8> {
        self.lcd_bytes()
            .into_iter()
            .rev()
            .find_map(|(rs, b)| (!rs).then_some(b))
    }
}

impl ErrorType for FakeBus {
    type Error = ErrorKind;
}

impl I2c for FakeBus {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
        let nack = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);
        let mut state = self.0.borrow_mut();
        state.transactions.push(address);

        if address == EXPANDER {
            let Some(plate) = state.expander.as_mut() else {
                return Err(nack);
            };
            let mut pointer = 0u8;
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        pointer = bytes[0];
                        if let Some(&value) = bytes.get(1) {
                            plate.registers[usize::from(pointer)] = value;
                            if pointer == GPIOB {
                                plate.bank_b_writes.push(value);
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        buf[0] = match pointer {
                            GPIOA => plate.buttons | (plate.registers[usize::from(OLATA)] & 0xC0),
                            INTCAPA if plate.intcap_failures > 0 => {
                                plate.intcap_failures -= 1;
                                return Err(nack);
                            }
                            INTCAPA => {
                                plate.intcap_reads += 1;
                                plate.buttons
                            }
                            reg => plate.registers[usize::from(reg)],
                        };
                    }
                }
            }
            return Ok(());
        }

        let Some(sensor) = state.sensors.get_mut(&address) else {
            return Err(nack);
        };
        let mut pointer = 0u8;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    pointer = bytes[0];
                    if pointer == 0x01 && bytes.len() == 2 {
                        sensor.config = bytes[1];
                    }
                }
                Operation::Read(buf) => match pointer {
                    0x00 => {
                        if sensor.failing {
                            return Err(ErrorKind::Other);
                        }
                        sensor.temperature_reads += 1;
                        buf.copy_from_slice(&sensor.temperature[..buf.len()]);
                    }
                    0x01 => buf[0] = sensor.config,
                    _ => buf.fill(0),
                },
            }
        }
        Ok(())
    }
}

pub struct NoopDelay;

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

// ── Ports ─────────────────────────────────────────────────────

/// Replays a fixed list of events, then asks the loop to stop.
pub struct ScriptedEvents {
    script: VecDeque<ScheduleEvent>,
    signals: Arc<MonitorSignals>,
    pub display_restarts: usize,
}

impl ScriptedEvents {
    pub fn new(signals: Arc<MonitorSignals>, script: &[ScheduleEvent]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            signals,
            display_restarts: 0,
        }
    }
}

impl EventSource for ScriptedEvents {
    fn wait(&mut self) -> ScheduleEvent {
        self.script.pop_front().unwrap_or_else(|| {
            self.signals.request_stop();
            ScheduleEvent::Timeout
        })
    }

    fn restart_display_timer(&mut self) {
        self.display_restarts += 1;
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub records: Vec<SampleRecord>,
}

impl SampleSink for MemorySink {
    fn record(&mut self, sample: &SampleRecord) -> std::io::Result<()> {
        self.records.push(*sample);
        Ok(())
    }
}

pub struct FixedClock(pub DateTime<Local>);

impl FixedClock {
    pub fn new() -> Self {
        Self(Local.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type Controller = MonitorController<FakeBus, NoopDelay>;

pub struct Rig {
    pub bus: FakeBus,
    pub signals: Arc<MonitorSignals>,
    pub controller: Controller,
    pub sink: MemorySink,
    pub clock: FixedClock,
}

impl Rig {
    /// Sensors at 12-bit resolution, plate optional.
    pub fn new(with_plate: bool) -> Self {
        let bus = FakeBus::new(with_plate);
        let signals = Arc::new(MonitorSignals::new());
        let display = probe_display(bus.clone(), EXPANDER, NoopDelay);
        let sensors = [INSIDE, OUTSIDE]
            .map(|a| SensorChannel::configure(bus.clone(), a, Resolution::Bits12).unwrap());
        let controller = MonitorController::new(sensors, display, signals.clone());
        Self {
            bus,
            signals,
            controller,
            sink: MemorySink::default(),
            clock: FixedClock::new(),
        }
    }

    pub fn events(&self, script: &[ScheduleEvent]) -> ScriptedEvents {
        ScriptedEvents::new(self.signals.clone(), script)
    }

    pub fn run(&mut self, events: &mut ScriptedEvents) {
        self.controller.run(events, &mut self.sink, &self.clock);
    }

    pub fn step(&mut self, events: &mut impl EventSource) -> thermoplate::app::service::StepOutcome {
        self.controller.step(events, &mut self.sink, &self.clock)
    }
}
