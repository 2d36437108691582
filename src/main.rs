//! Thermoplate: main entry point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                    │
//! │                                                          │
//! │  rppal I2C ─▶ RefCellDevice ×3     rppal GPIO (INTA)     │
//! │  CsvSampleLog / LogSampleSink      SystemClock           │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ──────────────     │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  MonitorController (sensors · plate · format)      │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │                                                          │
//! │  EventScheduler (timers · wake · interrupt)              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `thermoplate [config.json]`
#![deny(unused_must_use)]

use std::cell::RefCell;
use std::sync::Arc;

use anyhow::{Context, Result};
use embedded_hal_bus::i2c::RefCellDevice;
use log::info;

use thermoplate::adapters::csv_log::CsvSampleLog;
use thermoplate::adapters::log_sink::LogSampleSink;
use thermoplate::adapters::rpi;
use thermoplate::adapters::time::SystemClock;
use thermoplate::app::service::{MonitorController, probe_display};
use thermoplate::config::MonitorConfig;
use thermoplate::events::{MonitorHandle, MonitorSignals};
use thermoplate::scheduler::EventScheduler;
use thermoplate::sensors::SensorChannel;

fn load_config() -> Result<MonitorConfig> {
    match std::env::args_os().nth(1) {
        Some(path) => MonitorConfig::load(&path)
            .with_context(|| format!("loading config {}", path.to_string_lossy())),
        None => {
            info!("No config file given, using defaults");
            Ok(MonitorConfig::default())
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Thermoplate v{}", env!("CARGO_PKG_VERSION"));
    let config = load_config()?;

    // ── Bus and peripherals ───────────────────────────────────
    let bus = RefCell::new(rpi::open_bus().context("opening I2C bus")?);
    let signals = Arc::new(MonitorSignals::new());
    let handle = MonitorHandle::new(signals.clone());

    // SIGINT and SIGTERM stop the loop so the plate is powered down.
    let stopper = handle.clone();
    ctrlc::set_handler(move || {
        info!("Signal received, stopping");
        stopper.stop();
    })
    .context("installing signal handler")?;

    let display = probe_display(RefCellDevice::new(&bus), config.expander_address, rpi::delay());

    let resolution = config.resolution();
    let [inside, outside] = config.sensor_addresses;
    let sensors = [
        SensorChannel::configure(RefCellDevice::new(&bus), inside, resolution)
            .with_context(|| format!("configuring inside sensor 0x{inside:02x}"))?,
        SensorChannel::configure(RefCellDevice::new(&bus), outside, resolution)
            .with_context(|| format!("configuring outside sensor 0x{outside:02x}"))?,
    ];

    // Kept alive for the lifetime of the loop; dropping it unregisters
    // the edge callback.
    let _interrupt_pin = match display {
        Some(_) => Some(
            rpi::watch_interrupt(config.interrupt_gpio, handle.clone())
                .context("registering button interrupt GPIO")?,
        ),
        None => None,
    };

    // ── Loop ──────────────────────────────────────────────────
    let display_timer = display.is_some().then(|| config.display_timer());
    let mut scheduler = EventScheduler::new(
        signals.clone(),
        config.log_timer(),
        display_timer,
        config.max_wait(),
    );
    let mut controller = MonitorController::new(sensors, display, signals);

    match &config.sample_log_path {
        Some(path) => {
            let mut sink = CsvSampleLog::open(path)
                .with_context(|| format!("opening sample log {path}"))?;
            controller.run(&mut scheduler, &mut sink, &SystemClock);
        }
        None => controller.run(&mut scheduler, &mut LogSampleSink::new(), &SystemClock),
    }

    info!("Done.");
    Ok(())
}
