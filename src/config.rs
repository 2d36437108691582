//! Monitor configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields a working setup for the standard plate and sensor pair.

use std::path::Path;

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins;
use crate::scheduler::PeriodicTimer;
use crate::sensors::Resolution;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // --- Bus ---
    /// I2C address of the LCD plate's expander.
    pub expander_address: u8,
    /// Inside and outside sensor addresses.
    pub sensor_addresses: [u8; 2],
    /// Sensor converter resolution (9-12 bits).
    pub resolution_bits: u8,

    // --- Timing ---
    /// Sample log period (seconds).
    pub log_interval_secs: u32,
    /// Delay before the first logged sample (milliseconds).
    pub log_offset_ms: u32,
    /// Display refresh period (seconds).
    pub display_interval_secs: u32,
    /// Delay before a (re)started display timer first fires (milliseconds).
    pub display_offset_ms: u32,
    /// Upper bound on one scheduler wait (milliseconds).
    pub max_wait_ms: u32,

    // --- Host ---
    /// BCM GPIO wired to the expander interrupt output.
    pub interrupt_gpio: u8,
    /// Sample CSV file.  `None` logs samples through the logger instead.
    pub sample_log_path: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            expander_address: pins::EXPANDER_ADDRESS,
            sensor_addresses: pins::SENSOR_ADDRESSES,
            resolution_bits: 10,

            log_interval_secs: 1800, // 30 min
            log_offset_ms: 1000,
            display_interval_secs: 30,
            display_offset_ms: 100,
            max_wait_ms: 1000,

            interrupt_gpio: pins::BUTTON_INTERRUPT_GPIO,
            sample_log_path: Some("temperatures.csv".into()),
        }
    }
}

impl MonitorConfig {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject settings the hardware or the scheduler cannot honour.
    pub fn validate(&self) -> Result<()> {
        let seven_bit = |a: u8| (0x08..=0x77).contains(&a);
        if !seven_bit(self.expander_address) {
            return Err(Error::Configuration("expander address outside 0x08..=0x77"));
        }
        if !self.sensor_addresses.iter().copied().all(seven_bit) {
            return Err(Error::Configuration("sensor address outside 0x08..=0x77"));
        }
        if self.sensor_addresses[0] == self.sensor_addresses[1]
            || self.sensor_addresses.contains(&self.expander_address)
        {
            return Err(Error::Configuration("bus addresses must be distinct"));
        }
        Resolution::from_bits(self.resolution_bits)?;
        if self.log_interval_secs == 0 || self.display_interval_secs == 0 {
            return Err(Error::Configuration("timer intervals must be non-zero"));
        }
        if self.max_wait_ms == 0 {
            return Err(Error::Configuration("max_wait_ms must be non-zero"));
        }
        Ok(())
    }

    /// Sensor resolution; falls back to 12 bits if the config was not
    /// validated.
    pub fn resolution(&self) -> Resolution {
        Resolution::from_bits(self.resolution_bits).unwrap_or_default()
    }

    pub fn log_timer(&self) -> PeriodicTimer {
        PeriodicTimer::new(
            Duration::from_millis(self.log_offset_ms.into()),
            Duration::from_secs(self.log_interval_secs.into()),
        )
    }

    pub fn display_timer(&self) -> PeriodicTimer {
        PeriodicTimer::new(
            Duration::from_millis(self.display_offset_ms.into()),
            Duration::from_secs(self.display_interval_secs.into()),
        )
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms.into())
    }
}
