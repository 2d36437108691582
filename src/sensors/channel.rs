//! One temperature sensor on the shared bus.
//!
//! [`SensorChannel`] is generic over the register encoding.  The parts every
//! TMP10x shares (temperature read, T_LOW/T_HIGH thresholds) live on the
//! generic impl; the configuration register layout differs per part and is
//! exposed on codec-specific impls.

use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::error::{Error, Result};
use crate::sensors::codec::{Resolution, TemperatureCodec, Tmp100Codec, Tmp102Codec};

/// TMP10x pointer register values.
pub mod register {
    pub const TEMPERATURE: u8 = 0x00;
    pub const CONFIG: u8 = 0x01;
    pub const T_LOW: u8 = 0x02;
    pub const T_HIGH: u8 = 0x03;
}

/// Which alert threshold register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Low,
    High,
}

impl Bound {
    const fn register(self) -> u8 {
        match self {
            Self::Low => register::T_LOW,
            Self::High => register::T_HIGH,
        }
    }
}

pub struct SensorChannel<I2C, C> {
    i2c: I2C,
    address: u8,
    codec: C,
}

impl<I2C: I2c, C: TemperatureCodec> SensorChannel<I2C, C> {
    /// Wrap a sensor without touching the bus.
    pub fn new(i2c: I2C, address: u8, codec: C) -> Self {
        Self {
            i2c,
            address,
            codec,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    fn read_pair(&mut self, reg: u8) -> Result<[u8; 2]> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(Error::bus)?;
        Ok(buf)
    }

    /// Current temperature in °C.
    pub fn read_celsius(&mut self) -> Result<f64> {
        let raw = self.read_pair(register::TEMPERATURE)?;
        Ok(self.codec.decode(raw))
    }

    /// Program an alert threshold.  The value is clamped to the sensor's
    /// specified range before encoding.
    pub fn set_threshold(&mut self, bound: Bound, celsius: f64) -> Result<()> {
        if celsius.is_nan() {
            return Err(Error::Configuration("threshold is not a number"));
        }
        let (lo, hi) = self.codec.valid_range();
        let [b0, b1] = self.codec.encode(celsius.clamp(lo, hi));
        self.i2c
            .write(self.address, &[bound.register(), b0, b1])
            .map_err(Error::bus)
    }

    pub fn threshold(&mut self, bound: Bound) -> Result<f64> {
        let raw = self.read_pair(bound.register())?;
        Ok(self.codec.decode(raw))
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

// ---------------------------------------------------------------------------
// TMP102
// ---------------------------------------------------------------------------

/// TMP102 conversion rate (CR1:CR0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConversionRate {
    QuarterHz = 0,
    OneHz = 1,
    FourHz = 2,
    EightHz = 3,
}

/// Consecutive faults before the alert asserts (F1:F0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultQueue {
    One = 0,
    Two = 1,
    Four = 2,
    Six = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlertPolarity {
    ActiveLow = 0,
    ActiveHigh = 1,
}

/// Thermostat mode (TM).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlertMode {
    Comparator = 0,
    Interrupt = 1,
}

/// A field of the two-byte TMP102 configuration register.
///
/// Byte 0: `OS R1 R0 F1 F0 POL TM SD`, byte 1: `CR1 CR0 AL EM 0 0 0 0`.
#[derive(Debug, Clone, Copy)]
struct ConfigField {
    byte: usize,
    shift: u8,
    width: u8,
}

impl ConfigField {
    const SHUTDOWN: Self = Self::new(0, 0, 1);
    const ALERT_MODE: Self = Self::new(0, 1, 1);
    const POLARITY: Self = Self::new(0, 2, 1);
    const FAULT_QUEUE: Self = Self::new(0, 3, 2);
    const EXTENDED: Self = Self::new(1, 4, 1);
    const ALERT: Self = Self::new(1, 5, 1);
    const CONVERSION_RATE: Self = Self::new(1, 6, 2);

    const fn new(byte: usize, shift: u8, width: u8) -> Self {
        Self { byte, shift, width }
    }

    const fn mask(self) -> u8 {
        (((1u16 << self.width) - 1) as u8) << self.shift
    }

    fn extract(self, config: [u8; 2]) -> u8 {
        (config[self.byte] & self.mask()) >> self.shift
    }

    fn inject(self, mut config: [u8; 2], value: u8) -> [u8; 2] {
        config[self.byte] = (config[self.byte] & !self.mask()) | ((value << self.shift) & self.mask());
        config
    }
}

impl<I2C: I2c> SensorChannel<I2C, Tmp102Codec> {
    /// Addresses selectable with the ADD0 pin.
    pub const ADDRESSES: [u8; 4] = [0x48, 0x49, 0x4A, 0x4B];

    /// Validate the address and learn the current extended-mode setting
    /// from the chip.
    pub fn probe(i2c: I2C, address: u8) -> Result<Self> {
        if !Self::ADDRESSES.contains(&address) {
            return Err(Error::Configuration("TMP102 address must be 0x48..=0x4B"));
        }
        let mut channel = Self::new(i2c, address, Tmp102Codec::default());
        let config = channel.read_config()?;
        info!(
            "TMP102 0x{:02x}: config 0x{:02x} 0x{:02x}",
            address, config[0], config[1]
        );
        channel.codec.extended = ConfigField::EXTENDED.extract(config) != 0;
        Ok(channel)
    }

    fn read_config(&mut self) -> Result<[u8; 2]> {
        self.read_pair(register::CONFIG)
    }

    fn update_config(&mut self, field: ConfigField, value: u8) -> Result<()> {
        let current = self.read_config()?;
        let next = field.inject(current, value);
        debug!(
            "TMP102 0x{:02x}: config {:02x?} -> {:02x?}",
            self.address, current, next
        );
        self.i2c
            .write(self.address, &[register::CONFIG, next[0], next[1]])
            .map_err(Error::bus)
    }

    /// Switch between 12-bit (-55..128 °C) and 13-bit (-55..150 °C) range.
    pub fn set_extended_mode(&mut self, extended: bool) -> Result<()> {
        self.update_config(ConfigField::EXTENDED, u8::from(extended))?;
        self.codec.extended = extended;
        Ok(())
    }

    pub fn set_conversion_rate(&mut self, rate: ConversionRate) -> Result<()> {
        self.update_config(ConfigField::CONVERSION_RATE, rate as u8)
    }

    /// Stop continuous conversion.
    pub fn shutdown(&mut self) -> Result<()> {
        self.update_config(ConfigField::SHUTDOWN, 1)
    }

    pub fn wake_up(&mut self) -> Result<()> {
        self.update_config(ConfigField::SHUTDOWN, 0)
    }

    pub fn set_alert_polarity(&mut self, polarity: AlertPolarity) -> Result<()> {
        self.update_config(ConfigField::POLARITY, polarity as u8)
    }

    pub fn set_fault_queue(&mut self, faults: FaultQueue) -> Result<()> {
        self.update_config(ConfigField::FAULT_QUEUE, faults as u8)
    }

    pub fn set_alert_mode(&mut self, mode: AlertMode) -> Result<()> {
        self.update_config(ConfigField::ALERT_MODE, mode as u8)
    }

    /// State of the AL bit.
    pub fn alert(&mut self) -> Result<bool> {
        let config = self.read_config()?;
        Ok(ConfigField::ALERT.extract(config) != 0)
    }
}

// ---------------------------------------------------------------------------
// TMP100
// ---------------------------------------------------------------------------

impl<I2C: I2c> SensorChannel<I2C, Tmp100Codec> {
    /// Write the resolution and log the configuration register read back.
    pub fn configure(i2c: I2C, address: u8, resolution: Resolution) -> Result<Self> {
        let mut channel = Self::new(i2c, address, Tmp100Codec::new(resolution));
        channel.set_resolution(resolution)?;
        let config = channel.config_register()?;
        info!("TMP100 0x{:02x}: config 0x{:02x}", address, config);
        Ok(channel)
    }

    /// Program R1:R0.  The rest of the configuration byte is reset to zero.
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<()> {
        self.i2c
            .write(self.address, &[register::CONFIG, resolution.config_bits()])
            .map_err(Error::bus)?;
        self.codec.resolution = resolution;
        Ok(())
    }

    pub fn config_register(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register::CONFIG], &mut buf)
            .map_err(Error::bus)?;
        Ok(buf[0])
    }
}
