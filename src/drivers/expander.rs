//! MCP23017 16-bit I/O expander, register level.
//!
//! Each register access is exactly one I2C transaction.  Bank B drives the
//! display data/control lines and the red LED; it is write-only by
//! convention, so the last written value is cached here instead of being
//! read back before every nibble.
//!
//! Register addresses assume IOCON.BANK = 0 (the power-on layout).

use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::error::{Error, Result};
use crate::pins;

/// MCP23017 register map (IOCON.BANK = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    IoDirA = 0x00,
    IoDirB = 0x01,
    IPolA = 0x02,
    IPolB = 0x03,
    GpIntEnA = 0x04,
    GpIntEnB = 0x05,
    DefValA = 0x06,
    DefValB = 0x07,
    IntConA = 0x08,
    IntConB = 0x09,
    IoCon = 0x0A,
    GpPuA = 0x0C,
    GpPuB = 0x0D,
    IntFA = 0x0E,
    IntFB = 0x0F,
    IntCapA = 0x10,
    IntCapB = 0x11,
    GpioA = 0x12,
    GpioB = 0x13,
    OLatA = 0x14,
    OLatB = 0x15,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }

    const fn is_bank_b_output(self) -> bool {
        matches!(self, Self::GpioB | Self::OLatB)
    }
}

/// IOCON: interrupt output is open-drain (the Pi input has its own pull-up),
/// active low, INTA/INTB not mirrored.
const IOCON_ODR: u8 = 0b0000_0100;

/// Configuration of one 8-bit bank as last written to the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankConfig {
    /// 1 = input, 0 = output.
    pub direction: u8,
    /// 1 = input reads inverted.
    pub polarity: u8,
    /// 1 = 100k pull-up enabled.
    pub pull_up: u8,
    /// 1 = interrupt-on-change enabled.
    pub interrupt_enable: u8,
}

impl BankConfig {
    /// Register values after power-on reset.
    pub const POWER_ON: Self = Self {
        direction: 0xFF,
        polarity: 0x00,
        pull_up: 0x00,
        interrupt_enable: 0x00,
    };
}

/// The expander and its cached state.
pub struct Expander<I2C> {
    i2c: I2C,
    address: u8,
    bank_a: BankConfig,
    bank_b: BankConfig,
    /// Last value successfully written to GPIOB/OLATB.
    output_b: u8,
}

impl<I2C: I2c> Expander<I2C> {
    /// Wrap the bus.  No I/O happens until [`init`](Self::init).
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            bank_a: BankConfig::POWER_ON,
            bank_b: BankConfig::POWER_ON,
            output_b: 0,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Configure the chip for the LCD plate.
    ///
    /// Buttons become pulled-up, polarity-inverted inputs with
    /// interrupt-on-change against their previous value; everything else is
    /// an output.  A failure on the very first write means nothing answered
    /// at this address and is reported as [`Error::HardwareAbsent`].
    pub fn init(&mut self) -> Result<()> {
        self.write_register(Register::IoCon, IOCON_ODR)
            .map_err(|e| match e {
                Error::Bus(_) => Error::HardwareAbsent("i/o expander"),
                other => other,
            })?;

        let bank_a = BankConfig {
            direction: pins::BUTTON_MASK,
            polarity: pins::BUTTON_MASK,
            pull_up: pins::BUTTON_MASK,
            interrupt_enable: pins::BUTTON_INTERRUPT_MASK,
        };

        self.write_register(Register::IoDirA, bank_a.direction)?;
        self.bank_a.direction = bank_a.direction;
        self.write_register(Register::IoDirB, 0x00)?;
        self.bank_b.direction = 0x00;
        self.write_register(Register::IPolA, bank_a.polarity)?;
        self.bank_a.polarity = bank_a.polarity;
        self.write_register(Register::GpPuA, bank_a.pull_up)?;
        self.bank_a.pull_up = bank_a.pull_up;
        self.write_register(Register::GpIntEnA, bank_a.interrupt_enable)?;
        self.bank_a.interrupt_enable = bank_a.interrupt_enable;
        // Compare against the previous pin value, not DEFVALA.
        self.write_register(Register::IntConA, 0x00)?;

        // Start the bank-B cache from a value the chip really holds.
        self.write_bank_b(0x00)?;

        info!("Expander 0x{:02x}: configured for LCD plate", self.address);
        Ok(())
    }

    /// Write one register.  Writes to GPIOB/OLATB refresh the output cache.
    pub fn write_register(&mut self, reg: Register, value: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[reg.addr(), value])
            .map_err(Error::bus)?;
        if reg.is_bank_b_output() {
            self.output_b = value;
        }
        Ok(())
    }

    /// Read one register.
    pub fn read_register(&mut self, reg: Register) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg.addr()], &mut buf)
            .map_err(Error::bus)?;
        Ok(buf[0])
    }

    /// Drive bank B.  The cache is updated only if the write succeeds.
    pub fn write_bank_b(&mut self, value: u8) -> Result<()> {
        self.write_register(Register::GpioB, value)
    }

    /// Last value successfully written to bank B.
    pub fn bank_b(&self) -> u8 {
        self.output_b
    }

    /// Set or clear output bits on bank A without disturbing its other pins.
    ///
    /// Reads OLATA rather than GPIOA so the button inputs never leak into
    /// the latch.
    pub fn update_bank_a(&mut self, mask: u8, on: bool) -> Result<()> {
        let latch = self.read_register(Register::OLatA)?;
        let next = if on { latch | mask } else { latch & !mask };
        debug!("Expander: OLATA 0x{:02x} -> 0x{:02x}", latch, next);
        self.write_register(Register::OLatA, next)
    }

    /// Read (and thereby clear) the pin state captured at the last interrupt.
    pub fn read_interrupt_capture(&mut self) -> Result<u8> {
        self.read_register(Register::IntCapA)
    }

    pub fn bank_a_config(&self) -> BankConfig {
        self.bank_a
    }

    pub fn bank_b_config(&self) -> BankConfig {
        self.bank_b
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }
}
