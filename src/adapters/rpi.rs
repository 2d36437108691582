//! Raspberry Pi peripherals: the I2C master and the plate's interrupt line.
//!
//! The MCP23017 INTA output is open-drain and active low, so the GPIO is
//! configured as an input with pull-up and watched for falling edges.  The
//! edge callback runs on rppal's interrupt thread and only raises the
//! monitor's interrupt signal.

use rppal::gpio::{Gpio, InputPin, Trigger};
use rppal::hal::Delay;
use rppal::i2c::I2c;

use log::info;

use crate::events::MonitorHandle;

/// Open the primary I2C bus (`/dev/i2c-1` on current boards).
pub fn open_bus() -> rppal::i2c::Result<I2c> {
    let bus = I2c::new()?;
    info!(
        "RPi: I2C bus {} at {} Hz",
        bus.bus(),
        bus.clock_speed().unwrap_or(0)
    );
    Ok(bus)
}

pub fn delay() -> Delay {
    Delay::new()
}

/// Route falling edges on `bcm_pin` to the monitor.  The returned pin must
/// be kept alive for the interrupt to stay registered.
pub fn watch_interrupt(bcm_pin: u8, monitor: MonitorHandle) -> rppal::gpio::Result<InputPin> {
    let mut pin = Gpio::new()?.get(bcm_pin)?.into_input_pullup();
    pin.set_async_interrupt(Trigger::FallingEdge, None, move |_| {
        monitor.raise_interrupt();
    })?;
    info!("RPi: watching GPIO {} for button interrupts", bcm_pin);
    Ok(pin)
}
