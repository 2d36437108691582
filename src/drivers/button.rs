//! Plate buttons: bit decoding of the GPIOA input bank.
//!
//! ## Hardware
//!
//! Five active-low momentary switches with the expander's internal pull-ups.
//! Input polarity is inverted in the chip (IPOLA), so a pressed button reads
//! as 1.  Any change raises the expander's interrupt line; the main loop
//! reads the mask once per interrupt, nothing is debounced or latched here.
//!
//! A mask of zero means "nothing held" (the release half of a press).  A
//! failed read is an [`Error::Bus`](crate::error::Error::Bus), never zero.

use embedded_hal::i2c::I2c;

use crate::drivers::expander::{Expander, Register};
use crate::error::Result;
use crate::pins;

/// Button identities with their GPIOA bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Button {
    Select = 0,
    Right = 1,
    Down = 2,
    Up = 3,
    Left = 4,
}

impl Button {
    /// Resolution order when several buttons are held at once.
    pub const PRIORITY: [Self; 5] = [Self::Select, Self::Up, Self::Down, Self::Left, Self::Right];

    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// 6-bit active-high button state (5 buttons + 1 unused input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonMask(u8);

impl ButtonMask {
    pub const fn new(raw: u8) -> Self {
        Self(raw & pins::BUTTON_MASK)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// No button held, i.e. a release event.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_pressed(self, button: Button) -> bool {
        decode(self, button)
    }

    /// Highest-priority held button, if any of the five is held.
    ///
    /// Returns `None` both for an empty mask and for a mask with only the
    /// unused sixth input set.
    pub fn first_pressed(self) -> Option<Button> {
        Button::PRIORITY.into_iter().find(|b| self.is_pressed(*b))
    }
}

/// Pure bit test.
pub const fn decode(mask: ButtonMask, button: Button) -> bool {
    mask.0 & button.bit() != 0
}

/// Read the current button bank.
pub fn read_button_mask<I2C: I2c>(expander: &mut Expander<I2C>) -> Result<ButtonMask> {
    let raw = expander.read_register(Register::GpioA)?;
    Ok(ButtonMask::new(raw))
}
