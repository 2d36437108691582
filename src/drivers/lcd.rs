//! HD44780 character display driven through the expander's bank B.
//!
//! The controller speaks an 8-bit command/data protocol, but the plate only
//! wires four data lines plus RS, R/W and EN.  Every byte therefore goes out
//! as two nibbles, high nibble first, and every nibble is two bank-B writes
//! of the same value: once with EN set, once with EN clear.  The controller
//! latches on the falling edge.
//!
//! The data lines are wired in reverse order (D4 on bit 4 down to D7 on
//! bit 1), so nibbles are mapped through [`FLIP`] before they hit the bus.
//! Bit 0 of the same byte is the red LED, which is carried along from the
//! expander's output cache on every write.
//!
//! ```text
//!  byte 0x28 ──▶ nibble 0x2 ──▶ FLIP[0x2]|EN, FLIP[0x2]
//!           └──▶ nibble 0x8 ──▶ FLIP[0x8]|EN, FLIP[0x8]
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::info;

use crate::drivers::button::{self, ButtonMask};
use crate::drivers::expander::Expander;
use crate::error::{Error, Result};
use crate::pins;

// ---------------------------------------------------------------------------
// Command set
// ---------------------------------------------------------------------------

pub const CLEAR: u8 = 0x01;
pub const HOME: u8 = 0x02;
pub const ENTRY_MODE: u8 = 0x04;
pub const DISPLAY_CTRL: u8 = 0x08;
pub const SHIFT: u8 = 0x10;
pub const FUNCTION_SET: u8 = 0x20;
pub const SET_CGRAM: u8 = 0x40;
pub const SET_DDRAM: u8 = 0x80;

// ENTRY_MODE flags
pub const ENTRY_SHIFT_DISPLAY: u8 = 0x01;
pub const ENTRY_SHIFT_CURSOR: u8 = 0x00;
pub const ENTRY_INCREMENT: u8 = 0x02;

// DISPLAY_CTRL flags
pub const DISPLAY_ON: u8 = 0x04;
pub const CURSOR_ON: u8 = 0x02;
pub const BLINK_ON: u8 = 0x01;

// SHIFT flags
pub const DISPLAY_MOVE: u8 = 0x08;
pub const MOVE_RIGHT: u8 = 0x04;
pub const MOVE_LEFT: u8 = 0x00;

/// 4-bit interface, 2 lines, 5x8 font.
pub const FUNCTION_4BIT_2LINE: u8 = 0x08;

/// DDRAM address of the second row.
pub const ROW2_ADDRESS: u8 = 0x40;

/// DDRAM offsets of rows 0..=3.
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Nibble value -> bank-B line encoding (data lines are reversed).
pub const FLIP: [u8; 16] = [
    0x00, 0x10, 0x08, 0x18, 0x04, 0x14, 0x0C, 0x1C, 0x02, 0x12, 0x0A, 0x1A, 0x06, 0x16, 0x0E, 0x1E,
];

/// CLEAR and HOME keep the controller busy far longer than other commands.
const SETTLE_MS: u32 = 15;

/// Maximum glyph height in CGRAM.
pub const GLYPH_ROWS: usize = 8;

/// DDRAM offset for `row`.
///
/// Rows above 2 fall back to row 1 and negative rows to row 0.  On the
/// two-line plate this keeps "next row" requests on the second line; row 3
/// of the offset table is therefore unreachable.
pub fn row_offset(row: i32) -> u8 {
    let row = if row > 2 {
        1
    } else if row < 0 {
        0
    } else {
        row as usize
    };
    ROW_OFFSETS[row]
}

/// Status outputs on the plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    /// Bank B bit 0, shares the byte with the display lines.
    Red,
    /// Bank A bit 7.
    Green,
    /// Bank A bit 6, wired active-low.
    Backlight,
}

/// The display, its flag state, and the expander it is driven through.
pub struct LcdPlate<I2C, D> {
    expander: Expander<I2C>,
    delay: D,
    entry_mode: u8,
    display_control: u8,
}

impl<I2C: I2c, D: DelayNs> LcdPlate<I2C, D> {
    /// Wrap an already-configured expander.  No I/O.
    pub fn new(expander: Expander<I2C>, delay: D) -> Self {
        Self {
            expander,
            delay,
            entry_mode: ENTRY_SHIFT_CURSOR | ENTRY_INCREMENT,
            display_control: DISPLAY_ON,
        }
    }

    /// Configure the expander, switch the controller to 4-bit mode and reset
    /// it.  Returns [`Error::HardwareAbsent`] when no plate answers.
    pub fn probe(i2c: I2C, address: u8, delay: D) -> Result<Self> {
        let mut expander = Expander::new(i2c, address);
        expander.init()?;

        let mut lcd = Self::new(expander, delay);
        // The controller powers up in 8-bit mode.  0x3, 0x3, 0x3, 0x2 as
        // nibbles forces it into 4-bit mode from any state.
        lcd.write_command(0x33)?;
        lcd.write_command(0x32)?;
        lcd.write_command(FUNCTION_SET | FUNCTION_4BIT_2LINE)?;
        lcd.reset()?;

        info!("LCD: plate attached at 0x{:02x}", address);
        Ok(lcd)
    }

    // ── Bus layer ─────────────────────────────────────────────

    fn write_nibble(&mut self, nibble: u8, mask: u8) -> Result<()> {
        let led = self.expander.bank_b() & pins::RED_LED_BIT;
        let value = FLIP[usize::from(nibble & 0x0F)] | led | mask;
        self.expander.write_bank_b(value | pins::LCD_EN)?;
        self.expander.write_bank_b(value)
    }

    fn write_byte(&mut self, value: u8, mask: u8) -> Result<()> {
        self.write_nibble(value >> 4, mask)?;
        self.write_nibble(value & 0x0F, mask)
    }

    /// Send one command byte (RS low).
    pub fn write_command(&mut self, value: u8) -> Result<()> {
        self.write_byte(value, 0)?;
        if value == CLEAR || value == HOME {
            self.delay.delay_ms(SETTLE_MS);
        }
        Ok(())
    }

    /// Send one character code (RS high).
    pub fn write_char(&mut self, code: u8) -> Result<()> {
        self.write_byte(code, pins::LCD_RS)
    }

    /// Write characters at the cursor.  Characters outside the controller's
    /// 8-bit code space are shown as `?`.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            self.write_char(u8::try_from(c).unwrap_or(b'?'))?;
        }
        Ok(())
    }

    // ── Screen operations ─────────────────────────────────────

    /// Restore default modes and blank the screen.
    pub fn reset(&mut self) -> Result<()> {
        self.entry_mode = ENTRY_SHIFT_CURSOR | ENTRY_INCREMENT;
        self.display_control = DISPLAY_ON;
        self.write_command(CLEAR)?;
        self.write_command(HOME)?;
        self.write_command(ENTRY_MODE | self.entry_mode)?;
        self.write_command(DISPLAY_CTRL | self.display_control)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.write_command(CLEAR)
    }

    pub fn home(&mut self) -> Result<()> {
        self.write_command(HOME)
    }

    /// Move the cursor; see [`row_offset`] for how rows are clamped.
    pub fn set_cursor_pos(&mut self, col: u8, row: i32) -> Result<()> {
        let addr = col.wrapping_add(row_offset(row)) & 0x7F;
        self.write_command(SET_DDRAM | addr)
    }

    /// Write text; each `'\n'` moves to the start of the second row.
    pub fn message(&mut self, text: &str) -> Result<()> {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.write_command(SET_DDRAM | ROW2_ADDRESS)?;
            }
            self.write_text(line)?;
        }
        Ok(())
    }

    /// Scroll the whole display by one column without touching DDRAM.
    pub fn scroll_display(&mut self, left: bool) -> Result<()> {
        let dir = if left { MOVE_LEFT } else { MOVE_RIGHT };
        self.write_command(SHIFT | DISPLAY_MOVE | dir)
    }

    /// Define a custom glyph in CGRAM slot `slot & 7`.
    ///
    /// The cursor is moved back to DDRAM address 0 afterwards; the caller
    /// positions it for subsequent text.
    pub fn create_char(&mut self, slot: u8, bitmap: &[u8]) -> Result<()> {
        if bitmap.len() > GLYPH_ROWS {
            return Err(Error::Configuration("glyph bitmap longer than 8 rows"));
        }
        self.write_command(SET_CGRAM | ((slot & 7) << 3))?;
        for row in bitmap {
            self.write_char(*row)?;
        }
        self.write_command(SET_DDRAM)
    }

    // ── Display control flags ─────────────────────────────────

    fn update_display_control(&mut self, bit: u8, on: bool) -> Result<()> {
        let prev = self.display_control;
        self.display_control = if on { prev | bit } else { prev & !bit };
        let sent = self.write_command(DISPLAY_CTRL | self.display_control);
        if sent.is_err() {
            self.display_control = prev;
        }
        sent
    }

    /// Turn the display on or off without losing its contents.
    pub fn set_display(&mut self, on: bool) -> Result<()> {
        self.update_display_control(DISPLAY_ON, on)
    }

    /// Underline cursor on or off.
    pub fn set_cursor(&mut self, on: bool) -> Result<()> {
        self.update_display_control(CURSOR_ON, on)
    }

    /// Blinking block cursor on or off.
    pub fn set_blink(&mut self, on: bool) -> Result<()> {
        self.update_display_control(BLINK_ON, on)
    }

    // ── Entry mode flags ──────────────────────────────────────

    fn update_entry_mode(&mut self, bit: u8, on: bool) -> Result<()> {
        let prev = self.entry_mode;
        self.entry_mode = if on { prev | bit } else { prev & !bit };
        let sent = self.write_command(ENTRY_MODE | self.entry_mode);
        if sent.is_err() {
            self.entry_mode = prev;
        }
        sent
    }

    pub fn left_to_right(&mut self) -> Result<()> {
        self.update_entry_mode(ENTRY_INCREMENT, true)
    }

    pub fn right_to_left(&mut self) -> Result<()> {
        self.update_entry_mode(ENTRY_INCREMENT, false)
    }

    /// Shift the display instead of the cursor on each write
    /// ("right justify" from the cursor).
    pub fn set_autoscroll(&mut self, on: bool) -> Result<()> {
        self.update_entry_mode(ENTRY_SHIFT_DISPLAY, on)
    }

    pub fn entry_mode(&self) -> u8 {
        self.entry_mode
    }

    pub fn display_control(&self) -> u8 {
        self.display_control
    }

    // ── LEDs and buttons ──────────────────────────────────────

    /// Switch one of the plate's outputs.  For [`Led::Backlight`] `on`
    /// is the raw pin level; use [`set_backlight`](Self::set_backlight).
    pub fn set_led(&mut self, led: Led, on: bool) -> Result<()> {
        match led {
            Led::Red => {
                let current = self.expander.bank_b();
                let next = if on {
                    current | pins::RED_LED_BIT
                } else {
                    current & !pins::RED_LED_BIT
                };
                self.expander.write_bank_b(next)
            }
            Led::Green => self.expander.update_bank_a(pins::GREEN_LED_BIT, on),
            Led::Backlight => self.expander.update_bank_a(pins::BACKLIGHT_BIT, on),
        }
    }

    /// Backlight on or off (the line is active-low).
    pub fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.set_led(Led::Backlight, !on)
    }

    /// Current button state.
    pub fn buttons(&mut self) -> Result<ButtonMask> {
        button::read_button_mask(&mut self.expander)
    }

    /// Acknowledge the expander interrupt; returns the captured pin state.
    pub fn acknowledge_interrupt(&mut self) -> Result<u8> {
        self.expander.read_interrupt_capture()
    }

    /// Blank the screen and switch every output off.
    pub fn power_down(&mut self) -> Result<()> {
        self.clear()?;
        self.set_backlight(false)?;
        self.set_led(Led::Green, false)?;
        self.set_led(Led::Red, false)
    }

    pub fn expander(&self) -> &Expander<I2C> {
        &self.expander
    }
}
