//! Pin assignments for the LCD plate and the Pi header.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding bit positions.
//!
//! The plate is an MCP23017 expander wired as follows:
//!
//! | Bit | GPIOA         | GPIOB               |
//! |-----|---------------|---------------------|
//! | 0   | SELECT button | red LED             |
//! | 1   | RIGHT button  | HD44780 D7          |
//! | 2   | DOWN button   | HD44780 D6          |
//! | 3   | UP button     | HD44780 D5          |
//! | 4   | LEFT button   | HD44780 D4          |
//! | 5   | unused input  | HD44780 EN (clock)  |
//! | 6   | backlight     | HD44780 R/W         |
//! | 7   | green LED     | HD44780 RS          |

// ---------------------------------------------------------------------------
// Bank A: buttons, backlight, green LED
// ---------------------------------------------------------------------------

/// Button inputs on GPIOA, including the unused sixth input.
pub const BUTTON_MASK: u8 = 0b0011_1111;
/// Buttons that raise interrupt-on-change.
pub const BUTTON_INTERRUPT_MASK: u8 = 0b0001_1111;
/// Backlight control (active low).
pub const BACKLIGHT_BIT: u8 = 1 << 6;
/// Green status LED.
pub const GREEN_LED_BIT: u8 = 1 << 7;

// ---------------------------------------------------------------------------
// Bank B: HD44780 control and data lines, red LED
// ---------------------------------------------------------------------------

/// Register Select: 0 = command, 1 = character data.
pub const LCD_RS: u8 = 0b1000_0000;
/// Read/Write: held low, the plate only writes.
pub const LCD_RW: u8 = 0b0100_0000;
/// Enable (clock).  The controller latches on the falling edge.
pub const LCD_EN: u8 = 0b0010_0000;
/// Red status LED, shares the byte with the display lines.
pub const RED_LED_BIT: u8 = 0b0000_0001;

// ---------------------------------------------------------------------------
// Bus addresses and Pi header
// ---------------------------------------------------------------------------

/// Default I2C address of the plate's expander.
pub const EXPANDER_ADDRESS: u8 = 0x20;
/// The two logging sensors: inside and outside.
pub const SENSOR_ADDRESSES: [u8; 2] = [0x48, 0x4A];
/// BCM GPIO carrying the expander's open-drain interrupt (header pin 26).
pub const BUTTON_INTERRUPT_GPIO: u8 = 7;
