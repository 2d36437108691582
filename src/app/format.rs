//! What the display shows, selected by the last button press.
//!
//! | Button | Format        | Example                          |
//! |--------|---------------|----------------------------------|
//! | SELECT | Combined      | `  21.5C, 70.70F` / `  -3.0C, 26.60F` |
//! | UP     | InsideOnly    | `Inside:` / `  21.5C, 70.70F`    |
//! | DOWN   | OutsideOnly   | `Outside:` / `  -3.0C, 26.60F`   |
//! | LEFT   | CelsiusOnly   | `Inside:  21.5C` / `Outside: -3.0C` |
//! | RIGHT  | FahrenheitOnly| `Inside:  70.70F` / `Outside: 26.60F` |
//!
//! Celsius values use the shortest exact decimal form (always with a
//! fractional part), Fahrenheit is fixed at two decimals.  A sensor that
//! has not been read yet shows `--`.

use core::fmt::Write;

use heapless::String;
use log::warn;

use crate::drivers::button::{Button, ButtonMask};
use crate::sensors::celsius_to_fahrenheit;

/// Room for two formatted lines with both Celsius fields at full width.
pub const TEXT_CAPACITY: usize = 80;

pub type DisplayText = String<TEXT_CAPACITY>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayFormat {
    #[default]
    Combined,
    InsideOnly,
    OutsideOnly,
    CelsiusOnly,
    FahrenheitOnly,
    UnknownButton,
}

impl DisplayFormat {
    pub fn for_button(button: Button) -> Self {
        match button {
            Button::Select => Self::Combined,
            Button::Up => Self::InsideOnly,
            Button::Down => Self::OutsideOnly,
            Button::Left => Self::CelsiusOnly,
            Button::Right => Self::FahrenheitOnly,
        }
    }

    /// Format selected by a button mask.  `None` for a release (empty mask).
    pub fn for_buttons(mask: ButtonMask) -> Option<Self> {
        if mask.is_empty() {
            return None;
        }
        Some(mask.first_pressed().map_or(Self::UnknownButton, Self::for_button))
    }

    /// Render both readings.  Text past [`TEXT_CAPACITY`] is cut off.
    pub fn render(self, temperatures: [Option<f64>; 2]) -> DisplayText {
        let [c0, c1] = temperatures.map(celsius);
        let [f0, f1] = temperatures.map(fahrenheit);
        let mut out = DisplayText::new();
        let written = match self {
            Self::Combined => write!(out, "{c0:>6}C, {f0}F\n{c1:>6}C, {f1}F"),
            Self::InsideOnly => write!(out, "Inside:\n{c0:>6}C, {f0}F"),
            Self::OutsideOnly => write!(out, "Outside:\n{c1:>6}C, {f1}F"),
            Self::CelsiusOnly => write!(out, "Inside:  {c0}C\nOutside: {c1}C"),
            Self::FahrenheitOnly => write!(out, "Inside:  {f0}F\nOutside: {f1}F"),
            Self::UnknownButton => out.push_str("Unknown\nButton!").map_err(|()| core::fmt::Error),
        };
        if written.is_err() {
            warn!("Display: {:?} text cut at {} bytes", self, TEXT_CAPACITY);
        }
        out
    }
}

const MISSING: &str = "--";

fn celsius(value: Option<f64>) -> String<24> {
    let mut s = String::new();
    match value {
        Some(c) => {
            // Reprs longer than the field fall back to four decimals.
            if s.push_str(&float_repr(c)).is_err() {
                let _ = write!(s, "{c:.4}");
            }
        }
        None => {
            let _ = s.push_str(MISSING);
        }
    }
    s
}

fn fahrenheit(value: Option<f64>) -> String<24> {
    let mut s = String::new();
    match value {
        Some(c) => {
            let _ = write!(s, "{:.2}", celsius_to_fahrenheit(c));
        }
        None => {
            let _ = s.push_str(MISSING);
        }
    }
    s
}

/// Shortest round-trip decimal, with `.0` appended to whole numbers.
pub fn float_repr(value: f64) -> std::string::String {
    let mut s = format!("{value}");
    if value.is_finite() && !s.contains('.') {
        s.push_str(".0");
    }
    s
}
