//! LCD plate drivers: expander registers, HD44780 display, buttons.

pub mod button;
pub mod expander;
pub mod lcd;
