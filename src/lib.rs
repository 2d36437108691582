//! Thermoplate library.
//!
//! Drivers for the LCD button plate (MCP23017 + HD44780) and TMP10x
//! sensors, the event scheduler, and the monitor loop that ties them
//! together.  Hardware access goes through `embedded-hal` traits, so
//! everything except `adapters::rpi` builds and tests on any host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod pins;
pub mod scheduler;
pub mod sensors;

pub use error::{Error, Result};
