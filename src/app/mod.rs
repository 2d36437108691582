//! Application core: the monitor loop and the formats it renders.
//!
//! The controller only talks to the outside world through the traits in
//! [`ports`] (event source, sample sink, clock) and the driver types it is
//! handed at construction, so the whole loop runs against fakes in tests.

pub mod events;
pub mod format;
pub mod ports;
pub mod service;
