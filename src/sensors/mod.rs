//! Temperature sensors: register codecs and the bus-side channel.
//!
//! The logging pair are TMP100-class parts at a fixed linear resolution;
//! TMP102-class parts (alert pin, extended range) are supported through the
//! same [`SensorChannel`] with a different codec.

pub mod channel;
pub mod codec;

pub use channel::{Bound, SensorChannel};
pub use codec::{Resolution, TemperatureCodec, Tmp100Codec, Tmp102Codec, celsius_to_fahrenheit};
