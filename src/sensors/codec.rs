//! Raw register <-> Celsius conversion for the TMP10x sensor family.
//!
//! Two encodings are in use and they are deliberately separate types:
//!
//! - [`Tmp102Codec`]: 12-bit (normal) or 13-bit (extended) two's complement,
//!   left-justified in the two bytes, 0.0625 °C per LSB in both modes.  In
//!   extended mode bit 0 of the low byte carries the EM flag.
//! - [`Tmp100Codec`]: the high byte is a signed whole-degree value and the
//!   top `bits - 8` bits of the low byte are the fraction.
//!
//! ```text
//!            hi                    lo
//!  normal:   T11..T4               T3..T0 0 0 0 0
//!  extended: T12..T5               T4..T0 0 0 1
//!  linear:   whole degrees (i8)    fraction, 1..4 bits left-justified
//! ```
//!
//! Everything here is pure.

use crate::error::{Error, Result};

/// LSB weight of the TMP102 encoding (both modes).
pub const TMP102_STEP: f64 = 0.0625;

/// Lowest temperature the sensors are specified for.
pub const MIN_CELSIUS: f64 = -55.0;

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    1.8 * celsius + 32.0
}

/// A two-byte register encoding.
pub trait TemperatureCodec {
    /// Register bytes (high, low) -> °C.
    fn decode(&self, raw: [u8; 2]) -> f64;
    /// °C -> register bytes (high, low).  Out-of-range input saturates.
    fn encode(&self, celsius: f64) -> [u8; 2];
    /// Degrees per LSB.
    fn step(&self) -> f64;
    /// Range the sensor is specified for, inclusive.
    fn valid_range(&self) -> (f64, f64);
}

// ---------------------------------------------------------------------------
// TMP102: 12/13-bit two's complement
// ---------------------------------------------------------------------------

/// Decode a TMP102-style reading; `ext` is 0 (12-bit) or 1 (13-bit).
pub fn decode_extended(hi: u8, lo: u8, ext: u8) -> f64 {
    let ext = u32::from(ext & 1);
    let mut raw = (i32::from(hi) << (4 + ext)) | (i32::from(lo) >> (4 - ext));
    if hi & 0x80 != 0 {
        raw -= 1 << (12 + ext);
    }
    f64::from(raw) * TMP102_STEP
}

/// Encode for a TMP102-style register.  The value is truncated toward zero
/// to whole LSBs and saturated to what the width can represent.
pub fn encode_extended(celsius: f64, ext: u8) -> [u8; 2] {
    let ext = u32::from(ext & 1);
    let half = 1i32 << (11 + ext);
    let mut res = ((celsius / TMP102_STEP).trunc() as i32).clamp(-half, half - 1);
    if res < 0 {
        res += 1 << (12 + ext);
    }
    let hi = (res >> (4 + ext)) as u8;
    let lo = ((res << (4 - ext)) & 0xFF) as u8 | ext as u8;
    [hi, lo]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tmp102Codec {
    /// EM bit: 13-bit range instead of 12.
    pub extended: bool,
}

impl Tmp102Codec {
    pub const fn new(extended: bool) -> Self {
        Self { extended }
    }

    fn ext(self) -> u8 {
        u8::from(self.extended)
    }
}

impl TemperatureCodec for Tmp102Codec {
    fn decode(&self, raw: [u8; 2]) -> f64 {
        decode_extended(raw[0], raw[1], self.ext())
    }

    fn encode(&self, celsius: f64) -> [u8; 2] {
        encode_extended(celsius, self.ext())
    }

    fn step(&self) -> f64 {
        TMP102_STEP
    }

    fn valid_range(&self) -> (f64, f64) {
        if self.extended {
            (MIN_CELSIUS, 150.0)
        } else {
            (MIN_CELSIUS, 128.0)
        }
    }
}

// ---------------------------------------------------------------------------
// TMP100: 9..12-bit linear
// ---------------------------------------------------------------------------

/// Converter resolution of a TMP100-class sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    Bits9,
    Bits10,
    Bits11,
    #[default]
    Bits12,
}

impl Resolution {
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            9 => Ok(Self::Bits9),
            10 => Ok(Self::Bits10),
            11 => Ok(Self::Bits11),
            12 => Ok(Self::Bits12),
            _ => Err(Error::Configuration("resolution must be 9..=12 bits")),
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            Self::Bits9 => 9,
            Self::Bits10 => 10,
            Self::Bits11 => 11,
            Self::Bits12 => 12,
        }
    }

    /// R1:R0 in bits 6:5 of the configuration register.
    pub const fn config_bits(self) -> u8 {
        (self.bits() - 9) << 5
    }

    /// LSBs per degree.
    const fn divisor(self) -> i32 {
        1 << (self.bits() - 8)
    }
}

/// Decode a TMP100-style reading at `bits` resolution (9..=12).
pub fn decode_linear(hi: u8, lo: u8, resolution: Resolution) -> f64 {
    let shift = 16 - resolution.bits();
    f64::from(hi as i8) + f64::from(lo >> shift) / f64::from(resolution.divisor())
}

/// Encode for a TMP100-style register, rounding down to the resolution step.
pub fn encode_linear(celsius: f64, resolution: Resolution) -> [u8; 2] {
    let div = resolution.divisor();
    let max = i32::from(i8::MAX) * div + (div - 1);
    let min = i32::from(i8::MIN) * div;
    let steps = ((celsius * f64::from(div)).floor() as i32).clamp(min, max);
    let hi = steps.div_euclid(div) as i8 as u8;
    let lo = (steps.rem_euclid(div) as u8) << (16 - resolution.bits());
    [hi, lo]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tmp100Codec {
    pub resolution: Resolution,
}

impl Tmp100Codec {
    pub const fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }
}

impl TemperatureCodec for Tmp100Codec {
    fn decode(&self, raw: [u8; 2]) -> f64 {
        decode_linear(raw[0], raw[1], self.resolution)
    }

    fn encode(&self, celsius: f64) -> [u8; 2] {
        encode_linear(celsius, self.resolution)
    }

    fn step(&self) -> f64 {
        1.0 / f64::from(self.resolution.divisor())
    }

    fn valid_range(&self) -> (f64, f64) {
        (MIN_CELSIUS, 125.0)
    }
}
