//! Fixed-point conversions
//!
//! Temperature registers hold a 15-bit magnitude in units of 0.02 K with a
//! 0.01 K offset; bit 15 is the device's error flag and is never part of
//! the value. Emissivity is a fraction of `0x4000`.

/// Kelvin per least significant bit of a temperature register
pub const KELVIN_PER_LSB: f32 = 0.02;

/// Offset subtracted after scaling
pub const KELVIN_OFFSET: f32 = 0.01;

/// 0°C in kelvin
pub const ZERO_CELSIUS_K: f32 = 273.15;

/// Error flag in the high byte of a temperature register
pub const ERROR_FLAG: u16 = 0x8000;

/// Emissivity word for 1.0
pub const EMISSIVITY_UNITY: u16 = 0x4000;

/// Temperature register value to kelvin, error flag masked off
pub fn raw_to_kelvin(raw: u16) -> f32 {
    (raw & !ERROR_FLAG) as f32 * KELVIN_PER_LSB - KELVIN_OFFSET
}

/// Kelvin to degrees Celsius
pub fn kelvin_to_celsius(kelvin: f32) -> f32 {
    kelvin - ZERO_CELSIUS_K
}

/// Degrees Celsius to degrees Fahrenheit
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}

/// Degrees Fahrenheit to degrees Celsius
pub fn fahrenheit_to_celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) / 1.8
}

/// Emissivity (0.0 < e <= 1.0) to its register word
///
/// Returns `None` outside the valid range, and for values so small they
/// round to zero, which is the EEPROM erase word.
pub fn emissivity_to_raw(emissivity: f32) -> Option<u16> {
    if !(emissivity > 0.0 && emissivity <= 1.0) {
        return None;
    }
    match (emissivity * EMISSIVITY_UNITY as f32 + 0.5) as u16 {
        0 => None,
        raw => Some(raw),
    }
}

/// Emissivity register word to a fraction
pub fn raw_to_emissivity(raw: u16) -> f32 {
    (raw & 0x7FFF) as f32 / EMISSIVITY_UNITY as f32
}

/// Round half away from zero without libm
fn round_to_i16(value: f32) -> i16 {
    if value >= 0.0 {
        (value + 0.5) as i16
    } else {
        (value - 0.5) as i16
    }
}

/// A temperature register reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature {
    raw: u16,
}

impl Temperature {
    /// Wrap a raw register value
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    /// Register value as read, error flag included
    pub const fn raw(&self) -> u16 {
        self.raw
    }

    /// Whether the device flagged this reading as invalid
    pub const fn has_error_flag(&self) -> bool {
        self.raw & ERROR_FLAG != 0
    }

    /// Temperature in kelvin
    pub fn kelvin(&self) -> f32 {
        raw_to_kelvin(self.raw)
    }

    /// Temperature in degrees Celsius
    pub fn celsius(&self) -> f32 {
        kelvin_to_celsius(self.kelvin())
    }

    /// Temperature in degrees Fahrenheit
    pub fn fahrenheit(&self) -> f32 {
        celsius_to_fahrenheit(self.celsius())
    }

    /// Temperature in 0.1°C units, rounded
    pub fn celsius_x10(&self) -> i16 {
        round_to_i16(self.celsius() * 10.0)
    }
}
