//! Board-agnostic core logic for the irtherm sensor stack
//!
//! This crate contains everything that does not touch the bus:
//!
//! - Temperature and emissivity fixed-point conversions
//! - Sensor configuration (optionally persisted with postcard)
//! - The `TemperatureSensor` trait implemented by drivers

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod conversion;
pub mod traits;

pub use config::{ConfigError, SensorConfig};
pub use conversion::Temperature;
