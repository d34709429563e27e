//! Sensor driver implementations
//!
//! This crate provides concrete drivers built on the byte-level
//! [`I2cMaster`](irtherm_hal::I2cMaster) contract:
//!
//! - MLX90615 infrared thermometer (SMBus, PEC-protected writes)
//!
//! Drivers never name a concrete transport. Any of the bit-banged,
//! register-driven or helper-library masters can be bound at construction.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod error;
pub mod sensor;

#[cfg(test)]
mod mock;

pub use error::{Error, Stage};
pub use sensor::mlx90615::{Mlx90615, RegisterReading, TemperatureSource};
