//! Software I2C master for the irtherm sensor stack
//!
//! This crate implements `irtherm_hal::I2cMaster` by toggling two GPIO
//! lines under software-timed delays. Any pair of `embedded-hal` 1.0 pins
//! works, as long as SDA is open-drain (readable while released).
//!
//! - [`SoftI2cMaster`] - bit-banged master
//! - [`SoftError`] - pin fault wrapper

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod soft;

pub use soft::{SoftError, SoftI2cMaster, I2C_DELAY_US};
