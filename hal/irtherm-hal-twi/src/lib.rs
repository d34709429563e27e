//! Register-driven I2C masters for the irtherm sensor stack
//!
//! This crate provides two hardware-backed implementations of
//! `irtherm_hal::I2cMaster`:
//!
//! - [`TwiMaster`] - drives an ATmega-style TWI controller through an owned
//!   [`irtherm_hal::TwiRegisters`] handle, checking the status code after
//!   every command
//! - [`HalI2cMaster`] - adapts any `embedded_hal::i2c::I2c` implementation,
//!   for targets where the vendor HAL hides the controller registers
//!
//! # Features
//!
//! - `defmt` - Enable debug formatting support

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod helper;
pub mod twi;

pub use helper::{HalI2cMaster, HelperError};
pub use twi::{bit_rate, TwiError, TwiMaster};
