//! irtherm Hardware Abstraction Layer
//!
//! This crate defines the bus-level traits shared by every transport in the
//! workspace. Sensor drivers depend only on [`i2c::I2cMaster`], never on a
//! concrete transport, so the same driver runs over a bit-banged bus or a
//! hardware TWI peripheral.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Sensor drivers (irtherm-drivers)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  irtherm-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ irtherm-hal-  │       │ irtherm-hal-  │
//! │     soft      │       │      twi      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cMaster`] - Byte-level I2C master (start/restart/stop/read/write)
//! - [`i2c::Error`] - Transport error classification
//! - [`twi::TwiRegisters`] - Owned handle to a TWI peripheral's registers

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod twi;

// Re-export key traits at crate root for convenience
pub use i2c::{address_rw, Direction, ErrorKind, I2cConfig, I2cMaster, I2C_READ, I2C_WRITE};
pub use twi::TwiRegisters;
