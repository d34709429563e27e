//! MLX90615 register protocol
//!
//! This crate defines the byte-level framing used to talk to the sensor's
//! RAM and EEPROM registers over SMBus, and the CRC8 packet error code that
//! protects it.
//!
//! # Write frame
//!
//! Every register write is a fixed five-byte frame:
//! ```text
//! ┌────────┬─────────┬──────────┬───────────┬─────┐
//! │ DEVICE │ COMMAND │ DATA LOW │ DATA HIGH │ PEC │
//! │ 1B     │ 1B      │ 1B       │ 1B        │ 1B  │
//! └────────┴─────────┴──────────┴───────────┴─────┘
//! ```
//!
//! `DEVICE` is the 7-bit address shifted left with the write bit clear.
//! `PEC` is the CRC8 (polynomial `0x07`, MSB first, zero seed) of the four
//! bytes before it, so CRC8 over the whole frame is zero.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod crc;
pub mod frame;
pub mod reg;

pub use crc::{crc8, pec, PEC_POLYNOMIAL};
pub use frame::{command_pec, read_pec, RegisterFrame, FRAME_LEN};
