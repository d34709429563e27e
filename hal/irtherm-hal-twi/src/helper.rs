//! Helper-library I2C master
//!
//! Some targets only expose I2C through a vendor HAL that performs whole
//! transactions. [`HalI2cMaster`] maps the byte-level contract onto any
//! `embedded_hal::i2c::I2c` implementation:
//!
//! - `start`/`restart` latch the address and always report ACK; nothing
//!   is sent yet, so a missing device only shows up when data moves
//! - `write` queues the byte and always reports ACK; the queue goes out as
//!   one write transaction at `stop` (or at a restart in write direction)
//! - the first `read` after a queued write uses a combined write-read, later
//!   reads are single-byte read transactions
//!
//! Losing the acknowledge of individual bytes, and the repeated start
//! between consecutive reads, is the accepted limitation of this variant.
//!
//! A multi-byte register read is therefore split: only the first byte comes
//! from the combined write-read, the rest from plain reads that carry no
//! command pointer. SMBus devices such as the MLX90615 restart their reply
//! on a plain read, so the high byte and PEC of a word read this way are not
//! reliable on real hardware. Use it for register writes and single-byte
//! reads, or prefer the register-driven or bit-banged master.

use embedded_hal::i2c::{self as hal_i2c, I2c};
use heapless::Vec;
use irtherm_hal::i2c::{self, Direction, ErrorKind, I2cMaster};

#[cfg(feature = "defmt")]
use defmt::trace;

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($($arg:tt)*) => {{}};
}

/// Bytes queued between an address and the flush
pub const PENDING_CAPACITY: usize = 8;

/// Error from the helper-library transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HelperError<E> {
    /// The underlying I2C implementation failed
    Bus(E),
}

impl<E: hal_i2c::Error> i2c::Error for HelperError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            HelperError::Bus(e) => match e.kind() {
                hal_i2c::ErrorKind::Other => ErrorKind::Other,
                _ => ErrorKind::Bus,
            },
        }
    }
}

/// Byte-level master on top of an `embedded-hal` I2C bus
///
/// Word reads are split across helper transactions and only the low byte
/// is guaranteed to come from the requested register; see the module docs.
pub struct HalI2cMaster<I2C> {
    bus: I2C,
    address: u8,
    direction: Direction,
    pending: Vec<u8, PENDING_CAPACITY>,
}

impl<I2C: I2c> HalI2cMaster<I2C> {
    /// Wrap an `embedded-hal` bus
    pub fn new(bus: I2C) -> Self {
        Self {
            bus,
            address: 0,
            direction: Direction::Write,
            pending: Vec::new(),
        }
    }

    /// Give back the wrapped bus
    pub fn release(self) -> I2C {
        self.bus
    }

    fn flush(&mut self) -> Result<(), HelperError<I2C::Error>> {
        if self.pending.is_empty() {
            return Ok(());
        }
        trace!("helper i2c: flush {=usize} bytes", self.pending.len());
        let result = self.bus.write(self.address, &self.pending);
        self.pending.clear();
        result.map_err(HelperError::Bus)
    }

    fn latch(&mut self, address_rw: u8) -> Result<bool, HelperError<I2C::Error>> {
        let direction = Direction::of(address_rw);
        // A queued register pointer is consumed by the first read
        if direction == Direction::Write || self.pending.is_empty() {
            self.flush()?;
        }
        self.address = address_rw >> 1;
        self.direction = direction;
        Ok(true)
    }
}

impl<I2C: I2c> I2cMaster for HalI2cMaster<I2C> {
    type Error = HelperError<I2C::Error>;

    fn start(&mut self, address_rw: u8) -> Result<bool, Self::Error> {
        self.latch(address_rw)
    }

    fn restart(&mut self, address_rw: u8) -> Result<bool, Self::Error> {
        self.latch(address_rw)
    }

    fn write(&mut self, byte: u8) -> Result<bool, Self::Error> {
        if self.pending.is_full() {
            self.flush()?;
        }
        // Cannot fail after the flush above
        let _ = self.pending.push(byte);
        Ok(true)
    }

    fn read(&mut self, _last: bool) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        let result = if self.pending.is_empty() {
            self.bus.read(self.address, &mut buf)
        } else {
            let result = self.bus.write_read(self.address, &self.pending, &mut buf);
            self.pending.clear();
            result
        };
        result.map_err(HelperError::Bus)?;
        Ok(buf[0])
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.flush()
    }
}
