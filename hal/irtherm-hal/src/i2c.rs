//! I2C bus abstractions
//!
//! Provides the byte-level master contract that both the software and the
//! register-driven transports implement.

use core::convert::Infallible;
use core::fmt::Debug;

/// Bit to OR with a shifted address for a read start or restart
pub const I2C_READ: u8 = 1;

/// Bit to OR with a shifted address for a write start or restart
pub const I2C_WRITE: u8 = 0;

/// Transfer direction encoded in the low bit of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master receives from the addressed device
    Read,
    /// Master transmits to the addressed device
    Write,
}

impl Direction {
    /// R/W bit for this direction
    pub const fn bit(self) -> u8 {
        match self {
            Direction::Read => I2C_READ,
            Direction::Write => I2C_WRITE,
        }
    }

    /// Direction encoded in an address+R/W byte
    pub const fn of(address_rw: u8) -> Self {
        if address_rw & I2C_READ != 0 {
            Direction::Read
        } else {
            Direction::Write
        }
    }
}

/// Form the 8-bit address byte from a 7-bit address and a direction
///
/// The direction is never implied; every call site names it.
pub const fn address_rw(address: u8, direction: Direction) -> u8 {
    (address << 1) | direction.bit()
}

/// Classification of a transport fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Hardware did not signal completion within the poll budget
    Timeout,
    /// A GPIO line could not be driven or sampled
    Pin,
    /// The bus or helper library reported a failure
    Bus,
    /// Anything else
    Other,
}

/// Transport error
///
/// Acknowledge outcomes are not errors; they travel in the `bool` results of
/// [`I2cMaster`]. This trait covers faults the bus protocol cannot express.
pub trait Error: Debug {
    /// Classify this error
    fn kind(&self) -> ErrorKind;
}

impl Error for Infallible {
    fn kind(&self) -> ErrorKind {
        match *self {}
    }
}

/// Byte-level I2C master
///
/// A transaction is one `start` (or `restart`), one or more `write`/`read`
/// calls, and exactly one terminating `stop`, or a `restart` in place of the
/// stop to chain a second phase. All operations block until their electrical
/// phase completes. No operation retries on its own.
///
/// Implementations carry no internal synchronization: exactly one execution
/// context owns an instance at a time, which `&mut self` enforces.
pub trait I2cMaster {
    /// Error type for transport faults
    type Error: Error;

    /// Issue a start condition and clock out `address_rw`
    ///
    /// Returns `true` if the addressed device acknowledged.
    fn start(&mut self, address_rw: u8) -> Result<bool, Self::Error>;

    /// Issue a repeated start without a preceding stop
    ///
    /// Used to switch direction mid-transaction. Returns `true` on acknowledge.
    fn restart(&mut self, address_rw: u8) -> Result<bool, Self::Error>;

    /// Clock out one byte MSB-first and sample the acknowledge bit
    ///
    /// Returns `true` for ACK, `false` for NACK.
    fn write(&mut self, byte: u8) -> Result<bool, Self::Error>;

    /// Clock in one byte MSB-first
    ///
    /// Sends ACK when `last` is false, NACK when `last` is true to end the read.
    fn read(&mut self, last: bool) -> Result<u8, Self::Error>;

    /// Release the bus to idle (both lines high)
    fn stop(&mut self) -> Result<(), Self::Error>;
}

impl<T: I2cMaster + ?Sized> I2cMaster for &mut T {
    type Error = T::Error;

    fn start(&mut self, address_rw: u8) -> Result<bool, Self::Error> {
        T::start(self, address_rw)
    }

    fn restart(&mut self, address_rw: u8) -> Result<bool, Self::Error> {
        T::restart(self, address_rw)
    }

    fn write(&mut self, byte: u8) -> Result<bool, Self::Error> {
        T::write(self, byte)
    }

    fn read(&mut self, last: bool) -> Result<u8, Self::Error> {
        T::read(self, last)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        T::stop(self)
    }
}

/// Default completion-poll budget for register-driven transports
pub const DEFAULT_POLL_LIMIT: u32 = 100_000;

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Enable the controller's internal pull-up resistors
    pub internal_pullups: bool,
    /// Maximum completion-flag polls before reporting a timeout
    pub poll_limit: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::FAST
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        frequency: 100_000,
        internal_pullups: false,
        poll_limit: DEFAULT_POLL_LIMIT,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        frequency: 400_000,
        internal_pullups: false,
        poll_limit: DEFAULT_POLL_LIMIT,
    };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self {
        frequency: 1_000_000,
        internal_pullups: false,
        poll_limit: DEFAULT_POLL_LIMIT,
    };

    /// Same config with internal pull-ups enabled or disabled
    pub const fn with_pullups(mut self, enabled: bool) -> Self {
        self.internal_pullups = enabled;
        self
    }

    /// Same config with a different poll budget
    pub const fn with_poll_limit(mut self, poll_limit: u32) -> Self {
        self.poll_limit = poll_limit;
        self
    }
}
