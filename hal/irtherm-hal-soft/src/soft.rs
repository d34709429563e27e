//! Bit-banged I2C master
//!
//! Every bit follows the same edge order: change SDA while SCL is low, raise
//! SCL, hold for the half-period while the receiver samples, lower SCL.
//! Start and stop are the only places where SDA moves while SCL is high.
//! Do not reorder edges in this file without checking the result on a scope.

use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use irtherm_hal::i2c::{self, ErrorKind, I2cMaster};

#[cfg(feature = "defmt")]
use defmt::trace;

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($($arg:tt)*) => {{}};
}

/// Default half-period delay in microseconds (about 100 kHz)
pub const I2C_DELAY_US: u32 = 4;

/// Error from the software transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoftError<E> {
    /// A GPIO line could not be driven or read
    Pin(E),
}

impl<E: Debug> i2c::Error for SoftError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            SoftError::Pin(_) => ErrorKind::Pin,
        }
    }
}

/// Software I2C master
///
/// SDA must be an open-drain pin: `set_high` releases the line to the
/// pull-up and `is_high` reads the wired-AND level, which lets the slave
/// pull it low to acknowledge. SCL is driven by the master only.
pub struct SoftI2cMaster<SDA, SCL, D> {
    sda: SDA,
    scl: SCL,
    delay: D,
    delay_us: u32,
}

impl<SDA, SCL, D, E> SoftI2cMaster<SDA, SCL, D>
where
    SDA: InputPin<Error = E> + OutputPin<Error = E>,
    SCL: OutputPin<Error = E>,
    D: DelayNs,
    E: Debug,
{
    /// Take ownership of the lines and pull the bus idle-high
    pub fn new(sda: SDA, scl: SCL, delay: D) -> Result<Self, SoftError<E>> {
        let mut bus = Self {
            sda,
            scl,
            delay,
            delay_us: I2C_DELAY_US,
        };
        bus.sda_set(true)?;
        bus.scl_set(true)?;
        Ok(bus)
    }

    /// Use a different half-period delay
    pub fn with_delay_us(mut self, delay_us: u32) -> Self {
        self.delay_us = delay_us;
        self
    }

    /// Half-period delay in microseconds
    pub fn delay_us(&self) -> u32 {
        self.delay_us
    }

    /// Give back the pins and the delay provider
    pub fn release(self) -> (SDA, SCL, D) {
        (self.sda, self.scl, self.delay)
    }

    fn sda_set(&mut self, high: bool) -> Result<(), SoftError<E>> {
        if high {
            self.sda.set_high().map_err(SoftError::Pin)
        } else {
            self.sda.set_low().map_err(SoftError::Pin)
        }
    }

    fn scl_set(&mut self, high: bool) -> Result<(), SoftError<E>> {
        if high {
            self.scl.set_high().map_err(SoftError::Pin)
        } else {
            self.scl.set_low().map_err(SoftError::Pin)
        }
    }

    fn sda_is_high(&mut self) -> Result<bool, SoftError<E>> {
        self.sda.is_high().map_err(SoftError::Pin)
    }

    fn pause(&mut self) {
        self.delay.delay_us(self.delay_us);
    }
}

impl<SDA, SCL, D, E> I2cMaster for SoftI2cMaster<SDA, SCL, D>
where
    SDA: InputPin<Error = E> + OutputPin<Error = E>,
    SCL: OutputPin<Error = E>,
    D: DelayNs,
    E: Debug,
{
    type Error = SoftError<E>;

    fn start(&mut self, address_rw: u8) -> Result<bool, Self::Error> {
        trace!("soft i2c: start {=u8:#x}", address_rw);
        // SDA falls while SCL is high
        self.sda_set(false)?;
        self.pause();
        self.scl_set(false)?;
        self.write(address_rw)
    }

    fn restart(&mut self, address_rw: u8) -> Result<bool, Self::Error> {
        trace!("soft i2c: restart {=u8:#x}", address_rw);
        self.sda_set(true)?;
        self.scl_set(true)?;
        self.pause();
        self.start(address_rw)
    }

    fn write(&mut self, byte: u8) -> Result<bool, Self::Error> {
        let mut mask = 0x80u8;
        while mask != 0 {
            self.sda_set(byte & mask != 0)?;
            self.scl_set(true)?;
            self.pause();
            self.scl_set(false)?;
            mask >>= 1;
        }

        // Release SDA so the slave can pull it low on the ninth clock
        self.sda_set(true)?;
        self.scl_set(true)?;
        let nack = self.sda_is_high()?;
        self.scl_set(false)?;
        self.sda_set(false)?;

        trace!("soft i2c: wrote {=u8:#x}, ack={=bool}", byte, !nack);
        Ok(!nack)
    }

    fn read(&mut self, last: bool) -> Result<u8, Self::Error> {
        let mut byte = 0u8;
        self.sda_set(true)?;
        for _ in 0..8 {
            byte <<= 1;
            self.pause();
            self.scl_set(true)?;
            if self.sda_is_high()? {
                byte |= 1;
            }
            self.scl_set(false)?;
        }

        // High on the ninth clock is NACK and ends the read
        self.sda_set(last)?;
        self.scl_set(true)?;
        self.pause();
        self.scl_set(false)?;
        self.sda_set(false)?;

        trace!("soft i2c: read {=u8:#x}, last={=bool}", byte, last);
        Ok(byte)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        trace!("soft i2c: stop");
        self.sda_set(false)?;
        self.pause();
        self.scl_set(true)?;
        self.pause();
        // SDA rises while SCL is high
        self.sda_set(true)?;
        self.pause();
        Ok(())
    }
}
