//! TWI controller master
//!
//! Each bus operation writes the control register, polls for the interrupt
//! flag, then inspects the status code to learn what actually happened on
//! the bus. Polls are bounded by `I2cConfig::poll_limit` so a wedged
//! controller surfaces as [`TwiError::Timeout`] instead of hanging.

use irtherm_hal::i2c::{self, Direction, ErrorKind, I2cConfig, I2cMaster};
use irtherm_hal::TwiRegisters;

#[cfg(feature = "defmt")]
use defmt::{trace, warn};

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

/// Control register (TWCR) bits
pub mod control {
    /// Interrupt flag, write 1 to start the next operation
    pub const TWINT: u8 = 1 << 7;
    /// Enable acknowledge
    pub const TWEA: u8 = 1 << 6;
    /// Start condition
    pub const TWSTA: u8 = 1 << 5;
    /// Stop condition
    pub const TWSTO: u8 = 1 << 4;
    /// Write collision flag
    pub const TWWC: u8 = 1 << 3;
    /// Controller enable
    pub const TWEN: u8 = 1 << 2;
}

/// Master status codes (TWSR with prescaler bits masked off)
pub mod status {
    /// Start condition transmitted
    pub const START: u8 = 0x08;
    /// Repeated start condition transmitted
    pub const REP_START: u8 = 0x10;
    /// Address+W transmitted, ACK received
    pub const MTX_ADR_ACK: u8 = 0x18;
    /// Address+W transmitted, NACK received
    pub const MTX_ADR_NACK: u8 = 0x20;
    /// Data transmitted, ACK received
    pub const MTX_DATA_ACK: u8 = 0x28;
    /// Data transmitted, NACK received
    pub const MTX_DATA_NACK: u8 = 0x30;
    /// Arbitration lost
    pub const ARB_LOST: u8 = 0x38;
    /// Address+R transmitted, ACK received
    pub const MRX_ADR_ACK: u8 = 0x40;
    /// Address+R transmitted, NACK received
    pub const MRX_ADR_NACK: u8 = 0x48;
    /// Data received, ACK returned
    pub const MRX_DATA_ACK: u8 = 0x50;
    /// Data received, NACK returned
    pub const MRX_DATA_NACK: u8 = 0x58;

    /// Mask that strips the prescaler bits from TWSR
    pub const MASK: u8 = 0xF8;
}

use control::{TWEA, TWEN, TWINT, TWSTA, TWSTO};

/// Error from the TWI transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TwiError {
    /// The controller did not signal completion within the poll budget
    Timeout,
}

impl i2c::Error for TwiError {
    fn kind(&self) -> ErrorKind {
        match self {
            TwiError::Timeout => ErrorKind::Timeout,
        }
    }
}

/// Bit-rate register value for prescaler 1
///
/// `TWBR = (f_cpu / f_scl - 16) / 2`, clamped to the register range.
pub fn bit_rate(cpu_hz: u32, scl_hz: u32) -> u8 {
    let divisor = cpu_hz / scl_hz.max(1);
    let twbr = divisor.saturating_sub(16) / 2;
    twbr.min(u8::MAX as u32) as u8
}

/// Hardware TWI master
pub struct TwiMaster<R> {
    regs: R,
    status: u8,
    poll_limit: u32,
}

impl<R: TwiRegisters> TwiMaster<R> {
    /// Program the clock divisor and take ownership of the controller
    ///
    /// # Arguments
    /// * `regs` - Register handle for the controller
    /// * `cpu_hz` - Controller clock in Hz
    /// * `config` - Bus frequency, pull-up and poll budget settings
    pub fn new(mut regs: R, cpu_hz: u32, config: I2cConfig) -> Self {
        let twbr = bit_rate(cpu_hz, config.frequency);
        if cpu_hz / config.frequency.max(1) < 16 {
            warn!(
                "twi: {=u32} Hz bus unreachable from {=u32} Hz clock",
                config.frequency,
                cpu_hz
            );
        }
        regs.configure_clock(0, twbr);
        if config.internal_pullups {
            regs.enable_pullups();
        }

        Self {
            regs,
            status: 0,
            poll_limit: config.poll_limit,
        }
    }

    /// Status from the last command, prescaler bits masked
    pub fn status(&self) -> u8 {
        self.status
    }

    /// Give back the register handle
    pub fn release(self) -> R {
        self.regs
    }

    fn exec(&mut self, command: u8) -> Result<(), TwiError> {
        self.regs.write_control(command);
        for _ in 0..self.poll_limit {
            if self.regs.read_control() & TWINT != 0 {
                self.status = self.regs.read_status() & status::MASK;
                return Ok(());
            }
        }
        warn!("twi: command {=u8:#x} timed out", command);
        Err(TwiError::Timeout)
    }
}

impl<R: TwiRegisters> I2cMaster for TwiMaster<R> {
    type Error = TwiError;

    fn start(&mut self, address_rw: u8) -> Result<bool, TwiError> {
        self.exec(TWINT | TWSTA | TWEN)?;
        if self.status != status::START && self.status != status::REP_START {
            trace!("twi: start rejected, status {=u8:#x}", self.status);
            return Ok(false);
        }

        self.regs.write_data(address_rw);
        self.exec(TWINT | TWEN)?;
        let expected = match Direction::of(address_rw) {
            Direction::Read => status::MRX_ADR_ACK,
            Direction::Write => status::MTX_ADR_ACK,
        };
        trace!("twi: address {=u8:#x}, status {=u8:#x}", address_rw, self.status);
        Ok(self.status == expected)
    }

    fn restart(&mut self, address_rw: u8) -> Result<bool, TwiError> {
        // The controller emits a repeated start when the bus is still held
        self.start(address_rw)
    }

    fn write(&mut self, byte: u8) -> Result<bool, TwiError> {
        self.regs.write_data(byte);
        self.exec(TWINT | TWEN)?;
        Ok(self.status == status::MTX_DATA_ACK)
    }

    fn read(&mut self, last: bool) -> Result<u8, TwiError> {
        let ack = if last { 0 } else { TWEA };
        self.exec(TWINT | TWEN | ack)?;
        Ok(self.regs.read_data())
    }

    fn stop(&mut self) -> Result<(), TwiError> {
        self.regs.write_control(TWINT | TWEN | TWSTO);

        // TWSTO clears once the stop condition is on the bus
        for _ in 0..self.poll_limit {
            if self.regs.read_control() & TWSTO == 0 {
                return Ok(());
            }
        }
        warn!("twi: stop timed out");
        Err(TwiError::Timeout)
    }
}
