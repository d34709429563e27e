//! Register transaction frames
//!
//! Frame format (write):
//! - DEVICE (1 byte): 7-bit address << 1, write bit clear
//! - COMMAND (1 byte): register selector (RAM/EEPROM address or opcode)
//! - DATA LOW (1 byte): value bits 0-7
//! - DATA HIGH (1 byte): value bits 8-15
//! - PEC (1 byte): CRC8 of the four bytes above
//!
//! A frame is valid if and only if the CRC8 over all five bytes is zero.

use crate::crc::pec;

/// Length of a register write frame
pub const FRAME_LEN: usize = 5;

/// Write bit for the address byte
const WRITE: u8 = 0;

/// Read bit for the address byte
const READ: u8 = 1;

/// Five-byte register write frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterFrame {
    bytes: [u8; FRAME_LEN],
}

impl Default for RegisterFrame {
    fn default() -> Self {
        Self {
            bytes: [0; FRAME_LEN],
        }
    }
}

impl RegisterFrame {
    /// Build a frame for writing `value` to `command` on a 7-bit `address`
    pub fn build(address: u8, command: u8, value: u16) -> Self {
        let mut frame = Self::default();
        frame.fill(address, command, value);
        frame
    }

    /// Rebuild this frame in place
    ///
    /// Lets a driver reuse a single buffer for every write.
    pub fn fill(&mut self, address: u8, command: u8, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.bytes[0] = (address << 1) | WRITE;
        self.bytes[1] = command;
        self.bytes[2] = low;
        self.bytes[3] = high;
        self.bytes[4] = pec(&self.bytes[..4]);
    }

    /// Wrap raw bytes without checking them
    pub const fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Check the PEC over the whole frame
    pub fn verify(&self) -> bool {
        pec(&self.bytes) == 0
    }

    /// Raw frame bytes
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// Device byte (shifted address, write bit clear)
    pub fn device(&self) -> u8 {
        self.bytes[0]
    }

    /// Command byte
    pub fn command(&self) -> u8 {
        self.bytes[1]
    }

    /// Low data byte
    pub fn low(&self) -> u8 {
        self.bytes[2]
    }

    /// High data byte
    pub fn high(&self) -> u8 {
        self.bytes[3]
    }

    /// Register value carried by the frame
    pub fn value(&self) -> u16 {
        u16::from_le_bytes([self.bytes[2], self.bytes[3]])
    }

    /// Packet error code byte
    pub fn pec(&self) -> u8 {
        self.bytes[4]
    }
}

/// PEC a device appends to a word read
///
/// Covers every byte on the bus for the transaction: address+W, command,
/// address+R, then the two data bytes.
pub fn read_pec(address: u8, command: u8, low: u8, high: u8) -> u8 {
    pec(&[
        (address << 1) | WRITE,
        command,
        (address << 1) | READ,
        low,
        high,
    ])
}

/// PEC for a bare command byte (e.g. the sleep opcode)
pub fn command_pec(address: u8, command: u8) -> u8 {
    pec(&[(address << 1) | WRITE, command])
}
