//! Driver error types

use irtherm_core::traits::SensorError;
use irtherm_hal::i2c::{self, ErrorKind};

/// Byte of a transaction that was not acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// Device address in write direction
    Address,
    /// Command (register selector)
    Command,
    /// Low data byte
    DataLow,
    /// High data byte
    DataHigh,
    /// Packet error code
    Pec,
    /// Device address in read direction after the repeated start
    ReadAddress,
}

/// Errors from a sensor transaction
///
/// Every variant is reported by the call that detected it. Nothing is
/// retried; retry policy belongs to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A byte was not acknowledged
    Nack(Stage),
    /// A constructed frame failed its own PEC check before transmission
    ChecksumMismatch,
    /// No bus transport is bound to the driver
    TransportUnconfigured,
    /// Command is outside the EEPROM range
    InvalidEeprom(u8),
    /// Value cannot be encoded into its register
    InvalidValue,
    /// The transport gave up waiting for hardware
    Timeout,
    /// Any other transport fault
    Transport(E),
}

impl<E: i2c::Error> Error<E> {
    /// Wrap a transport error, lifting timeouts into [`Error::Timeout`]
    pub fn from_transport(error: E) -> Self {
        match error.kind() {
            ErrorKind::Timeout => Error::Timeout,
            _ => Error::Transport(error),
        }
    }
}

impl<E> Error<E> {
    /// Legacy integer status code
    ///
    /// Success is 0 and is never produced here. Transport faults share one
    /// code since the legacy interface had no way to express them.
    pub const fn status_code(&self) -> i8 {
        match self {
            Error::ChecksumMismatch => -1,
            Error::Nack(Stage::Command) => -2,
            Error::Nack(Stage::DataLow) => -3,
            Error::Nack(Stage::DataHigh) => -4,
            Error::Nack(Stage::Pec) => -5,
            Error::TransportUnconfigured => -6,
            Error::Nack(Stage::Address) => -7,
            Error::Nack(Stage::ReadAddress) => -8,
            Error::Timeout | Error::Transport(_) => -9,
            Error::InvalidEeprom(_) => -10,
            Error::InvalidValue => -11,
        }
    }

    /// Whether the device failed to acknowledge
    pub const fn is_nack(&self) -> bool {
        matches!(self, Error::Nack(_))
    }
}

impl<E> From<Error<E>> for SensorError {
    fn from(error: Error<E>) -> Self {
        match error {
            Error::Nack(_) => SensorError::NoResponse,
            Error::ChecksumMismatch => SensorError::Checksum,
            Error::TransportUnconfigured => SensorError::Unconfigured,
            Error::InvalidEeprom(_) | Error::InvalidValue => SensorError::OutOfRange,
            Error::Timeout => SensorError::Timeout,
            Error::Transport(_) => SensorError::Bus,
        }
    }
}
