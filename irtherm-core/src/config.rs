//! Sensor configuration
//!
//! Settings a board applies when it binds a sensor driver. With the `serde`
//! feature the configuration can be persisted as a postcard blob with a
//! magic/version header.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Factory SMBus address of the sensor
pub const DEFAULT_ADDRESS: u8 = 0x5B;

/// Magic number to identify a stored configuration
pub const CONFIG_MAGIC: u32 = 0x4952_5448; // "IRTH"

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Largest encoded configuration
pub const MAX_CONFIG_SIZE: usize = 16;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Address does not fit in 7 bits or is reserved
    InvalidAddress(u8),
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Magic or version mismatch
    InvalidFormat,
}

/// Per-sensor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    /// 7-bit bus address
    pub address: u8,
    /// Append a packet error code to register writes
    pub pec: bool,
    /// Check each outgoing frame's PEC before it is sent
    pub verify_frames: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorConfig {
    /// Factory defaults
    pub const fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            pec: true,
            verify_frames: true,
        }
    }

    /// Use a different bus address
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Enable or disable the write PEC byte
    pub const fn with_pec(mut self, pec: bool) -> Self {
        self.pec = pec;
        self
    }

    /// Enable or disable outgoing frame verification
    pub const fn with_verify_frames(mut self, verify: bool) -> Self {
        self.verify_frames = verify;
        self
    }

    /// Check the address is a usable 7-bit address
    ///
    /// `0x00` is the general call address and is rejected.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.address == 0 || self.address > 0x7F {
            return Err(ConfigError::InvalidAddress(self.address));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct StoredConfig {
    magic: u32,
    version: u8,
    config: SensorConfig,
}

#[cfg(feature = "serde")]
impl SensorConfig {
    /// Encode into `buf`, returning the used prefix
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        self.validate()?;
        let stored = StoredConfig {
            magic: CONFIG_MAGIC,
            version: CONFIG_VERSION,
            config: *self,
        };
        postcard::to_slice(&stored, buf).map_err(|_| ConfigError::Serialize)
    }

    /// Decode a blob written by [`SensorConfig::to_slice`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let stored: StoredConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        if stored.magic != CONFIG_MAGIC || stored.version != CONFIG_VERSION {
            return Err(ConfigError::InvalidFormat);
        }
        stored.config.validate()?;
        Ok(stored.config)
    }
}
