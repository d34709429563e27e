//! MLX90615 register map
//!
//! Command bytes are opaque to the protocol layer; the device decodes them.
//! RAM registers are read-only live values, EEPROM registers persist across
//! power cycles and must be erased (written with zero) before a new value
//! is written.

/// Factory SMBus address
pub const DEFAULT_ADDRESS: u8 = 0x5B;

/// Raw IR channel data (signed)
pub const RAW_IR: u8 = 0x25;
/// Ambient (die) temperature
pub const AMBIENT_TEMPERATURE: u8 = 0x26;
/// Object temperature
pub const OBJECT_TEMPERATURE: u8 = 0x27;

/// First EEPROM command
pub const EEPROM_START: u8 = 0x10;
/// Last EEPROM command
pub const EEPROM_END: u8 = 0x13;
/// Emissivity coefficient (EEPROM)
pub const EMISSIVITY: u8 = 0x13;

/// Enter sleep mode
pub const SLEEP: u8 = 0xC6;

/// Factory emissivity word (1.0)
pub const DEFAULT_EMISSIVITY: u16 = 0x4000;

/// Whether `command` addresses an EEPROM register
pub const fn is_eeprom(command: u8) -> bool {
    command >= EEPROM_START && command <= EEPROM_END
}
