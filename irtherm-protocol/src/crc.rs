//! CRC8 packet error code
//!
//! Bit-at-a-time CRC8, MSB first, zero initial value, no final XOR.
//! With polynomial `0x07` (x^8 + x^2 + x + 1) this is the SMBus PEC.

/// SMBus PEC polynomial (x^8 + x^2 + x + 1)
pub const PEC_POLYNOMIAL: u8 = 0x07;

/// CRC8 of `data` with the given polynomial
pub fn crc8(polynomial: u8, data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ polynomial;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// SMBus packet error code of `data`
pub fn pec(data: &[u8]) -> u8 {
    crc8(PEC_POLYNOMIAL, data)
}
