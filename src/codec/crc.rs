//! # CRC-16 Implementation
//!
//! Checksum appended to downlink configuration frames.
//!
//! The table is the reflected CRC-32 table (**Polynomial**: 0xEDB88320),
//! the register starts at all ones and the result is the low 16 bits of
//! the final register, without the closing XOR of a regular CRC-32.

/// Reflected CRC-32 polynomial
const CRC_POLY: u32 = 0xEDB8_8320;

/// Initial register value
const CRC_INIT: u32 = 0xFFFF_FFFF;

/// Precomputed lookup table, shared read-only by every caller
const CRC_TABLE: [u32; 256] = generate_crc_table();

/// Generate the lookup table at compile time
const fn generate_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;

        while j < 8 {
            if (crc & 1) != 0 {
                crc = (crc >> 1) ^ CRC_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the configuration frame checksum using the lookup table
///
/// # Arguments
///
/// * `data` - Bytes following the header byte
///
/// # Returns
///
/// * `u16` - Checksum, written low byte first after the body
///
/// # Examples
///
/// ```
/// use tt_codec::codec::crc::crc16;
///
/// assert_eq!(crc16(b"123456789"), 0xC6D9);
/// assert_eq!(crc16(&[]), 0xFFFF);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = CRC_INIT;

    for &byte in data {
        crc = (crc >> 8) ^ CRC_TABLE[((crc ^ byte as u32) & 0xFF) as usize];
    }

    (crc & 0xFFFF) as u16
}
