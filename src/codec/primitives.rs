//! # Primitive Field Codec
//!
//! Little-endian fixed-width field readers and writers over a moving cursor.

use bytes::{Buf, BufMut};

use crate::error::{CodecError, Result};

/// Cursor over an uplink payload
///
/// Every read advances the cursor by the width of the field. A read past
/// the end is reported as [`CodecError::InvalidMessageLength`].
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    len: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the first byte
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            buf: bytes,
            len: bytes.len(),
        }
    }

    /// Create a reader positioned at `offset`
    pub fn at(bytes: &'a [u8], offset: usize) -> Self {
        let mut reader = Self::new(bytes);
        reader.buf = &bytes[offset.min(bytes.len())..];
        reader
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.len - self.buf.remaining()
    }

    /// Bytes left after the cursor
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, width: usize) -> Result<()> {
        if self.buf.remaining() < width {
            return Err(CodecError::InvalidMessageLength {
                message: "field",
                expected: self.position() + width,
                actual: self.len,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1)?;
        Ok(self.buf.get_i8())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.buf.get_u16_le())
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2)?;
        Ok(self.buf.get_i16_le())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32_le())
    }

    /// Read an IEEE-754 binary32 value
    ///
    /// Exponent 0xFF yields NaN or a signed infinity, exponent 0 a
    /// subnormal, anything else a normalized value.
    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(f32::from_bits(self.buf.get_u32_le()))
    }

    /// Read `N` raw bytes in storage order
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }
}

/// Append-only writer for downlink payloads
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_i16_le(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    /// Bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_unsigned_little_endian() {
        let bytes = [0x7F, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_u8().unwrap(), 0x7F);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(reader.position(), 7);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_u32_full_range() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF];
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_u32().unwrap(), u32::MAX);
    }

    #[test]
    fn test_read_i8_sign_extension() {
        let bytes = [0x80, 0x7F, 0xFF];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_i8().unwrap() as i32, -128);
        assert_eq!(reader.read_i8().unwrap(), 127);
        assert_eq!(reader.read_i8().unwrap(), -1);
    }

    #[test]
    fn test_read_i16_sign_extension() {
        let bytes = [0x00, 0x80, 0xFF, 0x7F, 0xD0, 0x8A];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_i16().unwrap(), -32768);
        assert_eq!(reader.read_i16().unwrap(), 32767);
        assert_eq!(reader.read_i16().unwrap(), -30000);
    }

    #[test]
    fn test_read_i32_negative() {
        let bytes = [0xFE, 0xFF, 0xFF, 0xFF];
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_i32().unwrap(), -2);
    }

    #[test]
    fn test_read_f32_normal() {
        // 1.5 = 0x3FC00000
        let bytes = [0x00, 0x00, 0xC0, 0x3F, 0x00, 0x00, 0x20, 0xC1];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_f32().unwrap(), 1.5);
        assert_eq!(reader.read_f32().unwrap(), -10.0);
    }

    #[test]
    fn test_read_f32_special_values() {
        let bytes = [
            0x00, 0x00, 0x80, 0x7F, // +inf
            0x00, 0x00, 0x80, 0xFF, // -inf
            0x01, 0x00, 0xC0, 0x7F, // NaN
            0x01, 0x00, 0x00, 0x00, // smallest subnormal
        ];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_f32().unwrap(), f32::INFINITY);
        assert_eq!(reader.read_f32().unwrap(), f32::NEG_INFINITY);
        assert!(reader.read_f32().unwrap().is_nan());

        let subnormal = reader.read_f32().unwrap();
        assert_eq!(subnormal as f64, 2f64.powi(-149));
    }

    #[test]
    fn test_reader_at_offset() {
        let bytes = [0x20, 0x04, 0x01];
        let mut reader = ByteReader::at(&bytes, 1);

        assert_eq!(reader.position(), 1);
        assert_eq!(reader.read_u8().unwrap(), 0x04);
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_read_array_keeps_storage_order() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_array::<8>().unwrap(), [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn test_read_past_end() {
        let bytes = [0x01];
        let mut reader = ByteReader::new(&bytes);

        let result = reader.read_u16();
        assert!(matches!(
            result,
            Err(CodecError::InvalidMessageLength { expected: 2, actual: 1, .. })
        ));
        // Failed read does not move the cursor
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_write_little_endian() {
        let mut writer = ByteWriter::new();
        writer.write_u8(0xAB);
        writer.write_u16(0x1234);
        writer.write_u32(0x1234_5678);

        assert_eq!(
            writer.as_slice(),
            &[0xAB, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12]
        );
    }

    #[test]
    fn test_write_signed_twos_complement() {
        let mut writer = ByteWriter::new();
        writer.write_i8(-1);
        writer.write_i16(-250);
        writer.write_i32(-2);

        assert_eq!(
            writer.into_vec(),
            vec![0xFF, 0x06, 0xFF, 0xFE, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_write_then_read_symmetry() {
        let mut writer = ByteWriter::with_capacity(9);
        writer.write_i16(-30000);
        writer.write_u16(10080);
        writer.write_i8(-40);
        writer.write_i32(i32::MIN);
        assert_eq!(writer.len(), 9);

        let bytes = writer.into_vec();
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_i16().unwrap(), -30000);
        assert_eq!(reader.read_u16().unwrap(), 10080);
        assert_eq!(reader.read_i8().unwrap(), -40);
        assert_eq!(reader.read_i32().unwrap(), i32::MIN);
    }
}
