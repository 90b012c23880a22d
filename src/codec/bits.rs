//! Arbitrary-width bit fields, most significant bit first.
//!
//! Binary headers often pack integers into fields that are not a whole
//! number of bytes. [`BitBuffer`] reads such fields from a byte buffer and
//! [`BitWriter`] produces them. Within each byte the most significant bit
//! comes first.

use bytes::Bytes;

use crate::error::CodecError;

/// Initial capacity of a [`BitWriter`] in bytes.
const DEFAULT_WRITER_CAPACITY: usize = 10;

/// Widest field read or written in one call.
const MAX_FIELD_BITS: u32 = 32;

// =============================================================================
// BitBuffer
// =============================================================================

/// Reads bit fields from a byte buffer.
#[derive(Debug, Clone)]
pub struct BitBuffer {
    data: Bytes,
    /// Absolute bit position of the cursor
    position: usize,
}

impl BitBuffer {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
        }
    }

    /// Read the next `bits` bits (0 to 32) as an unsigned integer.
    ///
    /// A read that runs past the end returns the bits that were left,
    /// right-aligned, and leaves the cursor at the end. `None` signals end of
    /// stream: it is returned once every bit has been consumed and another
    /// read is attempted. Reading 0 bits always yields `Some(0)` and does not
    /// move the cursor. More than 32 bits is rejected with `None` without
    /// moving the cursor.
    pub fn get_bits(&mut self, bits: u32) -> Option<u32> {
        if bits == 0 {
            return Some(0);
        }
        if bits > MAX_FIELD_BITS || self.is_eof() {
            return None;
        }

        let mut value: u64 = 0;
        let mut left = (bits as usize).min(self.remaining_bits());
        while left > 0 {
            let byte = self.data[self.position / 8];
            let available = 8 - self.position % 8;
            let take = available.min(left);
            let chunk = (byte >> (available - take)) & (0xFFu8 >> (8 - take));
            value = (value << take) | u64::from(chunk);
            self.position += take;
            left -= take;
        }
        Some(value as u32)
    }

    /// Advance the cursor by `bits`, stopping at the end of the buffer.
    pub fn skip_bits(&mut self, bits: usize) {
        self.position = self.position.saturating_add(bits).min(self.data.len() * 8);
    }

    /// Number of unread bits.
    pub fn remaining_bits(&self) -> usize {
        self.data.len() * 8 - self.position
    }

    /// Current cursor position in bits.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether every bit has been consumed.
    pub fn is_eof(&self) -> bool {
        self.remaining_bits() == 0
    }
}

// =============================================================================
// BitWriter
// =============================================================================

/// Appends bit fields to a growable buffer.
#[derive(Debug, Clone)]
pub struct BitWriter {
    buf: Vec<u8>,
    /// Index of the byte being filled
    byte: usize,
    /// Next bit within that byte, 0 being the most significant
    bit: u32,
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_WRITER_CAPACITY)
    }
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer whose buffer starts at `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity.max(1)],
            byte: 0,
            bit: 0,
        }
    }

    /// Append the low `bits` bits of `value` (0 to 32), most significant first.
    ///
    /// More than 32 bits is rejected without writing anything.
    pub fn write(&mut self, value: u32, bits: u32) -> Result<(), CodecError> {
        if bits > MAX_FIELD_BITS {
            return Err(CodecError::FieldWidth(bits));
        }
        for i in (0..bits).rev() {
            self.push_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    fn push_bit(&mut self, set: bool) {
        if self.byte >= self.buf.len() {
            let doubled = self.buf.len() * 2;
            self.buf.resize(doubled, 0);
        }
        if set {
            self.buf[self.byte] |= 0x80 >> self.bit;
        }
        self.bit += 1;
        if self.bit == 8 {
            self.bit = 0;
            self.byte += 1;
        }
    }

    /// Append a field given as a string of `'0'` and `'1'` characters.
    ///
    /// Any other character is ignored.
    pub fn write_bit_string(&mut self, bits: &str) {
        for ch in bits.chars() {
            match ch {
                '0' => self.push_bit(false),
                '1' => self.push_bit(true),
                _ => {}
            }
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.byte * 8 + self.bit as usize
    }

    /// The bytes touched so far, including a partial final byte whose
    /// unwritten low bits are zero.
    pub fn to_byte_array(&self) -> Vec<u8> {
        let len = self.byte + usize::from(self.bit > 0);
        self.buf[..len].to_vec()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut writer = BitWriter::new();
        writer.write(5, 3).unwrap();
        writer.write(200, 8).unwrap();
        writer.write(1, 1).unwrap();

        let bytes = writer.to_byte_array();
        // 101 11001000 1 -> 10111001 0001....
        assert_eq!(bytes, vec![0b1011_1001, 0b0001_0000]);

        let mut reader = BitBuffer::new(bytes);
        assert_eq!(reader.get_bits(3), Some(5));
        assert_eq!(reader.get_bits(8), Some(200));
        assert_eq!(reader.get_bits(1), Some(1));
    }

    #[test]
    fn test_round_trip_mixed_widths() {
        let fields: [(u32, u32); 7] = [
            (0, 1),
            (0xDEADBEEF, 32),
            (3, 2),
            (0x1FFF, 13),
            (0, 7),
            (0xFFFF_FFFF, 32),
            (42, 6),
        ];
        let mut writer = BitWriter::with_capacity(1);
        for (value, bits) in fields {
            writer.write(value, bits).unwrap();
        }
        assert_eq!(writer.bit_len(), 93);

        let mut reader = BitBuffer::new(writer.to_byte_array());
        for (value, bits) in fields {
            assert_eq!(reader.get_bits(bits), Some(value));
        }
    }

    #[test]
    fn test_zero_bits() {
        let mut reader = BitBuffer::new(vec![0xFF]);
        assert_eq!(reader.get_bits(0), Some(0));
        assert_eq!(reader.position(), 0);

        let mut empty = BitBuffer::new(Vec::new());
        assert_eq!(empty.get_bits(0), Some(0));
    }

    #[test]
    fn test_end_of_stream() {
        let mut reader = BitBuffer::new(vec![0b1010_0000]);
        assert_eq!(reader.get_bits(4), Some(0b1010));
        assert_eq!(reader.get_bits(4), Some(0));
        assert!(reader.is_eof());
        assert_eq!(reader.get_bits(1), None);
        assert_eq!(reader.get_bits(0), Some(0));
    }

    #[test]
    fn test_read_past_end_returns_remaining_bits() {
        let mut reader = BitBuffer::new(vec![0xAB]);
        assert_eq!(reader.get_bits(4), Some(0xA));
        assert_eq!(reader.get_bits(8), Some(0xB));
        assert!(reader.is_eof());
        assert_eq!(reader.get_bits(8), None);

        let mut reader = BitBuffer::new(vec![0x12, 0x34]);
        assert_eq!(reader.get_bits(32), Some(0x1234));
        assert_eq!(reader.get_bits(1), None);

        assert_eq!(BitBuffer::new(Vec::new()).get_bits(1), None);
    }

    #[test]
    fn test_too_many_bits() {
        let mut reader = BitBuffer::new(vec![0; 8]);
        assert_eq!(reader.get_bits(33), None);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_skip_bits() {
        let mut reader = BitBuffer::new(vec![0b0000_1111, 0xF0]);
        reader.skip_bits(4);
        assert_eq!(reader.get_bits(8), Some(0xFF));
        reader.skip_bits(usize::MAX);
        assert!(reader.is_eof());
    }

    #[test]
    fn test_writer_grows_by_doubling() {
        let mut writer = BitWriter::with_capacity(1);
        for _ in 0..5 {
            writer.write(0xAB, 8).unwrap();
        }
        assert_eq!(writer.to_byte_array(), vec![0xAB; 5]);
    }

    #[test]
    fn test_bit_string() {
        let mut writer = BitWriter::new();
        writer.write_bit_string("1 0 1");
        assert_eq!(writer.to_byte_array(), vec![0b1010_0000]);
    }

    #[test]
    fn test_write_too_many_bits() {
        let mut writer = BitWriter::new();
        writer.write(1, 1).unwrap();
        let err = writer.write(0, 33).unwrap_err();
        assert!(matches!(err, CodecError::FieldWidth(33)));
        assert_eq!(writer.bit_len(), 1);
        writer.write(u32::MAX, 32).unwrap();
        assert_eq!(writer.bit_len(), 33);
    }

    #[test]
    fn test_empty_writer() {
        assert!(BitWriter::new().to_byte_array().is_empty());
    }
}
