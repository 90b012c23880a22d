//! Colour lookup tables for indexed pixel data.

use crate::error::{ReaderError, ReaderResult};

/// A channel-major palette.
///
/// `table[channel][index]` is the intensity of `channel` for palette entry
/// `index`. A palette has 1, 3 or 4 channels of equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTable {
    Bits8(Vec<Vec<u8>>),
    Bits16(Vec<Vec<u16>>),
}

impl LookupTable {
    /// Number of palette channels.
    pub fn channel_count(&self) -> usize {
        match self {
            LookupTable::Bits8(table) => table.len(),
            LookupTable::Bits16(table) => table.len(),
        }
    }

    /// Number of palette entries per channel.
    pub fn len(&self) -> usize {
        match self {
            LookupTable::Bits8(table) => table.first().map_or(0, Vec::len),
            LookupTable::Bits16(table) => table.first().map_or(0, Vec::len),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width in bytes of one palette sample.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            LookupTable::Bits8(_) => 1,
            LookupTable::Bits16(_) => 2,
        }
    }

    /// Check that the palette has 1, 3 or 4 non-empty channels of equal length.
    pub fn validate(&self) -> ReaderResult<()> {
        let channels = self.channel_count();
        if !matches!(channels, 1 | 3 | 4) {
            return Err(ReaderError::FormatInconsistency(format!(
                "lookup table has {} channels, expected 1, 3 or 4",
                channels
            )));
        }

        let len = self.len();
        let lengths: Vec<usize> = match self {
            LookupTable::Bits8(table) => table.iter().map(Vec::len).collect(),
            LookupTable::Bits16(table) => table.iter().map(Vec::len).collect(),
        };
        if len == 0 || lengths.iter().any(|&l| l != len) {
            return Err(ReaderError::FormatInconsistency(format!(
                "lookup table channel lengths {:?} are empty or unequal",
                lengths
            )));
        }
        Ok(())
    }
}
