//! Pixel sample representations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, ReaderResult};

/// Enumerated sample representation with a fixed byte width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float,
    Double,
}

impl PixelType {
    /// Every pixel type, in declaration order.
    pub const ALL: [PixelType; 8] = [
        PixelType::Int8,
        PixelType::Uint8,
        PixelType::Int16,
        PixelType::Uint16,
        PixelType::Int32,
        PixelType::Uint32,
        PixelType::Float,
        PixelType::Double,
    ];

    /// Number of bytes used by one sample.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelType::Int8 | PixelType::Uint8 => 1,
            PixelType::Int16 | PixelType::Uint16 => 2,
            PixelType::Int32 | PixelType::Uint32 | PixelType::Float => 4,
            PixelType::Double => 8,
        }
    }

    /// Whether samples are signed. Floating point types count as signed.
    pub const fn is_signed(self) -> bool {
        !matches!(
            self,
            PixelType::Uint8 | PixelType::Uint16 | PixelType::Uint32
        )
    }

    pub const fn is_floating_point(self) -> bool {
        matches!(self, PixelType::Float | PixelType::Double)
    }

    /// Lowercase name, as used in synthetic ids and JSON output.
    pub const fn name(self) -> &'static str {
        match self {
            PixelType::Int8 => "int8",
            PixelType::Uint8 => "uint8",
            PixelType::Int16 => "int16",
            PixelType::Uint16 => "uint16",
            PixelType::Int32 => "int32",
            PixelType::Uint32 => "uint32",
            PixelType::Float => "float",
            PixelType::Double => "double",
        }
    }

    /// Pick the pixel type for a sample width and representation.
    ///
    /// 8-byte samples are always `Double`; `floating` only matters for
    /// 4-byte samples.
    pub fn from_bytes(bytes: usize, signed: bool, floating: bool) -> ReaderResult<Self> {
        match bytes {
            1 if signed => Ok(PixelType::Int8),
            1 => Ok(PixelType::Uint8),
            2 if signed => Ok(PixelType::Int16),
            2 => Ok(PixelType::Uint16),
            4 if floating => Ok(PixelType::Float),
            4 if signed => Ok(PixelType::Int32),
            4 => Ok(PixelType::Uint32),
            8 => Ok(PixelType::Double),
            _ => Err(ReaderError::UnsupportedPixelType(format!(
                "unsupported byte depth: {}",
                bytes
            ))),
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelType {
    type Err = ReaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        PixelType::ALL
            .into_iter()
            .find(|t| t.name() == lower)
            .ok_or_else(|| ReaderError::UnsupportedPixelType(format!("unknown type: '{}'", s)))
    }
}
