use weezl::decode::Decoder;
use weezl::encode::Encoder;
use weezl::BitOrder;

use crate::error::CodecError;

use super::compressor::Compressor;

/// TIFF-flavoured LZW: 8-bit symbols, MSB-first codes, early code-size switch.
#[derive(Debug, Default, Clone, Copy)]
pub struct LzwCodec;

impl LzwCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Compressor for LzwCodec {
    fn name(&self) -> &str {
        "lzw"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Encoder::with_tiff_size_switch(BitOrder::Msb, 8)
            .encode(data)
            .map_err(|e| CodecError::Compress(format!("LZW: {}", e)))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Decoder::with_tiff_size_switch(BitOrder::Msb, 8)
            .decode(data)
            .map_err(|e| CodecError::Decompress(format!("LZW: {}", e)))
    }
}
