//! The compressor contract.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::CodecError;

/// Default input size of [`self_test`], in bytes.
pub const DEFAULT_TEST_SIZE: usize = 50_000;

/// Default number of blocks [`self_test`] splits its input into.
pub const DEFAULT_TEST_BLOCKS: usize = 100;

/// A one-dimensional byte codec.
///
/// Concrete codecs implement [`compress`](Compressor::compress) and
/// [`decompress`](Compressor::decompress). The multi-block forms concatenate
/// their blocks in order and delegate to the single-block form, so
/// compressing several blocks is byte-for-byte identical to compressing
/// their concatenation.
pub trait Compressor {
    /// Short codec name for logs and reports.
    fn name(&self) -> &str;

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    fn compress_blocks(&self, blocks: &[&[u8]]) -> Result<Vec<u8>, CodecError> {
        self.compress(&blocks.concat())
    }

    fn decompress_blocks(&self, blocks: &[&[u8]]) -> Result<Vec<u8>, CodecError> {
        self.decompress(&blocks.concat())
    }
}

/// Outcome of a successful [`self_test`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfTestReport {
    pub codec: String,
    pub seed: u64,
    pub input_len: usize,
    pub compressed_len: usize,
    pub blocks: usize,
}

impl SelfTestReport {
    /// Compressed size divided by input size.
    pub fn ratio(&self) -> f64 {
        if self.input_len == 0 {
            return 0.0;
        }
        self.compressed_len as f64 / self.input_len as f64
    }
}

/// Exercise `codec` on `size` seeded random bytes.
///
/// Checks that decompressing the compressed data gives the input back, and
/// that compressing the input split into `blocks` pieces gives the same
/// bytes as compressing it whole. The same seed always produces the same
/// input.
///
/// # Errors
///
/// Codec errors are returned as-is; contract violations are reported as
/// [`CodecError::SelfTest`].
pub fn self_test<C: Compressor + ?Sized>(
    codec: &C,
    seed: u64,
    size: usize,
    blocks: usize,
) -> Result<SelfTestReport, CodecError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; size];
    rng.fill_bytes(&mut data);

    info!(codec = codec.name(), seed, size, blocks, "running codec self-test");

    let compressed = codec.compress(&data)?;
    let restored = codec.decompress(&compressed)?;
    if restored != data {
        return Err(CodecError::SelfTest(format!(
            "{}: decompressed {} bytes differ from the {} input bytes",
            codec.name(),
            restored.len(),
            data.len()
        )));
    }
    debug!(compressed = compressed.len(), "single block round trip ok");

    let chunk = size.div_ceil(blocks.max(1)).max(1);
    let pieces: Vec<&[u8]> = data.chunks(chunk).collect();
    let multi = codec.compress_blocks(&pieces)?;
    if multi != compressed {
        return Err(CodecError::SelfTest(format!(
            "{}: compressing {} blocks differs from compressing their concatenation",
            codec.name(),
            pieces.len()
        )));
    }

    let restored = codec.decompress_blocks(&[compressed.as_slice()])?;
    if restored != data {
        return Err(CodecError::SelfTest(format!(
            "{}: multi-block decompression differs from the input",
            codec.name()
        )));
    }

    Ok(SelfTestReport {
        codec: codec.name().to_string(),
        seed,
        input_len: size,
        compressed_len: compressed.len(),
        blocks: pieces.len(),
    })
}
