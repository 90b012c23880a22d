//! Byte-buffer transformations applied by the channel decorators.
//!
//! All functions work on raw plane bytes. Sample bytes are copied as units,
//! so splitting and merging never need to know the byte order; only palette
//! expansion has to decode and encode multi-byte values.

use crate::error::{ReaderError, ReaderResult};
use crate::io::{read_u16, write_u16};
use crate::model::LookupTable;

/// Extract one channel from a packed plane.
///
/// `packed` holds `channels` samples per pixel of `bytes_per_sample` bytes
/// each, stored channel-minor when `interleaved` and one channel after the
/// other otherwise. The result holds only the samples of `channel`.
///
/// # Errors
///
/// [`ReaderError::FormatInconsistency`] if the buffer length is not a whole
/// number of pixels or `channel` is out of range.
pub fn split_channel(
    packed: &[u8],
    channel: usize,
    channels: usize,
    bytes_per_sample: usize,
    interleaved: bool,
) -> ReaderResult<Vec<u8>> {
    if channel >= channels {
        return Err(ReaderError::FormatInconsistency(format!(
            "channel {} requested from a plane with {} channels",
            channel, channels
        )));
    }

    let pixel_bytes = channels * bytes_per_sample;
    if pixel_bytes == 0 || packed.len() % pixel_bytes != 0 {
        return Err(ReaderError::FormatInconsistency(format!(
            "packed plane of {} bytes is not a whole number of {}-channel pixels",
            packed.len(),
            channels
        )));
    }

    let channel_len = packed.len() / channels;
    if !interleaved {
        let start = channel * channel_len;
        return Ok(packed[start..start + channel_len].to_vec());
    }

    let offset = channel * bytes_per_sample;
    let mut out = Vec::with_capacity(channel_len);
    for pixel in packed.chunks_exact(pixel_bytes) {
        out.extend_from_slice(&pixel[offset..offset + bytes_per_sample]);
    }
    Ok(out)
}

/// Pack single-channel planes into one multi-channel plane.
///
/// The output is channel-minor when `interleaved`, channel-major otherwise.
///
/// # Errors
///
/// [`ReaderError::FormatInconsistency`] if the planes differ in length or
/// are not a whole number of samples.
pub fn merge_channels(
    planes: &[Vec<u8>],
    bytes_per_sample: usize,
    interleaved: bool,
) -> ReaderResult<Vec<u8>> {
    let Some(first) = planes.first() else {
        return Ok(Vec::new());
    };
    let channel_len = first.len();
    if let Some((c, plane)) = planes
        .iter()
        .enumerate()
        .find(|(_, plane)| plane.len() != channel_len)
    {
        return Err(ReaderError::FormatInconsistency(format!(
            "channel {} has {} bytes, channel 0 has {}",
            c,
            plane.len(),
            channel_len
        )));
    }
    if bytes_per_sample == 0 || channel_len % bytes_per_sample != 0 {
        return Err(ReaderError::FormatInconsistency(format!(
            "channel of {} bytes is not a whole number of {}-byte samples",
            channel_len, bytes_per_sample
        )));
    }

    let mut out = Vec::with_capacity(channel_len * planes.len());
    if !interleaved {
        for plane in planes {
            out.extend_from_slice(plane);
        }
        return Ok(out);
    }

    for offset in (0..channel_len).step_by(bytes_per_sample) {
        for plane in planes {
            out.extend_from_slice(&plane[offset..offset + bytes_per_sample]);
        }
    }
    Ok(out)
}

/// Replace palette indices with their colour values.
///
/// Indices are `index_bytes` wide (1, or 2 in `little_endian` order). Each
/// index becomes one sample per palette channel, laid out channel-minor when
/// `interleaved`. 16-bit palette samples are written in `little_endian`
/// order. Indices beyond the end of the palette expand to zero.
pub fn expand_indexed(
    indices: &[u8],
    index_bytes: usize,
    little_endian: bool,
    lut: &LookupTable,
    interleaved: bool,
) -> ReaderResult<Vec<u8>> {
    if !matches!(index_bytes, 1 | 2) {
        return Err(ReaderError::UnsupportedPixelType(format!(
            "palette indices must be 8 or 16 bits, got {} bytes",
            index_bytes
        )));
    }
    if indices.len() % index_bytes != 0 {
        return Err(ReaderError::FormatInconsistency(format!(
            "indexed plane of {} bytes is not a whole number of {}-byte indices",
            indices.len(),
            index_bytes
        )));
    }

    let pixels = indices.len() / index_bytes;
    let channels = lut.channel_count();
    let sample_bytes = lut.bytes_per_sample();
    let mut out = vec![0u8; pixels * channels * sample_bytes];

    for (i, raw) in indices.chunks_exact(index_bytes).enumerate() {
        let index = if index_bytes == 1 {
            usize::from(raw[0])
        } else {
            usize::from(read_u16(raw, little_endian))
        };

        for c in 0..channels {
            let sample = if interleaved {
                i * channels + c
            } else {
                c * pixels + i
            };
            let dst = &mut out[sample * sample_bytes..(sample + 1) * sample_bytes];
            match lut {
                LookupTable::Bits8(table) => {
                    if let Some(&v) = table[c].get(index) {
                        dst[0] = v;
                    }
                }
                LookupTable::Bits16(table) => {
                    if let Some(&v) = table[c].get(index) {
                        dst.copy_from_slice(&write_u16(v, little_endian));
                    }
                }
            }
        }
    }
    Ok(out)
}

// =============================================================================
// Tests
// =============================================================================
