//! Bit-level I/O and codec integration tests.
//!
//! Tests verify:
//! - BitWriter output read back by BitBuffer
//! - The LZW codec honours the compressor contract
//! - Self-tests are deterministic per seed

use plane_readers::codec::{
    self_test, BitBuffer, BitWriter, Compressor, LzwCodec, DEFAULT_TEST_BLOCKS, DEFAULT_TEST_SIZE,
};
use plane_readers::io::{ByteSource, MemorySource};

// =============================================================================
// Bit Fields
// =============================================================================

#[test]
fn test_bit_fields_round_trip() {
    let mut writer = BitWriter::new();
    writer.write(5, 3).unwrap();
    writer.write(200, 8).unwrap();
    writer.write(1, 1).unwrap();

    let mut reader = BitBuffer::new(writer.to_byte_array());
    assert_eq!(reader.get_bits(3), Some(5));
    assert_eq!(reader.get_bits(8), Some(200));
    assert_eq!(reader.get_bits(1), Some(1));
}

#[test]
fn test_bit_fields_from_byte_source() {
    let mut writer = BitWriter::with_capacity(2);
    for value in 0..64u32 {
        writer.write(value, 6).unwrap();
    }
    let mut source = MemorySource::new("bits", writer.to_byte_array());
    assert_eq!(source.length(), 48);

    let bytes = source.read_exact_at(0, 48).unwrap();
    let mut reader = BitBuffer::new(bytes);
    for value in 0..64u32 {
        assert_eq!(reader.get_bits(6), Some(value));
    }
    assert!(reader.is_eof());
    assert_eq!(reader.get_bits(1), None);
}

// =============================================================================
// Compressor Contract
// =============================================================================

#[test]
fn test_lzw_self_test_defaults() {
    let report = self_test(&LzwCodec::new(), 42, DEFAULT_TEST_SIZE, DEFAULT_TEST_BLOCKS).unwrap();
    assert_eq!(report.input_len, DEFAULT_TEST_SIZE);
    assert_eq!(report.blocks, DEFAULT_TEST_BLOCKS);
}

#[test]
fn test_self_test_is_seeded() {
    let codec = LzwCodec::new();
    let a = self_test(&codec, 1, 4096, 16).unwrap();
    let b = self_test(&codec, 1, 4096, 16).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_lzw_blocks_match_concatenation() {
    let codec = LzwCodec::new();
    let blocks: [&[u8]; 3] = [b"abcabcabc", b"", b"abcabcabcabc"];
    let whole = codec.compress(&blocks.concat()).unwrap();
    assert_eq!(codec.compress_blocks(&blocks).unwrap(), whole);

    let (head, tail) = whole.split_at(whole.len() / 2);
    assert_eq!(
        codec.decompress_blocks(&[head, tail]).unwrap(),
        blocks.concat()
    );
}

#[test]
fn test_lzw_compresses_synthetic_plane() {
    use plane_readers::{FakeReader, PlaneReader};

    let mut reader = FakeReader::new();
    reader.set_id("codec&sizeX=128&sizeY=64.fake").unwrap();
    let plane = reader.open_bytes(0).unwrap();

    let codec = LzwCodec::new();
    let compressed = codec.compress(&plane).unwrap();
    assert!(compressed.len() < plane.len());
    assert_eq!(codec.decompress(&compressed).unwrap(), plane);
}
