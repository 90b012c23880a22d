//! Seekable byte sources and endian-aware sample packing.

mod byte_source;

pub use byte_source::{
    pack_bytes, read_u16, read_u16_be, read_u16_le, read_u32_be, read_u32_le, unpack_bytes,
    write_u16, ByteSource, FileSource, MemorySource,
};
