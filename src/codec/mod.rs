//! Bit-level packing and the compressor contract.
//!
//! Format decoders use [`BitBuffer`] and [`BitWriter`] for headers whose
//! fields are not byte aligned, and implement [`Compressor`] for their
//! compression schemes. [`LzwCodec`] is the one concrete codec shipped here.

mod bits;
mod compressor;
mod lzw;

pub use bits::{BitBuffer, BitWriter};
pub use compressor::{
    self_test, Compressor, SelfTestReport, DEFAULT_TEST_BLOCKS, DEFAULT_TEST_SIZE,
};
pub use lzw::LzwCodec;
