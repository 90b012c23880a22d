//! # Plane Readers
//!
//! Random-access extraction of 2-D pixel planes from multi-dimensional
//! microscopy images.
//!
//! An image series has five axes (X, Y, Z, C, T). Format readers expose it
//! as a linear sequence of XY planes; the decorators in this crate wrap a
//! reader and change how that sequence looks without touching the format
//! code.
//!
//! ## Features
//!
//! - **Dimension index algebra**: conversion between plane numbers and
//!   (Z, C, T) coordinates for every dimension order
//! - **Channel separation and merging**: split packed colour planes into one
//!   plane per channel, or pack separate channel planes together
//! - **Palette expansion**: replace indexed samples with their colour values
//! - **Dimension swapping**: relabel or reorder the Z, C and T axes
//! - **Bit-level I/O and codecs**: MSB-first bit fields and a block-aware
//!   compressor contract with an LZW implementation
//!
//! ## Architecture
//!
//! - [`model`] - Dimension orders, pixel types, series descriptors, palettes
//! - [`reader`] - The `PlaneReader` contract and the decorator base
//! - [`wrappers`] - Filler, separator, merger and swapper decorators
//! - [`formats`] - Synthetic reader and format registry
//! - [`pixels`] - Channel split/merge and palette expansion on byte buffers
//! - [`codec`] - Bit buffers and compressors
//! - [`io`] - Seekable byte sources and endian helpers
//! - [`store`] - Structured metadata sinks
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use plane_readers::{ChannelSeparator, FakeReader, PlaneReader};
//!
//! let mut reader = ChannelSeparator::new(FakeReader::new());
//! reader.set_id("test&sizeC=3&rgb=3&sizeZ=2.fake")?;
//! assert_eq!(reader.image_count()?, 6);
//! let plane = reader.open_bytes(4)?;
//! assert_eq!(plane.len(), reader.plane_size()?);
//! # Ok::<(), plane_readers::ReaderError>(())
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod formats;
pub mod io;
pub mod model;
pub mod pixels;
pub mod reader;
pub mod store;
pub mod wrappers;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use codec::{self_test, BitBuffer, BitWriter, Compressor, LzwCodec, SelfTestReport};
pub use config::{Cli, Command, InfoConfig, SelfTestConfig};
pub use error::{CodecError, IoError, ReaderError, ReaderResult};
pub use formats::{FakeReader, ImageReader, ReaderRegistry};
pub use io::{ByteSource, FileSource, MemorySource};
pub use model::{
    get_index, get_reordered_index, get_zct_coords, Axis, CoreMetadata, DimensionOrder,
    IndexSpace, LookupTable, PixelType,
};
pub use reader::{PlaneReader, ReaderWrapper, StatusEvent, StatusListener};
pub use store::{DummyMetadata, MetadataStore, PixelsMetadata, PixelsStore};
pub use wrappers::{ChannelFiller, ChannelMerger, ChannelSeparator, DimensionSwapper};
