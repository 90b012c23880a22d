//! Reader decorators.
//!
//! Each decorator wraps another [`PlaneReader`](crate::reader::PlaneReader)
//! and performs one transformation. They compose in any order; the usual
//! chain, innermost first, is:
//!
//! ```text
//! format reader -> ChannelFiller -> ChannelSeparator | ChannelMerger -> DimensionSwapper
//! ```
//!
//! The filler must sit below the separator so that expanded palettes are
//! split like any other packed plane.

mod cache;
mod filler;
mod merger;
mod separator;
mod swapper;

pub use cache::{PlaneCache, DEFAULT_PLANE_CACHE_CAPACITY};
pub use filler::ChannelFiller;
pub use merger::ChannelMerger;
pub use separator::ChannelSeparator;
pub use swapper::DimensionSwapper;
