//! Leaf format readers.
//!
//! - [`FakeReader`] - synthetic planes described by a `.fake` id
//! - [`ReaderRegistry`] / [`ImageReader`] - suffix-based format dispatch

pub mod fake;
mod registry;

pub use fake::{FakeParams, FakeReader};
pub use registry::{FormatEntry, ImageReader, ReaderConstructor, ReaderRegistry};
