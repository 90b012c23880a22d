//! Reader contract.
//!
//! This module defines the [`PlaneReader`] trait implemented by every
//! plane-producing component, and the decorator base that lets one reader
//! wrap another.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                 client                   │
//! └────────────────────┬─────────────────────┘
//!                      │ open_bytes(no)
//!                      ▼
//! ┌──────────────────────────────────────────┐
//! │   DimensionSwapper / ChannelMerger /     │
//! │   ChannelSeparator / ChannelFiller       │
//! │   (each maps `no` into the wrapped       │
//! │    reader's index space)                 │
//! └────────────────────┬─────────────────────┘
//!                      │
//!                      ▼
//! ┌──────────────────────────────────────────┐
//! │        format reader (leaf)              │
//! │   FakeReader, or any registered format   │
//! └──────────────────────────────────────────┘
//! ```

mod convert;
mod plane;
mod status;
mod wrapper;

pub use convert::{crop_plane, plane_to_image};
pub use plane::{check_series, PlaneReader};
pub use status::{StatusEvent, StatusListener, StatusReporter};
pub use wrapper::ReaderWrapper;

pub(crate) use wrapper::forward_to_reader;
