//! Structured metadata sinks.
//!
//! Readers publish per-series pixel geometry to a [`MetadataStore`] so that
//! structured metadata stays consistent with what decorators report. The
//! store only cares about geometry; calibration and other annotations are
//! handled elsewhere.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{CoreMetadata, DimensionOrder, PixelType};

/// Geometry record published for one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelsMetadata {
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub size_c: usize,
    pub size_t: usize,
    pub dimension_order: DimensionOrder,
    pub pixel_type: PixelType,
}

impl From<&CoreMetadata> for PixelsMetadata {
    fn from(core: &CoreMetadata) -> Self {
        Self {
            size_x: core.size_x,
            size_y: core.size_y,
            size_z: core.size_z,
            size_c: core.size_c,
            size_t: core.size_t,
            dimension_order: core.dimension_order,
            pixel_type: core.pixel_type,
        }
    }
}

/// Receiver of per-series geometry updates.
pub trait MetadataStore: Send {
    /// Record (or replace) the geometry of `series`.
    fn set_pixels(&mut self, series: usize, pixels: PixelsMetadata);

    /// Geometry last recorded for `series`, if any.
    fn pixels(&self, series: usize) -> Option<PixelsMetadata>;

    /// Forget everything.
    fn clear(&mut self);
}

/// A store that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyMetadata;

impl MetadataStore for DummyMetadata {
    fn set_pixels(&mut self, _series: usize, _pixels: PixelsMetadata) {}

    fn pixels(&self, _series: usize) -> Option<PixelsMetadata> {
        None
    }

    fn clear(&mut self) {}
}

/// In-memory store keyed by series.
#[derive(Debug, Default, Clone)]
pub struct PixelsStore {
    series: BTreeMap<usize, PixelsMetadata>,
}

impl PixelsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of series with recorded geometry.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl MetadataStore for PixelsStore {
    fn set_pixels(&mut self, series: usize, pixels: PixelsMetadata) {
        self.series.insert(series, pixels);
    }

    fn pixels(&self, series: usize) -> Option<PixelsMetadata> {
        self.series.get(&series).copied()
    }

    fn clear(&mut self) {
        self.series.clear();
    }
}
