//! Core image descriptor.
//!
//! [`CoreMetadata`] is the per-series geometry record every reader reports.
//! It is a plain `Copy` value: readers hand out copies, and decorators that
//! change geometry derive their own copy instead of touching the wrapped
//! reader's.

use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, ReaderResult};

use super::index::IndexSpace;
use super::order::{Axis, DimensionOrder};
use super::pixel::PixelType;

/// Geometry and sample layout of one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreMetadata {
    /// Plane width in pixels
    pub size_x: usize,

    /// Plane height in pixels
    pub size_y: usize,

    /// Number of focal planes
    pub size_z: usize,

    /// Number of channels, packed or not
    pub size_c: usize,

    /// Number of time points
    pub size_t: usize,

    /// Nesting order of the five axes, fastest first
    pub dimension_order: DimensionOrder,

    pub pixel_type: PixelType,

    /// Number of addressable planes in the series
    ///
    /// Always `size_z * size_t * effective_size_c()`.
    pub image_count: usize,

    /// Whether each plane stores several channels per pixel
    #[serde(rename = "rgb")]
    pub packed: bool,

    /// Whether packed channels are stored channel-minor (`RGBRGB...`)
    /// rather than one channel after another (`RRR...GGG...`)
    pub interleaved: bool,

    pub little_endian: bool,

    /// Whether samples are palette indices
    pub indexed: bool,

    /// Whether the palette is a pseudo-colour display aid rather than the
    /// real colours of the data
    pub false_color: bool,
}

impl CoreMetadata {
    /// A single-plane, single-channel series of the given size.
    pub fn new(size_x: usize, size_y: usize, pixel_type: PixelType) -> Self {
        Self {
            size_x,
            size_y,
            size_z: 1,
            size_c: 1,
            size_t: 1,
            dimension_order: DimensionOrder::XYZCT,
            pixel_type,
            image_count: 1,
            packed: false,
            interleaved: false,
            little_endian: true,
            indexed: false,
            false_color: false,
        }
    }

    /// Number of stored channel planes per (Z, T) position.
    ///
    /// Equals `size_c` when channels are stored separately and 1 when every
    /// plane packs all channels.
    pub fn effective_size_c(&self) -> usize {
        match self.size_z.checked_mul(self.size_t) {
            Some(zt) if zt > 0 => self.image_count / zt,
            _ => 0,
        }
    }

    /// Number of channels packed into each plane.
    pub fn rgb_channel_count(&self) -> usize {
        let effective = self.effective_size_c();
        if effective == 0 {
            return 0;
        }
        self.size_c / effective
    }

    /// Size in bytes of one plane as returned by `open_bytes`.
    pub fn plane_size(&self) -> usize {
        self.size_x * self.size_y * self.rgb_channel_count() * self.pixel_type.bytes_per_pixel()
    }

    /// Size of the given axis.
    pub fn size(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.size_x,
            Axis::Y => self.size_y,
            Axis::Z => self.size_z,
            Axis::C => self.size_c,
            Axis::T => self.size_t,
        }
    }

    pub fn set_size(&mut self, axis: Axis, size: usize) {
        match axis {
            Axis::X => self.size_x = size,
            Axis::Y => self.size_y = size,
            Axis::Z => self.size_z = size,
            Axis::C => self.size_c = size,
            Axis::T => self.size_t = size,
        }
    }

    /// Check the descriptor invariants.
    ///
    /// # Errors
    ///
    /// [`ReaderError::FormatInconsistency`] if a size is zero, the image
    /// count does not factor as `size_z * size_t * effective_size_c`,
    /// `size_c` is not a multiple of the effective channel count, or the
    /// plane size overflows `usize`.
    pub fn validate(&self) -> ReaderResult<()> {
        for axis in Axis::ALL {
            if self.size(axis) == 0 {
                return Err(ReaderError::FormatInconsistency(format!(
                    "size{} must be positive",
                    axis
                )));
            }
        }

        let zt = self
            .size_z
            .checked_mul(self.size_t)
            .ok_or_else(|| ReaderError::FormatInconsistency("sizeZ*sizeT overflows".into()))?;
        let effective = self.effective_size_c();
        if effective == 0 || zt.checked_mul(effective) != Some(self.image_count) {
            return Err(ReaderError::FormatInconsistency(format!(
                "imageCount {} is not a multiple of sizeZ*sizeT = {}",
                self.image_count, zt
            )));
        }
        if self.size_c % effective != 0 {
            return Err(ReaderError::FormatInconsistency(format!(
                "sizeC {} is not a multiple of the {} stored channel planes",
                self.size_c, effective
            )));
        }
        self.size_x
            .checked_mul(self.size_y)
            .and_then(|n| n.checked_mul(self.rgb_channel_count()))
            .and_then(|n| n.checked_mul(self.pixel_type.bytes_per_pixel()))
            .ok_or_else(|| {
                ReaderError::FormatInconsistency(format!(
                    "a {}x{} plane does not fit in memory",
                    self.size_x, self.size_y
                ))
            })?;
        Ok(())
    }

    /// The (Z, effective C, T) plane space of this series.
    ///
    /// # Errors
    ///
    /// [`ReaderError::FormatInconsistency`] if the image count disagrees
    /// with the sizes.
    pub fn index_space(&self) -> ReaderResult<IndexSpace> {
        let space = IndexSpace::new(
            self.dimension_order,
            self.size_z,
            self.effective_size_c(),
            self.size_t,
        )?;
        if space.plane_count() != self.image_count {
            return Err(ReaderError::FormatInconsistency(format!(
                "imageCount {} != sizeZ*sizeC*sizeT = {}",
                self.image_count,
                space.plane_count()
            )));
        }
        Ok(space)
    }

    /// Linear plane index of `(z, c, t)`, where `c` counts stored channel
    /// planes.
    pub fn get_index(&self, z: usize, c: usize, t: usize) -> ReaderResult<usize> {
        self.index_space()?.index(z, c, t)
    }

    /// `(z, c, t)` coordinates of plane `no`.
    pub fn get_zct_coords(&self, no: usize) -> ReaderResult<(usize, usize, usize)> {
        self.index_space()?.coords(no)
    }

    /// Fails with [`ReaderError::InvalidPlaneIndex`] unless `no < image_count`.
    pub fn check_plane_number(&self, no: usize) -> ReaderResult<()> {
        if no >= self.image_count {
            return Err(ReaderError::InvalidPlaneIndex {
                index: no,
                image_count: self.image_count,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
