//! Dimension index algebra.
//!
//! Converts between a linear plane index and (Z, C, T) coordinates for a
//! given dimension order. The three non-planar axes are rasterised in the
//! order they appear in the dimension order string, fastest first, so for
//! `XYZCT` the index is `z + sizeZ * (c + sizeC * t)`.
//!
//! Axes of size 1 are degenerate: their coordinate is always 0 and they add
//! nothing to the index.

use crate::error::{ReaderError, ReaderResult};

use super::order::{Axis, DimensionOrder};

// =============================================================================
// Generic rasterisation
// =============================================================================

/// Computes the linear raster index of `pos` within an N-D grid.
///
/// `lengths[i]` is the extent of axis `i`; axis 0 varies fastest.
pub fn position_to_raster(lengths: &[usize], pos: &[usize]) -> usize {
    let mut offset = 1;
    let mut raster = 0;
    for (&length, &p) in lengths.iter().zip(pos) {
        raster += offset * p;
        offset *= length;
    }
    raster
}

/// Inverse of [`position_to_raster`].
///
/// The last axis absorbs any remainder, so out-of-range rasters produce an
/// out-of-range final coordinate rather than wrapping.
pub fn raster_to_position(lengths: &[usize], raster: usize) -> Vec<usize> {
    let mut pos = vec![0; lengths.len()];
    let mut offset = 1;
    let mut raster = raster;
    for (i, &length) in lengths.iter().enumerate() {
        let next = offset * length;
        let q = if i + 1 < lengths.len() && next > 0 {
            raster % next
        } else {
            raster
        };
        pos[i] = q / offset;
        raster -= q;
        offset = next;
    }
    pos
}

/// Number of raster values in a grid with the given extents.
pub fn raster_length(lengths: &[usize]) -> usize {
    lengths.iter().product()
}

// =============================================================================
// IndexSpace
// =============================================================================

/// The (Z, C, T) plane space of a series under one dimension order.
///
/// `size_c` is the number of stored channel planes: the effective channel
/// count, which is 1 when all channels are packed into each plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpace {
    order: DimensionOrder,
    size_z: usize,
    size_c: usize,
    size_t: usize,
}

impl IndexSpace {
    /// Create an index space.
    ///
    /// # Errors
    ///
    /// Fails with [`ReaderError::FormatInconsistency`] if any size is zero.
    pub fn new(order: DimensionOrder, size_z: usize, size_c: usize, size_t: usize) -> ReaderResult<Self> {
        for (axis, size) in [('Z', size_z), ('C', size_c), ('T', size_t)] {
            if size == 0 {
                return Err(ReaderError::FormatInconsistency(format!(
                    "invalid {} size: {}",
                    axis, size
                )));
            }
        }
        Ok(Self {
            order,
            size_z,
            size_c,
            size_t,
        })
    }

    pub fn order(&self) -> DimensionOrder {
        self.order
    }

    /// Total number of planes: `sizeZ * sizeC * sizeT`.
    pub fn plane_count(&self) -> usize {
        self.size_z * self.size_c * self.size_t
    }

    fn size_of(&self, axis: Axis) -> usize {
        match axis {
            Axis::Z => self.size_z,
            Axis::C => self.size_c,
            Axis::T => self.size_t,
            Axis::X | Axis::Y => 1,
        }
    }

    fn lengths(&self) -> [usize; 3] {
        self.order.rasterization().map(|axis| self.size_of(axis))
    }

    /// Linear index of the plane at `(z, c, t)`.
    ///
    /// # Errors
    ///
    /// [`ReaderError::InvalidCoordinate`] if a coordinate is outside its axis.
    pub fn index(&self, z: usize, c: usize, t: usize) -> ReaderResult<usize> {
        for (axis, value, size) in [('Z', z, self.size_z), ('C', c, self.size_c), ('T', t, self.size_t)] {
            if value >= size {
                return Err(ReaderError::InvalidCoordinate { axis, value, size });
            }
        }

        let pos = self.order.rasterization().map(|axis| match axis {
            Axis::Z => z,
            Axis::C => c,
            _ => t,
        });
        Ok(position_to_raster(&self.lengths(), &pos))
    }

    /// `(z, c, t)` coordinates of the plane at linear `index`.
    ///
    /// # Errors
    ///
    /// [`ReaderError::InvalidPlaneIndex`] if `index >= plane_count()`.
    pub fn coords(&self, index: usize) -> ReaderResult<(usize, usize, usize)> {
        let count = self.plane_count();
        if index >= count {
            return Err(ReaderError::InvalidPlaneIndex {
                index,
                image_count: count,
            });
        }

        let pos = raster_to_position(&self.lengths(), index);
        let mut zct = (0, 0, 0);
        for (axis, value) in self.order.rasterization().into_iter().zip(pos) {
            match axis {
                Axis::Z => zct.0 = value,
                Axis::C => zct.1 = value,
                _ => zct.2 = value,
            }
        }
        Ok(zct)
    }

    /// Maps an index expressed in `new_order` back to this space's order.
    ///
    /// Used to present the same planes under a different rasterisation
    /// without relabelling any axis.
    pub fn reordered_index(&self, new_order: DimensionOrder, new_index: usize) -> ReaderResult<usize> {
        let shuffled = IndexSpace {
            order: new_order,
            ..*self
        };
        let (z, c, t) = shuffled.coords(new_index)?;
        self.index(z, c, t)
    }
}

// =============================================================================
// Tests
// =============================================================================
