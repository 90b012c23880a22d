//! Series descriptors and the dimension index algebra.
//!
//! Everything here is plain data: no I/O and no reader state. Readers and
//! decorators build on these types to agree on how a linear plane index maps
//! to (Z, C, T) coordinates.

mod index;
mod lut;
mod metadata;
mod order;
mod pixel;

pub use index::{position_to_raster, raster_length, raster_to_position, IndexSpace};
pub use lut::LookupTable;
pub use metadata::CoreMetadata;
pub use order::{Axis, DimensionOrder};
pub use pixel::PixelType;

use crate::error::ReaderResult;

/// Linear index of `(z, c, t)` for a series of the given geometry.
///
/// # Errors
///
/// - [`crate::error::ReaderError::FormatInconsistency`] if
///   `image_count != size_z * size_c * size_t`
/// - [`crate::error::ReaderError::InvalidCoordinate`] if a coordinate is out
///   of range
#[allow(clippy::too_many_arguments)]
pub fn get_index(
    order: DimensionOrder,
    size_z: usize,
    size_c: usize,
    size_t: usize,
    image_count: usize,
    z: usize,
    c: usize,
    t: usize,
) -> ReaderResult<usize> {
    checked_space(order, size_z, size_c, size_t, image_count)?.index(z, c, t)
}

/// `(z, c, t)` coordinates of plane `index`; inverse of [`get_index`].
pub fn get_zct_coords(
    order: DimensionOrder,
    size_z: usize,
    size_c: usize,
    size_t: usize,
    image_count: usize,
    index: usize,
) -> ReaderResult<(usize, usize, usize)> {
    checked_space(order, size_z, size_c, size_t, image_count)?.coords(index)
}

/// Index in `order` of the plane addressed as `new_index` under `new_order`.
#[allow(clippy::too_many_arguments)]
pub fn get_reordered_index(
    order: DimensionOrder,
    new_order: DimensionOrder,
    size_z: usize,
    size_c: usize,
    size_t: usize,
    image_count: usize,
    new_index: usize,
) -> ReaderResult<usize> {
    checked_space(order, size_z, size_c, size_t, image_count)?.reordered_index(new_order, new_index)
}

fn checked_space(
    order: DimensionOrder,
    size_z: usize,
    size_c: usize,
    size_t: usize,
    image_count: usize,
) -> ReaderResult<IndexSpace> {
    let space = IndexSpace::new(order, size_z, size_c, size_t)?;
    if space.plane_count() != image_count {
        return Err(crate::error::ReaderError::FormatInconsistency(format!(
            "imageCount {} != sizeZ*sizeC*sizeT = {}",
            image_count,
            space.plane_count()
        )));
    }
    Ok(space)
}
