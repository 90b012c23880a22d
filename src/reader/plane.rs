//! The `PlaneReader` trait.
//!
//! Every plane-producing component implements this trait: leaf format
//! readers as well as the decorators in [`crate::wrappers`]. Decorators hold
//! another `PlaneReader` and override only the operations whose meaning they
//! change.
//!
//! # Geometry
//!
//! A reader reports the geometry of its current series through
//! [`PlaneReader::core`]. All geometry getters are provided methods derived
//! from that descriptor, so a decorator that returns a transformed
//! descriptor automatically answers `image_count`, `get_index` and friends in
//! terms of its own index space.

use std::sync::Arc;

use image::DynamicImage;

use crate::error::{ReaderError, ReaderResult};
use crate::model::{CoreMetadata, DimensionOrder, LookupTable, PixelType};
use crate::store::MetadataStore;

use super::convert::{crop_plane, plane_to_image};
use super::status::StatusListener;

// =============================================================================
// PlaneReader Trait
// =============================================================================

/// Random access to the pixel planes of a multi-series image.
///
/// Readers are stateful: [`set_id`](PlaneReader::set_id) opens a source and
/// selects series 0, and every other operation applies to the current
/// series. Operations that need an open source fail with
/// [`ReaderError::NoCurrentFile`] before `set_id` or after `close`.
///
/// Instances are not meant to be shared: stateful operations take
/// `&mut self`, and a reader may be moved to another thread but not used
/// from two at once.
pub trait PlaneReader: Send {
    /// Short human-readable name of the format, e.g. `"Simulated data"`.
    fn format_name(&self) -> &str;

    /// Open the source identified by `id` and select series 0.
    ///
    /// Re-opening the current id is a no-op.
    fn set_id(&mut self, id: &str) -> ReaderResult<()>;

    /// Release the current source and discard all per-source state.
    fn close(&mut self) -> ReaderResult<()>;

    /// Id passed to the last successful `set_id`, if still open.
    fn current_file(&self) -> Option<&str>;

    /// Number of series in the current source.
    fn series_count(&self) -> ReaderResult<usize>;

    /// Index of the current series.
    fn series(&self) -> usize;

    /// Select the series subsequent calls apply to.
    ///
    /// # Errors
    ///
    /// [`ReaderError::InvalidSeries`] if `series >= series_count()`.
    fn set_series(&mut self, series: usize) -> ReaderResult<()>;

    /// Descriptor of the current series.
    fn core(&self) -> ReaderResult<CoreMetadata>;

    /// Raw bytes of plane `no` of the current series.
    ///
    /// The buffer holds `plane_size()` bytes laid out as the descriptor says
    /// (pixel type, packing, interleaving, byte order).
    ///
    /// # Errors
    ///
    /// [`ReaderError::InvalidPlaneIndex`] if `no >= image_count()`.
    fn open_bytes(&mut self, no: usize) -> ReaderResult<Vec<u8>>;

    /// Palette of the current series, if its pixels are indexed.
    ///
    /// Advisory: answers `None` rather than failing when nothing is open.
    fn lookup_table(&self) -> Option<&LookupTable>;

    /// Register a listener for progress notifications.
    fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>);

    /// Remove a listener, compared by identity.
    fn remove_status_listener(&mut self, listener: &Arc<dyn StatusListener>);

    /// Sink receiving geometry updates.
    fn metadata_store(&self) -> &dyn MetadataStore;

    fn metadata_store_mut(&mut self) -> &mut dyn MetadataStore;

    /// Replace the metadata sink. Takes effect at the next `set_id`.
    fn set_metadata_store(&mut self, store: Box<dyn MetadataStore>);

    // -------------------------------------------------------------------------
    // Provided geometry getters
    // -------------------------------------------------------------------------

    fn image_count(&self) -> ReaderResult<usize> {
        Ok(self.core()?.image_count)
    }

    fn size_x(&self) -> ReaderResult<usize> {
        Ok(self.core()?.size_x)
    }

    fn size_y(&self) -> ReaderResult<usize> {
        Ok(self.core()?.size_y)
    }

    fn size_z(&self) -> ReaderResult<usize> {
        Ok(self.core()?.size_z)
    }

    fn size_c(&self) -> ReaderResult<usize> {
        Ok(self.core()?.size_c)
    }

    fn size_t(&self) -> ReaderResult<usize> {
        Ok(self.core()?.size_t)
    }

    fn dimension_order(&self) -> ReaderResult<DimensionOrder> {
        Ok(self.core()?.dimension_order)
    }

    fn pixel_type(&self) -> ReaderResult<PixelType> {
        Ok(self.core()?.pixel_type)
    }

    /// Whether each plane packs several channels.
    fn is_packed(&self) -> ReaderResult<bool> {
        Ok(self.core()?.packed)
    }

    fn is_interleaved(&self) -> ReaderResult<bool> {
        Ok(self.core()?.interleaved)
    }

    fn is_little_endian(&self) -> ReaderResult<bool> {
        Ok(self.core()?.little_endian)
    }

    fn is_indexed(&self) -> ReaderResult<bool> {
        Ok(self.core()?.indexed)
    }

    fn is_false_color(&self) -> ReaderResult<bool> {
        Ok(self.core()?.false_color)
    }

    fn effective_size_c(&self) -> ReaderResult<usize> {
        Ok(self.core()?.effective_size_c())
    }

    fn rgb_channel_count(&self) -> ReaderResult<usize> {
        Ok(self.core()?.rgb_channel_count())
    }

    /// Size in bytes of one plane.
    fn plane_size(&self) -> ReaderResult<usize> {
        Ok(self.core()?.plane_size())
    }

    /// Linear index of `(z, c, t)`, where `c` counts stored channel planes.
    fn get_index(&self, z: usize, c: usize, t: usize) -> ReaderResult<usize> {
        self.core()?.get_index(z, c, t)
    }

    /// `(z, c, t)` coordinates of plane `no`.
    fn get_zct_coords(&self, no: usize) -> ReaderResult<(usize, usize, usize)> {
        self.core()?.get_zct_coords(no)
    }

    // -------------------------------------------------------------------------
    // Provided plane access
    // -------------------------------------------------------------------------

    /// Bytes of the `width x height` rectangle at `(x, y)` of plane `no`.
    ///
    /// # Errors
    ///
    /// [`ReaderError::FormatInconsistency`] if the rectangle leaves the plane.
    fn open_bytes_region(
        &mut self,
        no: usize,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> ReaderResult<Vec<u8>> {
        let core = self.core()?;
        let plane = self.open_bytes(no)?;
        crop_plane(&core, &plane, x, y, width, height)
    }

    /// Plane `no` decoded into an image.
    ///
    /// # Errors
    ///
    /// [`ReaderError::UnsupportedPixelType`] for pixel types or channel
    /// counts the `image` crate cannot represent.
    fn open_image(&mut self, no: usize) -> ReaderResult<DynamicImage> {
        let core = self.core()?;
        let plane = self.open_bytes(no)?;
        plane_to_image(&core, &plane)
    }
}

impl<R: PlaneReader + ?Sized> PlaneReader for Box<R> {
    fn format_name(&self) -> &str {
        (**self).format_name()
    }

    fn set_id(&mut self, id: &str) -> ReaderResult<()> {
        (**self).set_id(id)
    }

    fn close(&mut self) -> ReaderResult<()> {
        (**self).close()
    }

    fn current_file(&self) -> Option<&str> {
        (**self).current_file()
    }

    fn series_count(&self) -> ReaderResult<usize> {
        (**self).series_count()
    }

    fn series(&self) -> usize {
        (**self).series()
    }

    fn set_series(&mut self, series: usize) -> ReaderResult<()> {
        (**self).set_series(series)
    }

    fn core(&self) -> ReaderResult<CoreMetadata> {
        (**self).core()
    }

    fn open_bytes(&mut self, no: usize) -> ReaderResult<Vec<u8>> {
        (**self).open_bytes(no)
    }

    fn lookup_table(&self) -> Option<&LookupTable> {
        (**self).lookup_table()
    }

    fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>) {
        (**self).add_status_listener(listener)
    }

    fn remove_status_listener(&mut self, listener: &Arc<dyn StatusListener>) {
        (**self).remove_status_listener(listener)
    }

    fn metadata_store(&self) -> &dyn MetadataStore {
        (**self).metadata_store()
    }

    fn metadata_store_mut(&mut self) -> &mut dyn MetadataStore {
        (**self).metadata_store_mut()
    }

    fn set_metadata_store(&mut self, store: Box<dyn MetadataStore>) {
        (**self).set_metadata_store(store)
    }
}

/// Fail with [`ReaderError::InvalidSeries`] unless `series < count`.
pub fn check_series(series: usize, count: usize) -> ReaderResult<()> {
    if series >= count {
        return Err(ReaderError::InvalidSeries {
            series,
            series_count: count,
        });
    }
    Ok(())
}
