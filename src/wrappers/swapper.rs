//! Dimension relabelling.
//!
//! [`DimensionSwapper`] changes how the non-planar axes of a series are
//! labelled or rasterised without touching pixel bytes:
//!
//! - [`swap_dimensions`](DimensionSwapper::swap_dimensions) relabels: each
//!   size stays at its position in the order and takes the axis symbol found
//!   there in the new order. Use it when a format reports the wrong order.
//! - [`set_output_order`](DimensionSwapper::set_output_order) reshuffles:
//!   axes keep their sizes, but planes are presented in a different
//!   rasterisation order.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{ReaderError, ReaderResult};
use crate::model::{Axis, CoreMetadata, DimensionOrder};
use crate::reader::{forward_to_reader, PlaneReader, ReaderWrapper};
use crate::store::PixelsMetadata;

/// Per-series state of a [`DimensionSwapper`].
#[derive(Debug, Clone, Copy, Default)]
struct SeriesOverride {
    /// Relabelled descriptor, if `swap_dimensions` was called
    swapped: Option<CoreMetadata>,

    /// Presentation order, if `set_output_order` was called
    output_order: Option<DimensionOrder>,
}

/// Decorator relabelling or reshuffling the dimension order.
pub struct DimensionSwapper<R> {
    reader: R,
    overrides: HashMap<usize, SeriesOverride>,
}

impl<R: PlaneReader> DimensionSwapper<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            overrides: HashMap::new(),
        }
    }

    fn current(&self) -> SeriesOverride {
        self.overrides
            .get(&self.reader.series())
            .copied()
            .unwrap_or_default()
    }

    /// Descriptor after relabelling, before any output order is applied.
    fn input_core(&self) -> ReaderResult<CoreMetadata> {
        match self.current().swapped {
            Some(core) => Ok(core),
            None => self.reader.core(),
        }
    }

    /// Dimension order the planes are stored in, after relabelling.
    pub fn input_order(&self) -> ReaderResult<DimensionOrder> {
        Ok(self.input_core()?.dimension_order)
    }

    /// Relabel the dimensions of the current series.
    ///
    /// Sizes stay at their positions: swapping `XYCZT` (Z=3, C=2, T=5) to
    /// `XYZCT` yields Z=2, C=3, T=5. Swapping to the current order does
    /// nothing. The new geometry is published to the metadata store.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::InvalidDimensionOrder`] if `order` is malformed, or
    ///   would move C while planes pack several channels
    /// - [`ReaderError::NoCurrentFile`] if nothing is open
    pub fn swap_dimensions(&mut self, order: &str) -> ReaderResult<()> {
        let new_order = DimensionOrder::parse(order)?;
        let current = self.input_core()?;
        let old_order = current.dimension_order;
        if new_order == old_order {
            return Ok(());
        }
        check_channel_move(&current, old_order, new_order)?;

        let mut positions = [0usize; 5];
        for axis in Axis::ALL {
            positions[old_order.position(axis)] = current.size(axis);
        }
        let mut swapped = current;
        for axis in Axis::ALL {
            swapped.set_size(axis, positions[new_order.position(axis)]);
        }
        swapped.dimension_order = new_order;

        let series = self.reader.series();
        info!(
            series,
            from = %old_order,
            to = %new_order,
            size_z = swapped.size_z,
            size_c = swapped.size_c,
            size_t = swapped.size_t,
            "swapped dimensions"
        );

        self.overrides.entry(series).or_default().swapped = Some(swapped);
        self.reader
            .metadata_store_mut()
            .set_pixels(series, PixelsMetadata::from(&swapped));
        Ok(())
    }

    /// Present the planes of the current series in `order`.
    ///
    /// Axis sizes do not change; plane `no` of the output order is read from
    /// the plane with the same (Z, C, T) in the input order.
    ///
    /// # Errors
    ///
    /// [`ReaderError::InvalidDimensionOrder`] if `order` is malformed, or
    /// would move C while planes pack several channels.
    pub fn set_output_order(&mut self, order: &str) -> ReaderResult<()> {
        let new_order = DimensionOrder::parse(order)?;
        let current = self.input_core()?;
        check_channel_move(&current, current.dimension_order, new_order)?;

        let series = self.reader.series();
        debug!(series, input = %current.dimension_order, output = %new_order, "output order set");
        self.overrides.entry(series).or_default().output_order = Some(new_order);
        Ok(())
    }
}

fn check_channel_move(
    core: &CoreMetadata,
    from: DimensionOrder,
    to: DimensionOrder,
) -> ReaderResult<()> {
    if core.rgb_channel_count() > 1 && from.position(Axis::C) != to.position(Axis::C) {
        return Err(ReaderError::invalid_order(
            to.to_string(),
            format!(
                "cannot move C while planes pack {} channels",
                core.rgb_channel_count()
            ),
        ));
    }
    Ok(())
}

impl<R: PlaneReader> ReaderWrapper for DimensionSwapper<R> {
    type Inner = R;

    fn reader(&self) -> &R {
        &self.reader
    }

    fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    fn into_reader(self) -> R {
        self.reader
    }
}

impl<R: PlaneReader> PlaneReader for DimensionSwapper<R> {
    forward_to_reader!(
        format_name,
        current_file,
        series_count,
        series,
        set_series,
        lookup_table,
        add_status_listener,
        remove_status_listener,
        metadata_store,
        metadata_store_mut,
        set_metadata_store,
    );

    fn set_id(&mut self, id: &str) -> ReaderResult<()> {
        if self.reader.current_file() != Some(id) {
            self.overrides.clear();
        }
        self.reader.set_id(id)
    }

    fn close(&mut self) -> ReaderResult<()> {
        self.overrides.clear();
        self.reader.close()
    }

    fn core(&self) -> ReaderResult<CoreMetadata> {
        let mut core = self.input_core()?;
        if let Some(order) = self.current().output_order {
            core.dimension_order = order;
        }
        Ok(core)
    }

    fn open_bytes(&mut self, no: usize) -> ReaderResult<Vec<u8>> {
        let input = self.input_core()?;
        input.check_plane_number(no)?;

        let source = match self.current().output_order {
            Some(order) if order != input.dimension_order => {
                input.index_space()?.reordered_index(order, no)?
            }
            _ => no,
        };
        self.reader.open_bytes(source)
    }
}

// =============================================================================
// Tests
// =============================================================================
