//! Channel merging.
//!
//! [`ChannelMerger`] is the inverse of the separator: when a series stores
//! 2 to 4 channels as separate planes, it presents one packed plane per
//! (Z, T) position.

use tracing::debug;

use crate::error::ReaderResult;
use crate::model::CoreMetadata;
use crate::pixels::merge_channels;
use crate::reader::{forward_to_reader, PlaneReader, ReaderWrapper};

/// Decorator combining single-channel planes into packed planes.
///
/// Series that cannot be merged (one channel, more than four, already
/// packed, or indexed) pass through unchanged.
///
/// The packed layout follows the wrapped reader's `interleaved` flag:
/// channel-minor samples when set, one channel after the other otherwise.
pub struct ChannelMerger<R> {
    reader: R,
}

impl<R: PlaneReader> ChannelMerger<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Whether the wrapped reader's current series can be merged.
    pub fn can_merge(&self) -> ReaderResult<bool> {
        Ok(mergeable(&self.reader.core()?))
    }
}

fn mergeable(core: &CoreMetadata) -> bool {
    core.size_c > 1 && core.size_c <= 4 && !core.packed && !core.indexed
}

/// Descriptor of a series after merging.
fn merged(inner: &CoreMetadata) -> CoreMetadata {
    if !mergeable(inner) {
        return *inner;
    }
    CoreMetadata {
        image_count: inner.image_count / inner.size_c,
        dimension_order: inner.dimension_order.with_channel_packed(),
        packed: true,
        ..*inner
    }
}

impl<R: PlaneReader> ReaderWrapper for ChannelMerger<R> {
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

impl<R: PlaneReader> PlaneReader for ChannelMerger<R> {
    forward_to_reader!(
        format_name,
        set_id,
        close,
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

    fn core(&self) -> ReaderResult<CoreMetadata> {
        Ok(merged(&self.reader.core()?))
    }

    fn open_bytes(&mut self, no: usize) -> ReaderResult<Vec<u8>> {
        let inner = self.reader.core()?;
        if !mergeable(&inner) {
            return self.reader.open_bytes(no);
        }

        let outer = merged(&inner);
        outer.check_plane_number(no)?;
        let (z, _, t) = outer.get_zct_coords(no)?;

        let mut planes = Vec::with_capacity(inner.size_c);
        for c in 0..inner.size_c {
            let source = inner.get_index(z, c, t)?;
            debug!(no, z, c, t, source, "merging channel");
            planes.push(self.reader.open_bytes(source)?);
        }

        merge_channels(
            &planes,
            inner.pixel_type.bytes_per_pixel(),
            inner.interleaved,
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
