//! Channel separation.
//!
//! [`ChannelSeparator`] presents every channel of a packed series as its own
//! plane. A packed plane holding three channels becomes three planes, and
//! C moves to the fastest non-planar slot of the dimension order.

use tracing::debug;

use crate::error::ReaderResult;
use crate::model::CoreMetadata;
use crate::pixels::split_channel;
use crate::reader::{forward_to_reader, PlaneReader, ReaderWrapper};

use super::cache::PlaneCache;

/// Decorator splitting packed planes into one plane per channel.
///
/// Channels of the same packed plane share one decode of the wrapped reader.
/// By default the last packed plane is kept in a [`PlaneCache`] until
/// another source plane, another series or another file is requested;
/// [`with_cache_capacity`](ChannelSeparator::with_cache_capacity) keeps more.
pub struct ChannelSeparator<R> {
    reader: R,
    cache: PlaneCache,
}

impl<R: PlaneReader> ChannelSeparator<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            cache: PlaneCache::new(),
        }
    }

    /// A separator caching up to `capacity` packed planes.
    pub fn with_cache_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            cache: PlaneCache::with_capacity(capacity),
        }
    }

    /// Whether the wrapped reader's current series has packed planes.
    pub fn can_separate(&self) -> ReaderResult<bool> {
        self.reader.is_packed()
    }

    /// The packed-plane cache, for inspecting hit and miss counts.
    pub fn cache(&self) -> &PlaneCache {
        &self.cache
    }

    /// Map an outer plane index to (wrapped plane index, channel, channels
    /// per packed plane).
    fn source_plane(&self, inner: &CoreMetadata, no: usize) -> ReaderResult<(usize, usize, usize)> {
        let outer = separated(inner);
        outer.check_plane_number(no)?;

        let channels = inner.rgb_channel_count();
        let (z, c, t) = outer.get_zct_coords(no)?;
        let source = inner.get_index(z, c / channels, t)?;
        Ok((source, c % channels, channels))
    }
}

/// Descriptor of a packed series after separation.
fn separated(inner: &CoreMetadata) -> CoreMetadata {
    if !inner.packed {
        return *inner;
    }
    CoreMetadata {
        image_count: inner.image_count * inner.rgb_channel_count(),
        dimension_order: inner.dimension_order.with_channel_packed(),
        packed: false,
        ..*inner
    }
}

impl<R: PlaneReader> ReaderWrapper for ChannelSeparator<R> {
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

impl<R: PlaneReader> PlaneReader for ChannelSeparator<R> {
    forward_to_reader!(
        format_name,
        current_file,
        series_count,
        series,
        lookup_table,
        add_status_listener,
        remove_status_listener,
        metadata_store,
        metadata_store_mut,
        set_metadata_store,
    );

    fn set_id(&mut self, id: &str) -> ReaderResult<()> {
        self.cache.invalidate();
        self.reader.set_id(id)
    }

    fn close(&mut self) -> ReaderResult<()> {
        self.cache.invalidate();
        self.reader.close()
    }

    fn set_series(&mut self, series: usize) -> ReaderResult<()> {
        self.cache.invalidate();
        self.reader.set_series(series)
    }

    fn core(&self) -> ReaderResult<CoreMetadata> {
        Ok(separated(&self.reader.core()?))
    }

    fn open_bytes(&mut self, no: usize) -> ReaderResult<Vec<u8>> {
        let inner = self.reader.core()?;
        if !inner.packed {
            return self.reader.open_bytes(no);
        }

        let (source, channel, channels) = self.source_plane(&inner, no)?;
        debug!(no, source, channel, channels, "separating channel");

        let series = self.reader.series();
        let reader = &mut self.reader;
        let packed = self
            .cache
            .get_or_load(source, series, || reader.open_bytes(source))?;

        split_channel(
            packed,
            channel,
            channels,
            inner.pixel_type.bytes_per_pixel(),
            inner.interleaved,
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
