//! Test utilities for integration tests.
//!
//! Provides a stub reader serving fixed planes and counting how often the
//! decorators above it decode a plane.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use plane_readers::model::{CoreMetadata, DimensionOrder, LookupTable, PixelType};
use plane_readers::reader::{check_series, PlaneReader, StatusListener, StatusReporter};
use plane_readers::store::{MetadataStore, PixelsMetadata, PixelsStore};
use plane_readers::{ReaderError, ReaderResult};

// =============================================================================
// Stub Reader with Call Tracking
// =============================================================================

/// One series of a [`StubReader`].
pub struct StubSeries {
    pub core: CoreMetadata,
    pub planes: Vec<Vec<u8>>,
}

/// A reader serving planes from memory.
///
/// `open_bytes` calls are counted through a shared counter so the count
/// stays visible after the stub has been moved into a decorator.
pub struct StubReader {
    series: Vec<StubSeries>,
    current: usize,
    id: Option<String>,
    lut: Option<LookupTable>,
    open_count: Arc<AtomicUsize>,
    close_count: Arc<AtomicUsize>,
    status: StatusReporter,
    store: Box<dyn MetadataStore>,
}

impl StubReader {
    pub fn new(series: Vec<StubSeries>) -> Self {
        Self {
            series,
            current: 0,
            id: None,
            lut: None,
            open_count: Arc::new(AtomicUsize::new(0)),
            close_count: Arc::new(AtomicUsize::new(0)),
            status: StatusReporter::new(),
            store: Box::new(PixelsStore::new()),
        }
    }

    /// A single series whose planes are filled by [`pattern`].
    pub fn patterned(core: CoreMetadata) -> Self {
        Self::new(vec![patterned_series(core)])
    }

    pub fn with_lut(mut self, lut: LookupTable) -> Self {
        self.lut = Some(lut);
        self
    }

    /// Handle on the number of `open_bytes` calls served.
    pub fn open_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.open_count)
    }

    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.close_count)
    }

    fn current(&self) -> ReaderResult<&StubSeries> {
        self.id.as_ref().ok_or(ReaderError::NoCurrentFile)?;
        Ok(&self.series[self.current])
    }
}

impl PlaneReader for StubReader {
    fn format_name(&self) -> &str {
        "stub"
    }

    fn set_id(&mut self, id: &str) -> ReaderResult<()> {
        if self.id.as_deref() == Some(id) {
            return Ok(());
        }
        self.id = Some(id.to_string());
        self.current = 0;
        for (i, series) in self.series.iter().enumerate() {
            self.store.set_pixels(i, PixelsMetadata::from(&series.core));
        }
        self.status.report(1, 1, format!("opened {}", id));
        Ok(())
    }

    fn close(&mut self) -> ReaderResult<()> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        self.id = None;
        Ok(())
    }

    fn current_file(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn series_count(&self) -> ReaderResult<usize> {
        self.id.as_ref().ok_or(ReaderError::NoCurrentFile)?;
        Ok(self.series.len())
    }

    fn series(&self) -> usize {
        self.current
    }

    fn set_series(&mut self, series: usize) -> ReaderResult<()> {
        check_series(series, self.series_count()?)?;
        self.current = series;
        Ok(())
    }

    fn core(&self) -> ReaderResult<CoreMetadata> {
        Ok(self.current()?.core)
    }

    fn open_bytes(&mut self, no: usize) -> ReaderResult<Vec<u8>> {
        let series = self.current()?;
        series.core.check_plane_number(no)?;
        let plane = series.planes[no].clone();
        self.open_count.fetch_add(1, Ordering::SeqCst);
        Ok(plane)
    }

    fn lookup_table(&self) -> Option<&LookupTable> {
        self.id.as_ref()?;
        self.lut.as_ref()
    }

    fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>) {
        self.status.add(listener);
    }

    fn remove_status_listener(&mut self, listener: &Arc<dyn StatusListener>) {
        self.status.remove(listener);
    }

    fn metadata_store(&self) -> &dyn MetadataStore {
        &*self.store
    }

    fn metadata_store_mut(&mut self) -> &mut dyn MetadataStore {
        &mut *self.store
    }

    fn set_metadata_store(&mut self, store: Box<dyn MetadataStore>) {
        self.store = store;
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Deterministic content of byte `i` of plane `no`.
pub fn pattern(no: usize, i: usize) -> u8 {
    (no * 31 + i * 7 + 3) as u8
}

/// A series whose planes are filled by [`pattern`].
pub fn patterned_series(core: CoreMetadata) -> StubSeries {
    let planes: Vec<Vec<u8>> = (0..core.image_count)
        .map(|no| (0..core.plane_size()).map(|i| pattern(no, i)).collect())
        .collect();
    StubSeries { core, planes }
}

/// A series of `size_z * size_t` planes, each packing `channels` channels.
pub fn packed_core(
    channels: usize,
    interleaved: bool,
    order: DimensionOrder,
    size_z: usize,
    size_t: usize,
) -> CoreMetadata {
    CoreMetadata {
        size_z,
        size_c: channels,
        size_t,
        dimension_order: order,
        image_count: size_z * size_t,
        packed: true,
        interleaved,
        ..CoreMetadata::new(5, 3, PixelType::Uint16)
    }
}

/// A series with one plane per (Z, C, T).
pub fn planar_core(order: DimensionOrder, size_z: usize, size_c: usize, size_t: usize) -> CoreMetadata {
    CoreMetadata {
        size_z,
        size_c,
        size_t,
        dimension_order: order,
        image_count: size_z * size_c * size_t,
        ..CoreMetadata::new(4, 2, PixelType::Uint8)
    }
}

/// Wrap `reader` and open it on `"stub"`.
pub fn opened<R: PlaneReader>(mut reader: R) -> R {
    reader.set_id("stub").expect("stub opens");
    reader
}
