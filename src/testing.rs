//! In-memory reader used by unit tests.

use std::sync::Arc;

use crate::error::{ReaderError, ReaderResult};
use crate::model::{CoreMetadata, LookupTable};
use crate::reader::{check_series, PlaneReader, StatusListener, StatusReporter};
use crate::store::{MetadataStore, PixelsStore};

/// One series of a [`MemoryReader`].
pub struct MemorySeries {
    pub core: CoreMetadata,
    pub planes: Vec<Vec<u8>>,
    pub lut: Option<LookupTable>,
}

/// A reader serving fixed planes from memory and counting decodes.
pub struct MemoryReader {
    series: Vec<MemorySeries>,
    current: usize,
    id: Option<String>,
    pub open_calls: usize,
    pub close_calls: usize,
    pub status: StatusReporter,
    store: Box<dyn MetadataStore>,
}

impl MemoryReader {
    pub fn new(series: Vec<MemorySeries>) -> Self {
        Self {
            series,
            current: 0,
            id: None,
            open_calls: 0,
            close_calls: 0,
            status: StatusReporter::new(),
            store: Box::new(PixelsStore::new()),
        }
    }

    /// A single series whose planes are generated by `plane(no)`.
    pub fn single(core: CoreMetadata, plane: impl Fn(usize) -> Vec<u8>) -> Self {
        let planes = (0..core.image_count).map(plane).collect();
        Self::new(vec![MemorySeries {
            core,
            planes,
            lut: None,
        }])
    }

    pub fn with_lut(mut self, lut: LookupTable) -> Self {
        for s in &mut self.series {
            s.lut = Some(lut.clone());
        }
        self
    }

    /// A reader that is already open on `"memory"`.
    pub fn opened(mut self) -> Self {
        self.id = Some("memory".to_string());
        self
    }

    fn current(&self) -> ReaderResult<&MemorySeries> {
        self.id.as_ref().ok_or(ReaderError::NoCurrentFile)?;
        self.series
            .get(self.current)
            .ok_or(ReaderError::InvalidSeries {
                series: self.current,
                series_count: self.series.len(),
            })
    }
}

impl PlaneReader for MemoryReader {
    fn format_name(&self) -> &str {
        "memory"
    }

    fn set_id(&mut self, id: &str) -> ReaderResult<()> {
        self.id = Some(id.to_string());
        self.current = 0;
        Ok(())
    }

    fn close(&mut self) -> ReaderResult<()> {
        self.close_calls += 1;
        self.id = None;
        Ok(())
    }

    fn current_file(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn series_count(&self) -> ReaderResult<usize> {
        Ok(self.series.len())
    }

    fn series(&self) -> usize {
        self.current
    }

    fn set_series(&mut self, series: usize) -> ReaderResult<()> {
        check_series(series, self.series.len())?;
        self.current = series;
        Ok(())
    }

    fn core(&self) -> ReaderResult<CoreMetadata> {
        Ok(self.current()?.core)
    }

    fn open_bytes(&mut self, no: usize) -> ReaderResult<Vec<u8>> {
        let series = self.current()?;
        series.core.check_plane_number(no)?;
        let bytes = series.planes[no].clone();
        self.open_calls += 1;
        Ok(bytes)
    }

    fn lookup_table(&self) -> Option<&LookupTable> {
        self.current().ok()?.lut.as_ref()
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
