//! Format registry and the dispatching reader.
//!
//! Formats are registered explicitly as constructor functions keyed by name
//! and id suffix. [`ImageReader`] owns one instance of every registered
//! reader and forwards each call to the one whose suffix matches the
//! current id.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ReaderError, ReaderResult};
use crate::model::{CoreMetadata, LookupTable};
use crate::reader::{PlaneReader, StatusListener};
use crate::store::{DummyMetadata, MetadataStore};

use super::fake::{self, FakeReader};

/// Creates a fresh, closed reader.
pub type ReaderConstructor = fn() -> Box<dyn PlaneReader>;

// =============================================================================
// FormatEntry
// =============================================================================

/// One registered format.
#[derive(Debug, Clone, Copy)]
pub struct FormatEntry {
    /// Human-readable format name
    pub name: &'static str,

    /// Accepted id suffixes without the leading dot, compared
    /// case-insensitively
    pub suffixes: &'static [&'static str],

    pub constructor: ReaderConstructor,
}

impl FormatEntry {
    /// Whether `id` ends with one of this format's suffixes.
    pub fn matches(&self, id: &str) -> bool {
        let lower = id.to_ascii_lowercase();
        self.suffixes
            .iter()
            .any(|suffix| lower.ends_with(&format!(".{}", suffix.to_ascii_lowercase())))
    }
}

fn new_fake_reader() -> Box<dyn PlaneReader> {
    Box::new(FakeReader::new())
}

// =============================================================================
// ReaderRegistry
// =============================================================================

/// Ordered list of known formats. The first matching entry wins.
#[derive(Debug, Clone, Default)]
pub struct ReaderRegistry {
    entries: Vec<FormatEntry>,
}

impl ReaderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every format built into this crate.
    pub fn with_default_formats() -> Self {
        let mut registry = Self::new();
        registry.register(FormatEntry {
            name: fake::FORMAT_NAME,
            suffixes: &[fake::SUFFIX, "fake.ini"],
            constructor: new_fake_reader,
        });
        registry
    }

    /// Append a format. Earlier registrations take precedence.
    pub fn register(&mut self, entry: FormatEntry) -> &mut Self {
        debug!(format = entry.name, suffixes = ?entry.suffixes, "registering format");
        self.entries.push(entry);
        self
    }

    pub fn entries(&self) -> &[FormatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the first entry accepting `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.matches(id))
    }

    /// First entry accepting `id`.
    pub fn find(&self, id: &str) -> Option<&FormatEntry> {
        self.position(id).map(|i| &self.entries[i])
    }

    /// A new, closed reader for `id`.
    ///
    /// # Errors
    ///
    /// [`ReaderError::UnknownFormat`] if no entry accepts `id`.
    pub fn create_reader(&self, id: &str) -> ReaderResult<Box<dyn PlaneReader>> {
        let entry = self
            .find(id)
            .ok_or_else(|| ReaderError::UnknownFormat(id.to_string()))?;
        Ok((entry.constructor)())
    }
}

// =============================================================================
// ImageReader
// =============================================================================

/// Format name reported while no id is open.
const IDLE_FORMAT_NAME: &str = "Image reader";

/// A [`PlaneReader`] that picks the registered format matching each id.
///
/// Status listeners are registered with every format reader. A metadata
/// store set while no id is open is handed to the reader selected by the
/// next `set_id`; while an id is open it goes straight to the active
/// reader.
pub struct ImageReader {
    registry: ReaderRegistry,
    /// One reader per registry entry, in registry order
    readers: Vec<Box<dyn PlaneReader>>,
    /// Index of the reader serving the current id
    current: Option<usize>,
    pending_store: Option<Box<dyn MetadataStore>>,
}

impl Default for ImageReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader {
    /// A reader over [`ReaderRegistry::with_default_formats`].
    pub fn new() -> Self {
        Self::with_registry(ReaderRegistry::with_default_formats())
    }

    pub fn with_registry(registry: ReaderRegistry) -> Self {
        let readers = registry
            .entries()
            .iter()
            .map(|entry| (entry.constructor)())
            .collect();
        Self {
            registry,
            readers,
            current: None,
            pending_store: None,
        }
    }

    pub fn registry(&self) -> &ReaderRegistry {
        &self.registry
    }

    /// The format reader serving the current id.
    pub fn reader(&self) -> ReaderResult<&dyn PlaneReader> {
        let index = self.current.ok_or(ReaderError::NoCurrentFile)?;
        Ok(&*self.readers[index])
    }

    fn reader_mut(&mut self) -> ReaderResult<&mut dyn PlaneReader> {
        let index = self.current.ok_or(ReaderError::NoCurrentFile)?;
        Ok(&mut *self.readers[index])
    }
}

impl PlaneReader for ImageReader {
    fn format_name(&self) -> &str {
        match self.reader() {
            Ok(reader) => reader.format_name(),
            Err(_) => IDLE_FORMAT_NAME,
        }
    }

    fn set_id(&mut self, id: &str) -> ReaderResult<()> {
        let index = self
            .registry
            .position(id)
            .ok_or_else(|| ReaderError::UnknownFormat(id.to_string()))?;

        if let Some(previous) = self.current {
            if previous != index {
                self.readers[previous].close()?;
            }
        }
        self.current = None;

        let reader = &mut self.readers[index];
        if let Some(store) = self.pending_store.take() {
            reader.set_metadata_store(store);
        }
        reader.set_id(id)?;
        info!(id, format = reader.format_name(), "selected format reader");
        self.current = Some(index);
        Ok(())
    }

    fn close(&mut self) -> ReaderResult<()> {
        if let Some(index) = self.current.take() {
            self.readers[index].close()?;
        }
        Ok(())
    }

    fn current_file(&self) -> Option<&str> {
        self.reader().ok()?.current_file()
    }

    fn series_count(&self) -> ReaderResult<usize> {
        self.reader()?.series_count()
    }

    fn series(&self) -> usize {
        self.reader().map(|reader| reader.series()).unwrap_or(0)
    }

    fn set_series(&mut self, series: usize) -> ReaderResult<()> {
        self.reader_mut()?.set_series(series)
    }

    fn core(&self) -> ReaderResult<CoreMetadata> {
        self.reader()?.core()
    }

    fn open_bytes(&mut self, no: usize) -> ReaderResult<Vec<u8>> {
        self.reader_mut()?.open_bytes(no)
    }

    fn lookup_table(&self) -> Option<&LookupTable> {
        self.reader().ok()?.lookup_table()
    }

    fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>) {
        for reader in &mut self.readers {
            reader.add_status_listener(Arc::clone(&listener));
        }
    }

    fn remove_status_listener(&mut self, listener: &Arc<dyn StatusListener>) {
        for reader in &mut self.readers {
            reader.remove_status_listener(listener);
        }
    }

    fn metadata_store(&self) -> &dyn MetadataStore {
        match (self.reader(), &self.pending_store) {
            (Ok(reader), _) => reader.metadata_store(),
            (Err(_), Some(store)) => &**store,
            (Err(_), None) => &DummyMetadata,
        }
    }

    fn metadata_store_mut(&mut self) -> &mut dyn MetadataStore {
        match self.current {
            Some(index) => self.readers[index].metadata_store_mut(),
            None => &mut **self
                .pending_store
                .get_or_insert_with(|| Box::new(DummyMetadata)),
        }
    }

    fn set_metadata_store(&mut self, store: Box<dyn MetadataStore>) {
        match self.current {
            Some(index) => self.readers[index].set_metadata_store(store),
            None => self.pending_store = Some(store),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
