//! Decorator base.
//!
//! A decorator owns a wrapped reader and implements [`PlaneReader`] itself.
//! Operations it does not change are forwarded verbatim with
//! [`forward_to_reader!`], which expands to one forwarding method per name:
//!
//! ```ignore
//! impl<R: PlaneReader> PlaneReader for MyDecorator<R> {
//!     forward_to_reader!(format_name, current_file, series_count, series);
//!
//!     fn core(&self) -> ReaderResult<CoreMetadata> {
//!         // transformed descriptor
//!     }
//!     // ...
//! }
//! ```
//!
//! [`PlaneReader`]: super::PlaneReader

use super::plane::PlaneReader;

/// Access to the reader wrapped by a decorator.
pub trait ReaderWrapper {
    type Inner: PlaneReader;

    fn reader(&self) -> &Self::Inner;

    fn reader_mut(&mut self) -> &mut Self::Inner;

    /// Unwrap the decorator, returning the wrapped reader.
    fn into_reader(self) -> Self::Inner;
}

/// Expand to `PlaneReader` methods that forward to `ReaderWrapper::reader`.
///
/// Accepts any subset of the required `PlaneReader` methods by name.
macro_rules! forward_to_reader {
    ($($method:ident),+ $(,)?) => {
        $( $crate::reader::forward_to_reader!(@one $method); )+
    };

    (@one format_name) => {
        fn format_name(&self) -> &str {
            $crate::reader::PlaneReader::format_name($crate::reader::ReaderWrapper::reader(self))
        }
    };
    (@one set_id) => {
        fn set_id(&mut self, id: &str) -> $crate::error::ReaderResult<()> {
            $crate::reader::PlaneReader::set_id($crate::reader::ReaderWrapper::reader_mut(self), id)
        }
    };
    (@one close) => {
        fn close(&mut self) -> $crate::error::ReaderResult<()> {
            $crate::reader::PlaneReader::close($crate::reader::ReaderWrapper::reader_mut(self))
        }
    };
    (@one current_file) => {
        fn current_file(&self) -> Option<&str> {
            $crate::reader::PlaneReader::current_file($crate::reader::ReaderWrapper::reader(self))
        }
    };
    (@one series_count) => {
        fn series_count(&self) -> $crate::error::ReaderResult<usize> {
            $crate::reader::PlaneReader::series_count($crate::reader::ReaderWrapper::reader(self))
        }
    };
    (@one series) => {
        fn series(&self) -> usize {
            $crate::reader::PlaneReader::series($crate::reader::ReaderWrapper::reader(self))
        }
    };
    (@one set_series) => {
        fn set_series(&mut self, series: usize) -> $crate::error::ReaderResult<()> {
            $crate::reader::PlaneReader::set_series(
                $crate::reader::ReaderWrapper::reader_mut(self),
                series,
            )
        }
    };
    (@one core) => {
        fn core(&self) -> $crate::error::ReaderResult<$crate::model::CoreMetadata> {
            $crate::reader::PlaneReader::core($crate::reader::ReaderWrapper::reader(self))
        }
    };
    (@one open_bytes) => {
        fn open_bytes(&mut self, no: usize) -> $crate::error::ReaderResult<Vec<u8>> {
            $crate::reader::PlaneReader::open_bytes($crate::reader::ReaderWrapper::reader_mut(self), no)
        }
    };
    (@one lookup_table) => {
        fn lookup_table(&self) -> Option<&$crate::model::LookupTable> {
            $crate::reader::PlaneReader::lookup_table($crate::reader::ReaderWrapper::reader(self))
        }
    };
    (@one add_status_listener) => {
        fn add_status_listener(
            &mut self,
            listener: std::sync::Arc<dyn $crate::reader::StatusListener>,
        ) {
            $crate::reader::PlaneReader::add_status_listener(
                $crate::reader::ReaderWrapper::reader_mut(self),
                listener,
            )
        }
    };
    (@one remove_status_listener) => {
        fn remove_status_listener(
            &mut self,
            listener: &std::sync::Arc<dyn $crate::reader::StatusListener>,
        ) {
            $crate::reader::PlaneReader::remove_status_listener(
                $crate::reader::ReaderWrapper::reader_mut(self),
                listener,
            )
        }
    };
    (@one metadata_store) => {
        fn metadata_store(&self) -> &dyn $crate::store::MetadataStore {
            $crate::reader::PlaneReader::metadata_store($crate::reader::ReaderWrapper::reader(self))
        }
    };
    (@one metadata_store_mut) => {
        fn metadata_store_mut(&mut self) -> &mut dyn $crate::store::MetadataStore {
            $crate::reader::PlaneReader::metadata_store_mut(
                $crate::reader::ReaderWrapper::reader_mut(self),
            )
        }
    };
    (@one set_metadata_store) => {
        fn set_metadata_store(&mut self, store: Box<dyn $crate::store::MetadataStore>) {
            $crate::reader::PlaneReader::set_metadata_store(
                $crate::reader::ReaderWrapper::reader_mut(self),
                store,
            )
        }
    };
}

pub(crate) use forward_to_reader;
