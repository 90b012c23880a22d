//! Format registry integration tests.
//!
//! Tests verify:
//! - ImageReader dispatches by id suffix
//! - Custom formats can be registered alongside the built-in ones
//! - Decorators compose over the dispatching reader

use plane_readers::formats::{FormatEntry, ImageReader, ReaderRegistry};
use plane_readers::model::DimensionOrder;
use plane_readers::reader::PlaneReader;
use plane_readers::store::PixelsStore;
use plane_readers::wrappers::{ChannelSeparator, DimensionSwapper};
use plane_readers::ReaderError;

use super::test_utils::{packed_core, StubReader};

fn new_stub_reader() -> Box<dyn PlaneReader> {
    Box::new(StubReader::patterned(packed_core(
        3,
        true,
        DimensionOrder::XYZCT,
        2,
        1,
    )))
}

fn registry_with_stub() -> ReaderRegistry {
    let mut registry = ReaderRegistry::with_default_formats();
    registry.register(FormatEntry {
        name: "stub",
        suffixes: &["stub"],
        constructor: new_stub_reader,
    });
    registry
}

#[test]
fn test_dispatch_by_suffix() {
    let mut reader = ImageReader::with_registry(registry_with_stub());

    reader.set_id("image.stub").unwrap();
    assert_eq!(reader.format_name(), "stub");
    assert_eq!(reader.image_count().unwrap(), 2);

    reader.set_id("test&sizeZ=4&sizeX=8&sizeY=8.fake").unwrap();
    assert_eq!(reader.format_name(), "Simulated data");
    assert_eq!(reader.image_count().unwrap(), 4);
}

#[test]
fn test_unknown_suffix() {
    let mut reader = ImageReader::new();
    let err = reader.set_id("image.stub").unwrap_err();
    assert!(matches!(err, ReaderError::UnknownFormat(ref id) if id == "image.stub"));
    assert!(reader.current_file().is_none());
}

#[test]
fn test_create_reader() {
    let registry = registry_with_stub();
    assert_eq!(registry.len(), 2);
    let mut reader = registry.create_reader("x.STUB").unwrap();
    assert_eq!(reader.format_name(), "stub");
    assert!(matches!(reader.core(), Err(ReaderError::NoCurrentFile)));
    reader.set_id("x.STUB").unwrap();
    assert!(reader.is_packed().unwrap());
}

#[test]
fn test_decorators_over_image_reader() {
    let mut chain = DimensionSwapper::new(ChannelSeparator::new(ImageReader::with_registry(
        registry_with_stub(),
    )));
    chain.set_metadata_store(Box::new(PixelsStore::new()));
    chain.set_id("image.stub").unwrap();

    assert_eq!(chain.image_count().unwrap(), 6);
    chain.set_output_order("XYCTZ").unwrap();
    assert_eq!(chain.dimension_order().unwrap(), DimensionOrder::XYCTZ);
    assert_eq!(chain.open_bytes(5).unwrap().len(), chain.plane_size().unwrap());
    assert!(chain.metadata_store().pixels(0).is_some());
}
