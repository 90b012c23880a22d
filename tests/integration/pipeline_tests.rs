//! Decorator pipeline integration tests.
//!
//! Tests verify:
//! - The index algebra round trips for every dimension order
//! - Separating then merging reconstructs packed planes
//! - The separator decodes each packed plane once
//! - Palette expansion, dimension swapping and output reordering
//! - Out-of-range planes, regions and malformed orders are rejected at
//!   every layer

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use plane_readers::model::{
    get_index, get_zct_coords, CoreMetadata, DimensionOrder, LookupTable, PixelType,
};
use plane_readers::reader::{PlaneReader, ReaderWrapper, StatusEvent, StatusListener};
use plane_readers::store::PixelsStore;
use plane_readers::wrappers::{ChannelFiller, ChannelMerger, ChannelSeparator, DimensionSwapper};
use plane_readers::{FakeReader, ReaderError};

use super::test_utils::{opened, packed_core, planar_core, StubReader, StubSeries};

const ALL_ORDERS: [DimensionOrder; 6] = [
    DimensionOrder::XYZCT,
    DimensionOrder::XYZTC,
    DimensionOrder::XYCZT,
    DimensionOrder::XYCTZ,
    DimensionOrder::XYTZC,
    DimensionOrder::XYTCZ,
];

// =============================================================================
// Index Algebra
// =============================================================================

#[test]
fn test_index_round_trip_every_order() {
    for order in ALL_ORDERS {
        for (sz, sc, st) in [(1, 1, 1), (3, 2, 4), (1, 5, 2), (4, 1, 3), (2, 3, 1)] {
            let count = sz * sc * st;
            let mut seen = vec![false; count];
            for z in 0..sz {
                for c in 0..sc {
                    for t in 0..st {
                        let no = get_index(order, sz, sc, st, count, z, c, t).unwrap();
                        assert!(!seen[no], "{} maps two coordinates to {}", order, no);
                        seen[no] = true;
                        assert_eq!(get_zct_coords(order, sz, sc, st, count, no).unwrap(), (z, c, t));
                    }
                }
            }
            assert!(seen.into_iter().all(|s| s));
        }
    }
}

#[test]
fn test_index_rejects_bad_input() {
    let order = DimensionOrder::XYZCT;
    assert!(matches!(
        get_index(order, 2, 2, 2, 7, 0, 0, 0),
        Err(ReaderError::FormatInconsistency(_))
    ));
    assert!(matches!(
        get_index(order, 2, 2, 2, 8, 0, 2, 0),
        Err(ReaderError::InvalidCoordinate { axis: 'C', value: 2, size: 2 })
    ));
    assert!(matches!(
        get_zct_coords(order, 2, 2, 2, 8, 8),
        Err(ReaderError::InvalidPlaneIndex { index: 8, image_count: 8 })
    ));
}

#[test]
fn test_orders_must_lead_with_xy() {
    for bad in ["ZCTXY", "XZYCT", "XYZZT", "XYZC", "XYZCTT"] {
        assert!(matches!(
            DimensionOrder::parse(bad),
            Err(ReaderError::InvalidDimensionOrder { .. })
        ));
    }
}

// =============================================================================
// Channel Separator / Merger
// =============================================================================

#[test]
fn test_separate_then_merge_reconstructs() {
    for channels in [3, 4] {
        for interleaved in [true, false] {
            for order in ALL_ORDERS {
                let core = packed_core(channels, interleaved, order, 2, 3);
                let mut original = opened(StubReader::patterned(core));
                let mut round_trip = opened(ChannelMerger::new(ChannelSeparator::new(
                    StubReader::patterned(core),
                )));

                assert_eq!(round_trip.image_count().unwrap(), core.image_count);
                assert!(round_trip.is_packed().unwrap());
                assert_eq!(round_trip.rgb_channel_count().unwrap(), channels);
                for no in 0..core.image_count {
                    assert_eq!(
                        round_trip.open_bytes(no).unwrap(),
                        original.open_bytes(no).unwrap(),
                        "channels={} interleaved={} order={} plane={}",
                        channels,
                        interleaved,
                        order,
                        no
                    );
                }
            }
        }
    }
}

#[test]
fn test_separator_decodes_each_packed_plane_once() {
    let core = packed_core(3, true, DimensionOrder::XYZCT, 2, 1);
    let stub = StubReader::patterned(core);
    let opens = stub.open_counter();
    let mut separator = opened(ChannelSeparator::new(stub));

    assert_eq!(separator.image_count().unwrap(), 6);
    assert_eq!(separator.dimension_order().unwrap(), DimensionOrder::XYCZT);
    assert!(!separator.is_packed().unwrap());
    assert_eq!(separator.plane_size().unwrap(), 5 * 3 * 2);

    for no in 0..6 {
        separator.open_bytes(no).unwrap();
    }
    assert_eq!(opens.load(Ordering::SeqCst), 2);
    assert_eq!(separator.cache().hits(), 4);
}

#[test]
fn test_separator_close_propagates() {
    let core = packed_core(3, false, DimensionOrder::XYZCT, 1, 1);
    let stub = StubReader::patterned(core);
    let closes = stub.close_counter();
    let opens = stub.open_counter();
    let mut separator = opened(ChannelSeparator::new(stub));

    separator.open_bytes(0).unwrap();
    separator.close().unwrap();
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert!(separator.current_file().is_none());

    // Cache was dropped with the file.
    separator.set_id("stub").unwrap();
    separator.open_bytes(1).unwrap();
    assert_eq!(opens.load(Ordering::SeqCst), 2);
}

#[test]
fn test_merger_leaves_unmergeable_series() {
    let core = planar_core(DimensionOrder::XYZCT, 2, 5, 1);
    let mut merger = opened(ChannelMerger::new(StubReader::patterned(core)));
    assert!(!merger.can_merge().unwrap());
    assert_eq!(merger.image_count().unwrap(), 10);
    assert_eq!(merger.open_bytes(9).unwrap().len(), 8);
}

// =============================================================================
// Channel Filler
// =============================================================================

#[test]
fn test_filler_expands_palette() {
    let core = CoreMetadata {
        indexed: true,
        interleaved: true,
        ..CoreMetadata::new(4, 1, PixelType::Uint8)
    };
    let lut = LookupTable::Bits8(vec![vec![10, 40], vec![20, 50], vec![30, 60]]);
    let reader = StubReader::new(vec![StubSeries {
        core,
        planes: vec![vec![0, 1, 0, 1]],
    }])
    .with_lut(lut);
    let mut filler = opened(ChannelFiller::new(reader));

    assert_eq!(
        filler.open_bytes(0).unwrap(),
        vec![10, 20, 30, 40, 50, 60, 10, 20, 30, 40, 50, 60]
    );
    assert!(filler.lookup_table().is_none());
    assert_eq!(filler.size_c().unwrap(), 3);
}

// =============================================================================
// Dimension Swapper
// =============================================================================

#[test]
fn test_swap_relabels_sizes() {
    let core = planar_core(DimensionOrder::XYCZT, 3, 2, 5);
    let mut swapper = opened(DimensionSwapper::new(StubReader::patterned(core)));
    swapper.set_metadata_store(Box::new(PixelsStore::new()));

    swapper.swap_dimensions("XYZCT").unwrap();
    assert_eq!(swapper.dimension_order().unwrap(), DimensionOrder::XYZCT);
    assert_eq!(swapper.size_z().unwrap(), 2);
    assert_eq!(swapper.size_c().unwrap(), 3);
    assert_eq!(swapper.size_t().unwrap(), 5);
    assert_eq!(swapper.image_count().unwrap(), 30);

    let published = swapper.metadata_store().pixels(0).unwrap();
    assert_eq!((published.size_z, published.size_c), (2, 3));
}

#[test]
fn test_swap_to_same_order_is_noop() {
    let core = planar_core(DimensionOrder::XYCZT, 3, 2, 5);
    let mut swapper = opened(DimensionSwapper::new(StubReader::patterned(core)));
    let before = swapper.core().unwrap();
    swapper.swap_dimensions("XYCZT").unwrap();
    assert_eq!(swapper.core().unwrap(), before);
}

#[test]
fn test_swap_rejects_bad_orders() {
    let core = planar_core(DimensionOrder::XYZCT, 2, 1, 1);
    let mut swapper = opened(DimensionSwapper::new(StubReader::patterned(core)));
    assert!(matches!(
        swapper.swap_dimensions("ZCTXY"),
        Err(ReaderError::InvalidDimensionOrder { .. })
    ));

    let packed = packed_core(3, true, DimensionOrder::XYZCT, 2, 1);
    let mut swapper = opened(DimensionSwapper::new(StubReader::patterned(packed)));
    assert!(matches!(
        swapper.swap_dimensions("XYCZT"),
        Err(ReaderError::InvalidDimensionOrder { .. })
    ));
}

#[test]
fn test_output_order_reads_same_coordinates() {
    let core = planar_core(DimensionOrder::XYZCT, 2, 3, 4);
    let mut plain = opened(StubReader::patterned(core));
    let mut swapper = opened(DimensionSwapper::new(StubReader::patterned(core)));
    swapper.set_output_order("XYTCZ").unwrap();

    assert_eq!(swapper.dimension_order().unwrap(), DimensionOrder::XYTCZ);
    assert_eq!(swapper.input_order().unwrap(), DimensionOrder::XYZCT);
    for no in 0..core.image_count {
        let (z, c, t) = swapper.get_zct_coords(no).unwrap();
        let source = plain.get_index(z, c, t).unwrap();
        assert_eq!(swapper.open_bytes(no).unwrap(), plain.open_bytes(source).unwrap());
    }
}

// =============================================================================
// Whole Chain
// =============================================================================

#[test]
fn test_invalid_plane_index_at_every_layer() {
    let core = packed_core(3, true, DimensionOrder::XYZCT, 2, 1);

    let mut separator = opened(ChannelSeparator::new(StubReader::patterned(core)));
    assert!(matches!(
        separator.open_bytes(6),
        Err(ReaderError::InvalidPlaneIndex { index: 6, image_count: 6 })
    ));

    let mut merger = opened(ChannelMerger::new(ChannelSeparator::new(StubReader::patterned(core))));
    assert!(matches!(
        merger.open_bytes(2),
        Err(ReaderError::InvalidPlaneIndex { index: 2, image_count: 2 })
    ));

    let mut swapper = opened(DimensionSwapper::new(StubReader::patterned(core)));
    assert!(matches!(
        swapper.open_bytes(2),
        Err(ReaderError::InvalidPlaneIndex { index: 2, image_count: 2 })
    ));
}

#[test]
fn test_region_outside_plane_is_rejected() {
    let mut reader = FakeReader::new();
    reader.set_id("region&sizeX=4&sizeY=4.fake").unwrap();
    assert_eq!(reader.open_bytes_region(0, 1, 1, 2, 2).unwrap().len(), 4);

    let mut swapper = DimensionSwapper::new(reader);
    swapper.set_id("region&sizeX=4&sizeY=4.fake").unwrap();
    for (x, y) in [(usize::MAX, 0), (0, usize::MAX), (3, 0)] {
        assert!(matches!(
            swapper.open_bytes_region(0, x, y, 2, 1),
            Err(ReaderError::FormatInconsistency(_))
        ));
    }
}

#[test]
fn test_fake_reader_full_chain() {
    let id = "chain&sizeX=16&sizeY=12&sizeZ=2&sizeC=2&indexed=true.fake";
    let fake = FakeReader::new();
    let filler: Box<dyn PlaneReader> = Box::new(ChannelFiller::new(fake));
    let separator: Box<dyn PlaneReader> = Box::new(ChannelSeparator::new(filler));
    let mut chain = DimensionSwapper::new(separator);
    chain.set_id(id).unwrap();

    // Two indexed channels, each filled to three palette channels.
    assert_eq!(chain.size_c().unwrap(), 6);
    assert_eq!(chain.image_count().unwrap(), 12);
    assert!(!chain.is_indexed().unwrap());
    assert!(chain.lookup_table().is_none());

    // Every separated channel reproduces the plain gradient.
    let mut plain = FakeReader::new();
    plain
        .set_id(&id.replace("&indexed=true", ""))
        .unwrap();
    let expected = plain.open_bytes(0).unwrap();
    for c in 0..3 {
        let no = chain.get_index(0, c, 0).unwrap();
        let plane = chain.open_bytes(no).unwrap();
        let row = 11 * 16;
        assert_eq!(&plane[row..row + 16], &expected[row..row + 16]);
    }

    chain.close().unwrap();
    assert!(chain.current_file().is_none());
    assert!(matches!(chain.core(), Err(ReaderError::NoCurrentFile)));
}

#[test]
fn test_status_listeners_reach_leaf() {
    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let listener: Arc<dyn StatusListener> = Arc::new(move |event: &StatusEvent| {
        sink.lock().unwrap().push(event.to_string());
    });

    let core = planar_core(DimensionOrder::XYZCT, 1, 1, 1);
    let mut chain = DimensionSwapper::new(ChannelSeparator::new(StubReader::patterned(core)));
    chain.add_status_listener(Arc::clone(&listener));
    chain.set_id("first").unwrap();
    assert_eq!(events.lock().unwrap().len(), 1);

    chain.remove_status_listener(&listener);
    chain.set_id("second").unwrap();
    assert_eq!(events.lock().unwrap().len(), 1);

    // The wrapped reader is still reachable through the decorators.
    assert_eq!(chain.reader().reader().current_file(), Some("second"));
}
