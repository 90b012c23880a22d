//! Plane Readers - inspect images through the reader decorator chain.
//!
//! `info` opens an id, stacks the requested decorators and reports the
//! resulting geometry and plane contents. `self-test` exercises the LZW
//! codec on seeded random data.

use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plane_readers::{
    codec::{self_test, Compressor, LzwCodec},
    config::{Cli, Command, InfoConfig, SelfTestConfig},
    formats::ImageReader,
    io::unpack_bytes,
    model::{CoreMetadata, PixelType},
    reader::{PlaneReader, StatusEvent},
    store::PixelsStore,
    wrappers::{ChannelFiller, ChannelMerger, ChannelSeparator, DimensionSwapper},
    ReaderError,
};

/// Failures of a CLI command.
#[derive(Debug, thiserror::Error)]
enum CommandError {
    #[error(transparent)]
    Reader(#[from] ReaderError),

    #[error("Cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Info(config) => run_info(config),
        Command::SelfTest(config) => run_self_test(config),
    }
}

// =============================================================================
// Info Command
// =============================================================================

fn run_info(config: InfoConfig) -> ExitCode {
    init_logging(log_filter(config.verbose, config.quiet));

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match inspect(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Stack the decorators requested by `config` over an [`ImageReader`].
fn build_reader(config: &InfoConfig) -> DimensionSwapper<Box<dyn PlaneReader>> {
    let mut reader: Box<dyn PlaneReader> = Box::new(ImageReader::new());
    if config.fill {
        reader = Box::new(ChannelFiller::new(reader));
    }
    if config.separate {
        reader = Box::new(ChannelSeparator::with_cache_capacity(reader, config.cache_planes));
    } else if config.merge {
        reader = Box::new(ChannelMerger::new(reader));
    }
    DimensionSwapper::new(reader)
}

fn inspect(config: &InfoConfig) -> Result<(), CommandError> {
    let mut reader = build_reader(config);
    reader.add_status_listener(Arc::new(|event: &StatusEvent| {
        debug!(%event, "status");
    }));
    reader.set_metadata_store(Box::new(PixelsStore::new()));

    let start = Instant::now();
    reader.set_id(&config.id)?;
    info!(
        id = %config.id,
        format = reader.format_name(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "initialized"
    );

    reader.set_series(config.series)?;
    if let Some(order) = &config.swap {
        reader.swap_dimensions(&order.to_ascii_uppercase())?;
    }
    if let Some(order) = &config.shuffle {
        reader.set_output_order(&order.to_ascii_uppercase())?;
    }

    let core = reader.core()?;
    if config.json {
        let report = serde_json::json!({
            "id": config.id,
            "format": reader.format_name(),
            "seriesCount": reader.series_count()?,
            "series": config.series,
            "core": core,
            "pixels": reader.metadata_store().pixels(config.series),
        });
        println!("{}", to_json(&report)?);
    } else {
        print_core(&config.id, reader.format_name(), reader.series_count()?, config.series, &core);
    }

    if config.no_pixels {
        return Ok(());
    }

    // Already checked by `validate`.
    let range = match config.plane_range().ok().flatten() {
        Some(range) => range.start.min(core.image_count)..range.end.min(core.image_count),
        None => 0..core.image_count,
    };

    println!();
    println!("Reading planes {}..{}", range.start, range.end);
    let start = Instant::now();
    for no in range.clone() {
        let plane = reader.open_bytes(no)?;
        let (z, c, t) = reader.get_zct_coords(no)?;
        if config.minmax {
            match sample_range(&core, &plane) {
                Some((min, max)) => println!(
                    "  plane {:>4} (z={}, c={}, t={}): min={} max={}",
                    no, z, c, t, min, max
                ),
                None => println!("  plane {:>4} (z={}, c={}, t={}): empty", no, z, c, t),
            }
        }
    }
    let elapsed = start.elapsed();
    println!(
        "Read {} plane(s) in {:.1} ms",
        range.len(),
        elapsed.as_secs_f64() * 1000.0
    );
    Ok(())
}

fn print_core(id: &str, format: &str, series_count: usize, series: usize, core: &CoreMetadata) {
    println!("{}", id);
    println!("═════════════════════════════════");
    println!("Format:          {}", format);
    println!("Series:          {}/{}", series, series_count);
    println!("Width:           {}", core.size_x);
    println!("Height:          {}", core.size_y);
    println!("SizeZ:           {}", core.size_z);
    println!("SizeC:           {}", core.size_c);
    println!("SizeT:           {}", core.size_t);
    println!("Image count:     {}", core.image_count);
    println!("Dimension order: {}", core.dimension_order);
    println!("Pixel type:      {}", core.pixel_type);
    println!(
        "RGB:             {} ({} channel(s) per plane)",
        core.packed,
        core.rgb_channel_count()
    );
    println!("Interleaved:     {}", core.interleaved);
    println!("Little endian:   {}", core.little_endian);
    println!(
        "Indexed:         {}{}",
        core.indexed,
        if core.false_color { " (false colour)" } else { "" }
    );
}

/// Smallest and largest sample of `plane`, or `None` if it is empty.
fn sample_range(core: &CoreMetadata, plane: &[u8]) -> Option<(f64, f64)> {
    let bpp = core.pixel_type.bytes_per_pixel();
    let little = core.little_endian;
    plane
        .chunks_exact(bpp)
        .map(|bytes| sample_value(core.pixel_type, bytes, little))
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((min, max)) => Some((f64::min(min, v), f64::max(max, v))),
        })
}

fn sample_value(pixel_type: PixelType, bytes: &[u8], little: bool) -> f64 {
    let bits = unpack_bytes(bytes, little);
    match pixel_type {
        PixelType::Int8 => f64::from(bits as u8 as i8),
        PixelType::Uint8 => f64::from(bits as u8),
        PixelType::Int16 => f64::from(bits as u16 as i16),
        PixelType::Uint16 => f64::from(bits as u16),
        PixelType::Int32 => f64::from(bits as u32 as i32),
        PixelType::Uint32 => f64::from(bits as u32),
        PixelType::Float => f64::from(f32::from_bits(bits as u32)),
        PixelType::Double => f64::from_bits(bits),
    }
}

// =============================================================================
// Self-Test Command
// =============================================================================

fn run_self_test(config: SelfTestConfig) -> ExitCode {
    init_logging(log_filter(config.verbose, false));

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let codec = LzwCodec::new();
    match self_test(&codec, config.seed, config.size, config.blocks) {
        Ok(report) => {
            if config.json {
                match to_json(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("{}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                println!("✓ {} self-test passed", codec.name());
                println!("  Seed:       {:#x}", report.seed);
                println!("  Input:      {} bytes", report.input_len);
                println!("  Compressed: {} bytes ({:.3})", report.compressed_len, report.ratio());
                println!("  Blocks:     {}", report.blocks);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("✗ {} self-test failed", codec.name());
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Pretty-printed JSON of a report.
fn to_json<T: Serialize>(report: &T) -> Result<String, CommandError> {
    Ok(serde_json::to_string_pretty(report)?)
}

// =============================================================================
// Logging
// =============================================================================

/// Default filter directive for the given verbosity flags.
fn log_filter(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "plane_readers=error"
    } else if verbose {
        "plane_readers=debug"
    } else {
        "plane_readers=info"
    }
}

/// Initialize the tracing/logging subsystem. `RUST_LOG` overrides `filter`.
fn init_logging(filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Tests
// =============================================================================
