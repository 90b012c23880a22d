//! Command-line configuration for the `plane-readers` binary.
//!
//! Every option can be given on the command line or through an environment
//! variable with the `PLANES_` prefix:
//!
//! - `PLANES_SERIES` - Series to inspect (default: 0)
//! - `PLANES_FILL` - Expand indexed palettes (default: false)
//! - `PLANES_SEPARATE` - Split packed channels into separate planes
//! - `PLANES_MERGE` - Pack separate channel planes together
//! - `PLANES_CACHE_PLANES` - Packed planes kept by the separator (default: 1)
//! - `PLANES_SWAP` - Reinterpret the dimension order
//! - `PLANES_SHUFFLE` - Present planes in a different order
//! - `PLANES_SEED` - Self-test random seed
//! - `PLANES_SIZE` - Self-test input size in bytes
//! - `PLANES_BLOCKS` - Self-test block count
//!
//! # Example
//!
//! ```text
//! plane-readers info 'test&sizeZ=3&sizeC=3&rgb=3.fake' --separate --minmax
//! plane-readers self-test --seed 42
//! ```

use std::ops::Range;

use clap::{Args, Parser, Subcommand};

use crate::codec::{DEFAULT_TEST_BLOCKS, DEFAULT_TEST_SIZE};
use crate::model::DimensionOrder;
use crate::wrappers::DEFAULT_PLANE_CACHE_CAPACITY;

// =============================================================================
// Default Values
// =============================================================================

/// Default self-test seed.
pub const DEFAULT_SEED: u64 = 0x5eed;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Plane Readers - random-access pixel planes through reader decorators.
#[derive(Parser, Debug, Clone)]
#[command(name = "plane-readers")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the geometry of an image and optionally read its planes.
    Info(InfoConfig),

    /// Run the codec self-test on seeded random data.
    SelfTest(SelfTestConfig),
}

/// Options of the `info` subcommand.
#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    /// Id of the image, e.g. `test&sizeZ=3.fake`.
    pub id: String,

    // =========================================================================
    // Reader Chain
    // =========================================================================
    /// Series to inspect.
    #[arg(long, default_value_t = 0, env = "PLANES_SERIES")]
    pub series: usize,

    /// Expand indexed palettes into real colour channels.
    #[arg(long, default_value_t = false, env = "PLANES_FILL")]
    pub fill: bool,

    /// Split packed channels into one plane per channel.
    #[arg(long, default_value_t = false, env = "PLANES_SEPARATE")]
    pub separate: bool,

    /// Pack separate channel planes into single planes.
    #[arg(long, default_value_t = false, env = "PLANES_MERGE")]
    pub merge: bool,

    /// Number of packed planes the separator keeps decoded.
    #[arg(long, default_value_t = DEFAULT_PLANE_CACHE_CAPACITY, env = "PLANES_CACHE_PLANES")]
    pub cache_planes: usize,

    /// Reinterpret the stored dimension order (e.g. `XYCZT`).
    #[arg(long, env = "PLANES_SWAP")]
    pub swap: Option<String>,

    /// Present planes in a different rasterisation order.
    #[arg(long, env = "PLANES_SHUFFLE")]
    pub shuffle: Option<String>,

    // =========================================================================
    // Pixel Access
    // =========================================================================
    /// Skip reading planes.
    #[arg(long, default_value_t = false)]
    pub no_pixels: bool,

    /// Planes to read, as `START..END` (END exclusive).
    #[arg(long)]
    pub range: Option<String>,

    /// Report minimum and maximum sample values of every plane read.
    #[arg(long, default_value_t = false)]
    pub minmax: bool,

    /// Print geometry as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}

impl InfoConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("an image id is required".to_string());
        }

        if self.separate && self.merge {
            return Err("--separate and --merge are mutually exclusive".to_string());
        }

        if self.cache_planes == 0 {
            return Err("cache_planes must be greater than 0".to_string());
        }

        if self.verbose && self.quiet {
            return Err("--verbose and --quiet are mutually exclusive".to_string());
        }

        for (flag, order) in [("--swap", &self.swap), ("--shuffle", &self.shuffle)] {
            if let Some(order) = order {
                DimensionOrder::parse(&order.to_ascii_uppercase())
                    .map_err(|e| format!("{}: {}", flag, e))?;
            }
        }

        self.plane_range()?;
        Ok(())
    }

    /// The `--range` option parsed, or `None` for every plane.
    pub fn plane_range(&self) -> Result<Option<Range<usize>>, String> {
        let Some(range) = &self.range else {
            return Ok(None);
        };
        let (start, end) = range
            .split_once("..")
            .ok_or_else(|| format!("--range '{}' must look like START..END", range))?;
        let start: usize = start
            .trim()
            .parse()
            .map_err(|_| format!("--range start '{}' is not a plane number", start))?;
        let end: usize = end
            .trim()
            .parse()
            .map_err(|_| format!("--range end '{}' is not a plane number", end))?;
        if start >= end {
            return Err(format!("--range {}..{} is empty", start, end));
        }
        Ok(Some(start..end))
    }
}

/// Options of the `self-test` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SelfTestConfig {
    /// Seed of the random input.
    #[arg(long, default_value_t = DEFAULT_SEED, env = "PLANES_SEED")]
    pub seed: u64,

    /// Input size in bytes.
    #[arg(long, default_value_t = DEFAULT_TEST_SIZE, env = "PLANES_SIZE")]
    pub size: usize,

    /// Number of blocks the input is split into.
    #[arg(long, default_value_t = DEFAULT_TEST_BLOCKS, env = "PLANES_BLOCKS")]
    pub blocks: usize,

    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl SelfTestConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.blocks == 0 {
            return Err("blocks must be greater than 0".to_string());
        }
        if self.blocks > self.size.max(1) {
            return Err(format!(
                "cannot split {} bytes into {} blocks",
                self.size, self.blocks
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
