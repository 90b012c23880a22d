//! Synthetic images described entirely by their id.
//!
//! An id such as `test&sizeZ=3&sizeC=2&pixelType=uint16.fake` names the
//! geometry of the image to simulate; no file needs to exist. Tokens are
//! separated by `&`, the first one is a free-form name and every other
//! token is a `key=value` pair:
//!
//! | key           | default  | meaning                                    |
//! |---------------|----------|--------------------------------------------|
//! | `sizeX/sizeY` | 512      | plane width and height                     |
//! | `sizeZ/C/T`   | 1        | axis sizes                                 |
//! | `pixelType`   | `uint8`  | sample type                                |
//! | `rgb`         | 1        | channels packed into each plane            |
//! | `dimOrder`    | `XYZCT`  | dimension order                            |
//! | `little`      | `true`   | byte order of multi-byte samples           |
//! | `interleaved` | `false`  | packed channel layout                      |
//! | `indexed`     | `false`  | samples are palette indices                |
//! | `falseColor`  | `false`  | palette is pseudo-colour                   |
//! | `series`      | 1        | number of identical series                 |
//! | `lutLength`   | 3        | palette channels (1, 3 or 4)               |
//! | `scaleFactor` | 1.0      | multiplier applied to gradient values      |
//!
//! If a file named `<id>.ini` exists, its `key = value` lines (up to the
//! first `[section]` header) are appended to the tokens and override values
//! from the id.
//!
//! # Pixel content
//!
//! Each row is a horizontal gradient starting at the minimum of the pixel
//! type. The first [`BOX_SIZE`] rows hold a header of boxes, each
//! [`BOX_SIZE`] pixels wide, whose values are the series, plane number, Z,
//! channel and T of the plane, in that order.
//!
//! Indexed 8- and 16-bit images store palette indices. Each channel has its
//! own palette, a seeded shuffle of the identity ramp, and samples are
//! stored as the index that maps back to the gradient value. Expanding the
//! palette therefore reproduces the plain gradient.

use std::path::Path;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::error::{ReaderError, ReaderResult};
use crate::io::{pack_bytes, ByteSource, FileSource};
use crate::model::{CoreMetadata, DimensionOrder, LookupTable, PixelType};
use crate::reader::{check_series, PlaneReader, StatusListener, StatusReporter};
use crate::store::{DummyMetadata, MetadataStore, PixelsMetadata};

/// Human-readable format name.
pub const FORMAT_NAME: &str = "Simulated data";

/// Suffix of synthetic ids, without the dot.
pub const SUFFIX: &str = "fake";

/// Width and height of the header boxes, in pixels.
pub const BOX_SIZE: usize = 10;

/// Base seed of the per-channel palette shuffles.
const PALETTE_SEED: u64 = 0xcafe_babe;

const DEFAULT_PLANE_SIZE: usize = 512;

// =============================================================================
// FakeParams
// =============================================================================

/// Geometry and layout parsed from a synthetic id.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeParams {
    /// First token of the id
    pub name: String,
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub size_c: usize,
    pub size_t: usize,
    pub pixel_type: PixelType,
    /// Channels packed into each plane
    pub rgb: usize,
    pub dimension_order: DimensionOrder,
    pub little_endian: bool,
    pub interleaved: bool,
    pub indexed: bool,
    pub false_color: bool,
    pub series_count: usize,
    /// Number of channels of each palette
    pub lut_length: usize,
    pub scale_factor: f64,
}

impl Default for FakeParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            size_x: DEFAULT_PLANE_SIZE,
            size_y: DEFAULT_PLANE_SIZE,
            size_z: 1,
            size_c: 1,
            size_t: 1,
            pixel_type: PixelType::Uint8,
            rgb: 1,
            dimension_order: DimensionOrder::XYZCT,
            little_endian: true,
            interleaved: false,
            indexed: false,
            false_color: false,
            series_count: 1,
            lut_length: 3,
            scale_factor: 1.0,
        }
    }
}

impl FakeParams {
    /// Parse and validate a synthetic id, reading its `.ini` companion if
    /// one exists.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::InvalidId`] if the id lacks the `.fake` suffix, a
    ///   value does not parse, or the geometry is inconsistent
    /// - [`ReaderError::InvalidDimensionOrder`] for a malformed `dimOrder`
    pub fn parse(id: &str) -> ReaderResult<Self> {
        let base = strip_suffix_ignore_case(id, ".ini")
            .filter(|base| has_fake_suffix(base))
            .unwrap_or(id);
        if !has_fake_suffix(base) {
            return Err(ReaderError::invalid_id(
                id,
                format!("expected a .{} suffix", SUFFIX),
            ));
        }

        let file_name = Path::new(base)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(base);
        let stem = &file_name[..file_name.len() - SUFFIX.len() - 1];
        let mut tokens: Vec<String> = stem.split('&').map(str::to_string).collect();

        let companion = format!("{}.ini", base);
        if Path::new(&companion).is_file() {
            debug!(companion = %companion, "reading companion settings");
            let text = read_companion(id, &companion)?;
            tokens.extend(ini_tokens(&text));
        }

        let params = Self::from_tokens(id, &tokens)?;
        params.validate(id)?;
        Ok(params)
    }

    fn from_tokens(id: &str, tokens: &[String]) -> ReaderResult<Self> {
        let mut params = FakeParams::default();
        let Some((name, pairs)) = tokens.split_first() else {
            return Ok(params);
        };
        params.name = name.clone();

        for token in pairs {
            let Some((key, value)) = token.split_once('=') else {
                warn!(token = %token, "ignoring token without '='");
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "sizeX" => params.size_x = parse_count(id, key, value)?,
                "sizeY" => params.size_y = parse_count(id, key, value)?,
                "sizeZ" => params.size_z = parse_count(id, key, value)?,
                "sizeC" => params.size_c = parse_count(id, key, value)?,
                "sizeT" => params.size_t = parse_count(id, key, value)?,
                "rgb" => params.rgb = parse_count(id, key, value)?,
                "series" => params.series_count = parse_count(id, key, value)?,
                "lutLength" => params.lut_length = parse_count(id, key, value)?,
                "pixelType" => {
                    params.pixel_type = value.parse().map_err(|_| {
                        ReaderError::invalid_id(id, format!("unknown pixel type '{}'", value))
                    })?
                }
                "dimOrder" => {
                    params.dimension_order = DimensionOrder::parse(&value.to_ascii_uppercase())?
                }
                "little" => params.little_endian = parse_flag(value),
                "interleaved" => params.interleaved = parse_flag(value),
                "indexed" => params.indexed = parse_flag(value),
                "falseColor" => params.false_color = parse_flag(value),
                "scaleFactor" => {
                    params.scale_factor = value.parse().map_err(|_| {
                        ReaderError::invalid_id(id, format!("scaleFactor '{}' is not a number", value))
                    })?
                }
                _ => warn!(key, value, "ignoring unknown key"),
            }
        }
        Ok(params)
    }

    fn validate(&self, id: &str) -> ReaderResult<()> {
        let sizes = [
            ("sizeX", self.size_x),
            ("sizeY", self.size_y),
            ("sizeZ", self.size_z),
            ("sizeC", self.size_c),
            ("sizeT", self.size_t),
            ("rgb", self.rgb),
            ("series", self.series_count),
        ];
        for (key, value) in sizes {
            if value == 0 {
                return Err(ReaderError::invalid_id(id, format!("{} must be positive", key)));
            }
        }
        if self.rgb > self.size_c || self.size_c % self.rgb != 0 {
            return Err(ReaderError::invalid_id(
                id,
                format!("sizeC {} is not a multiple of rgb {}", self.size_c, self.rgb),
            ));
        }
        if self.false_color && !self.indexed {
            return Err(ReaderError::invalid_id(id, "falseColor requires indexed"));
        }
        if !matches!(self.lut_length, 1 | 3 | 4) {
            return Err(ReaderError::invalid_id(
                id,
                format!("lutLength must be 1, 3 or 4, got {}", self.lut_length),
            ));
        }

        let too_large = || ReaderError::invalid_id(id, "image dimensions are too large");
        self.size_z
            .checked_mul(self.size_c / self.rgb)
            .and_then(|n| n.checked_mul(self.size_t))
            .ok_or_else(too_large)?;
        self.size_x
            .checked_mul(self.size_y)
            .and_then(|n| n.checked_mul(self.rgb))
            .and_then(|n| n.checked_mul(self.pixel_type.bytes_per_pixel()))
            .ok_or_else(too_large)?;
        Ok(())
    }

    /// Descriptor shared by every series.
    pub fn core(&self) -> CoreMetadata {
        CoreMetadata {
            size_x: self.size_x,
            size_y: self.size_y,
            size_z: self.size_z,
            size_c: self.size_c,
            size_t: self.size_t,
            dimension_order: self.dimension_order,
            pixel_type: self.pixel_type,
            image_count: self.size_z * (self.size_c / self.rgb) * self.size_t,
            packed: self.rgb > 1,
            interleaved: self.interleaved,
            little_endian: self.little_endian,
            indexed: self.indexed,
            false_color: self.false_color,
        }
    }
}

fn has_fake_suffix(id: &str) -> bool {
    strip_suffix_ignore_case(id, &format!(".{}", SUFFIX)).is_some()
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if s.is_char_boundary(split) && s[split..].eq_ignore_ascii_case(suffix) {
        Some(&s[..split])
    } else {
        None
    }
}

/// Text of the `.ini` companion of `id`.
fn read_companion(id: &str, path: &str) -> ReaderResult<String> {
    let mut source = FileSource::open(path)?;
    let len = usize::try_from(source.length())
        .map_err(|_| ReaderError::invalid_id(id, "companion file is too large"))?;
    let bytes = source.read_exact_at(0, len)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| ReaderError::invalid_id(id, "companion file is not UTF-8 text"))
}

/// `key=value` tokens from the leading, unnamed section of an ini file.
fn ini_tokens(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with('['))
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with(';'))
        .map(|line| match line.split_once('=') {
            Some((key, value)) => format!("{}={}", key.trim(), value.trim()),
            None => line.to_string(),
        })
        .collect()
}

fn parse_count(id: &str, key: &str, value: &str) -> ReaderResult<usize> {
    value.parse().map_err(|_| {
        ReaderError::invalid_id(
            id,
            format!("{} must be a non-negative integer, got '{}'", key, value),
        )
    })
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

// =============================================================================
// Palettes
// =============================================================================

/// Per-channel palettes of an indexed image.
struct Palettes {
    /// Palette handed out while channel `c` is active
    luts: Vec<LookupTable>,
    /// Inverse of each palette: gradient value to stored index
    value_to_index: Vec<Vec<usize>>,
}

impl Palettes {
    /// Palettes for `params`, or `None` when samples are not 8- or 16-bit
    /// palette indices.
    fn build(params: &FakeParams) -> Option<Self> {
        if !params.indexed {
            return None;
        }
        let entries = match params.pixel_type {
            PixelType::Uint8 => 1 << 8,
            PixelType::Uint16 => 1 << 16,
            _ => return None,
        };

        let mut luts = Vec::with_capacity(params.size_c);
        let mut value_to_index = Vec::with_capacity(params.size_c);
        for channel in 0..params.size_c {
            let mut index_to_value: Vec<usize> = (0..entries).collect();
            let mut rng = StdRng::seed_from_u64(PALETTE_SEED + channel as u64);
            index_to_value.shuffle(&mut rng);

            let mut inverse = vec![0; entries];
            for (index, &value) in index_to_value.iter().enumerate() {
                inverse[value] = index;
            }

            let lut = match params.pixel_type {
                PixelType::Uint8 => {
                    let ramp: Vec<u8> = index_to_value.iter().map(|&v| v as u8).collect();
                    LookupTable::Bits8(vec![ramp; params.lut_length])
                }
                _ => {
                    let ramp: Vec<u16> = index_to_value.iter().map(|&v| v as u16).collect();
                    LookupTable::Bits16(vec![ramp; params.lut_length])
                }
            };
            luts.push(lut);
            value_to_index.push(inverse);
        }

        Some(Self {
            luts,
            value_to_index,
        })
    }
}

// =============================================================================
// FakeReader
// =============================================================================

/// State of an open synthetic id.
struct FakeState {
    id: String,
    params: FakeParams,
    core: CoreMetadata,
    palettes: Option<Palettes>,
}

/// Leaf reader producing synthetic planes from a `.fake` id.
pub struct FakeReader {
    state: Option<FakeState>,
    series: usize,
    /// Channel of the most recently opened plane; selects the palette
    active_channel: usize,
    status: StatusReporter,
    store: Box<dyn MetadataStore>,
}

impl Default for FakeReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeReader {
    pub fn new() -> Self {
        Self {
            state: None,
            series: 0,
            active_channel: 0,
            status: StatusReporter::new(),
            store: Box::new(DummyMetadata),
        }
    }

    /// Parameters of the open id.
    pub fn params(&self) -> ReaderResult<&FakeParams> {
        Ok(&self.state()?.params)
    }

    fn state(&self) -> ReaderResult<&FakeState> {
        self.state.as_ref().ok_or(ReaderError::NoCurrentFile)
    }
}

impl PlaneReader for FakeReader {
    fn format_name(&self) -> &str {
        FORMAT_NAME
    }

    fn set_id(&mut self, id: &str) -> ReaderResult<()> {
        if self.current_file() == Some(id) {
            return Ok(());
        }
        self.close()?;

        self.status.report(0, 2, format!("Parsing {}", id));
        let params = FakeParams::parse(id)?;
        let core = params.core();
        core.validate()?;

        self.status.report(1, 2, "Populating metadata");
        let palettes = Palettes::build(&params);
        self.store.clear();
        for series in 0..params.series_count {
            self.store.set_pixels(series, PixelsMetadata::from(&core));
        }

        info!(
            id,
            series = params.series_count,
            image_count = core.image_count,
            pixel_type = %core.pixel_type,
            "initialized synthetic image"
        );
        self.state = Some(FakeState {
            id: id.to_string(),
            params,
            core,
            palettes,
        });
        self.status.report(2, 2, "Done");
        Ok(())
    }

    fn close(&mut self) -> ReaderResult<()> {
        self.state = None;
        self.series = 0;
        self.active_channel = 0;
        Ok(())
    }

    fn current_file(&self) -> Option<&str> {
        self.state.as_ref().map(|state| state.id.as_str())
    }

    fn series_count(&self) -> ReaderResult<usize> {
        Ok(self.state()?.params.series_count)
    }

    fn series(&self) -> usize {
        self.series
    }

    fn set_series(&mut self, series: usize) -> ReaderResult<()> {
        check_series(series, self.series_count()?)?;
        self.series = series;
        Ok(())
    }

    fn core(&self) -> ReaderResult<CoreMetadata> {
        Ok(self.state()?.core)
    }

    fn open_bytes(&mut self, no: usize) -> ReaderResult<Vec<u8>> {
        let core = self.core()?;
        core.check_plane_number(no)?;
        let (z, c, t) = core.get_zct_coords(no)?;
        self.active_channel = c;

        let state = self.state()?;
        let scale = state.params.scale_factor;
        let index_map = state
            .palettes
            .as_ref()
            .and_then(|palettes| palettes.value_to_index.get(c));

        let pixel_type = core.pixel_type;
        let bpp = pixel_type.bytes_per_pixel();
        let rgb = core.rgb_channel_count();
        let (width, height) = (core.size_x, core.size_y);
        let min: i64 = if pixel_type.is_signed() && !pixel_type.is_floating_point() {
            -(1i64 << (8 * bpp - 1))
        } else {
            0
        };

        let mut plane = vec![0u8; core.plane_size()];
        for c_offset in 0..rgb {
            let channel = rgb * c + c_offset;
            for row in 0..height {
                for col in 0..width {
                    let header = if row < BOX_SIZE {
                        match col / BOX_SIZE {
                            0 => Some(self.series),
                            1 => Some(no),
                            2 => Some(z),
                            3 => Some(channel),
                            4 => Some(t),
                            _ => None,
                        }
                    } else {
                        None
                    };

                    let mut value = match header {
                        Some(v) => v as i64,
                        None => min + col as i64,
                    };
                    if let Some(map) = index_map {
                        value = map[value.rem_euclid(map.len() as i64) as usize] as i64;
                    }
                    let bits = sample_bits(pixel_type, value, header.is_some(), scale);

                    let sample = if core.interleaved {
                        (row * width + col) * rgb + c_offset
                    } else {
                        (c_offset * height + row) * width + col
                    };
                    let start = sample * bpp;
                    pack_bytes(bits, &mut plane[start..start + bpp], core.little_endian);
                }
            }
        }

        debug!(no, z, c, t, series = self.series, "generated synthetic plane");
        Ok(plane)
    }

    fn lookup_table(&self) -> Option<&LookupTable> {
        let palettes = self.state.as_ref()?.palettes.as_ref()?;
        palettes.luts.get(self.active_channel)
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

/// Raw bits of one sample. Header values are stored exactly; gradient
/// values are scaled first.
fn sample_bits(pixel_type: PixelType, value: i64, exact: bool, scale: f64) -> u64 {
    match pixel_type {
        PixelType::Float => {
            let v = if exact {
                value as f32
            } else {
                (scale * value as f64) as f32
            };
            u64::from(v.to_bits())
        }
        PixelType::Double => {
            let v = if exact {
                value as f64
            } else {
                scale * value as f64
            };
            v.to_bits()
        }
        _ if exact => value as u64,
        _ => (scale * value as f64) as i64 as u64,
    }
}

// =============================================================================
// Tests
// =============================================================================
