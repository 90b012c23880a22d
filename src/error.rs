use thiserror::Error;

/// I/O errors raised by byte sources.
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Error reported by the operating system or the underlying stream
    #[error("I/O error: {0}")]
    Io(String),

    /// Requested range exceeds the source length
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, length is {length}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        length: u64,
    },

    /// Source could not be opened
    #[error("Source not found: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => IoError::NotFound(err.to_string()),
            _ => IoError::Io(err.to_string()),
        }
    }
}

/// Errors surfaced by plane readers and reader decorators.
///
/// Every variant names the offending index, coordinate or order so the
/// message alone identifies what was rejected.
#[derive(Debug, Clone, Error)]
pub enum ReaderError {
    /// Plane index outside `[0, imageCount)`
    #[error("Invalid plane index: {index} (imageCount={image_count})")]
    InvalidPlaneIndex { index: usize, image_count: usize },

    /// Dimension order is not a permutation of XYZCT with X/Y leading
    #[error("Invalid dimension order '{order}': {reason}")]
    InvalidDimensionOrder { order: String, reason: String },

    /// Z, C or T coordinate outside its axis
    #[error("Invalid {axis} coordinate: {value}/{size}")]
    InvalidCoordinate { axis: char, value: usize, size: usize },

    /// Wrapped reader returned data that contradicts its declared geometry
    #[error("Format inconsistency: {0}")]
    FormatInconsistency(String),

    /// Underlying byte source failure
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Operation requires an open file
    #[error("No current file; call set_id first")]
    NoCurrentFile,

    /// Series index outside `[0, seriesCount)`
    #[error("Invalid series: {series} (seriesCount={series_count})")]
    InvalidSeries { series: usize, series_count: usize },

    /// Pixel type cannot be handled by the requested operation
    #[error("Unsupported pixel type: {0}")]
    UnsupportedPixelType(String),

    /// No registered reader accepts the id
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// Id was recognised but its parameters are malformed
    #[error("Invalid id '{id}': {reason}")]
    InvalidId { id: String, reason: String },
}

impl ReaderError {
    /// Shorthand for [`ReaderError::InvalidDimensionOrder`].
    pub fn invalid_order(order: impl Into<String>, reason: impl Into<String>) -> Self {
        ReaderError::InvalidDimensionOrder {
            order: order.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ReaderError::InvalidId`].
    pub fn invalid_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        ReaderError::InvalidId {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the reader stack.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Errors raised by compressors.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("Compression failed: {0}")]
    Compress(String),

    #[error("Decompression failed: {0}")]
    Decompress(String),

    /// Bit field wider than a single read or write supports
    #[error("Bit field of {0} bits exceeds 32")]
    FieldWidth(u32),

    /// Codec violated the compressor contract during a self-test
    #[error("Self-test failed: {0}")]
    SelfTest(String),
}
