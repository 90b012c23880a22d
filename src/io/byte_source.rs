use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};

use crate::error::IoError;

/// A seekable, blocking byte source.
///
/// Format decoders read raw file content through this trait; the reader
/// decorators never touch it directly. A source has a cursor that `read`
/// advances and `seek` moves.
pub trait ByteSource: Send {
    /// Read up to `buf.len()` bytes at the cursor.
    ///
    /// Returns the number of bytes read, 0 at end of source.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError>;

    /// Move the cursor to `pos`. Seeking past the end is allowed.
    fn seek(&mut self, pos: u64) -> Result<(), IoError>;

    /// Current cursor position.
    fn position(&self) -> u64;

    /// Total length of the source in bytes.
    fn length(&self) -> u64;

    /// Truncate or zero-extend the source to `len` bytes.
    fn set_length(&mut self, len: u64) -> Result<(), IoError>;

    /// Identifier for logging.
    fn identifier(&self) -> &str;

    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// Leaves the cursor just past the range.
    fn read_exact_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        let length = self.length();
        if offset.saturating_add(len as u64) > length {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                length,
            });
        }

        self.seek(offset)?;
        let mut buf = BytesMut::zeroed(len);
        let mut filled = 0;
        while filled < len {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(IoError::Io(format!(
                    "{}: unexpected end of data at offset {}",
                    self.identifier(),
                    offset + filled as u64
                )));
            }
            filled += n;
        }
        Ok(buf.freeze())
    }
}

// =============================================================================
// FileSource
// =============================================================================

/// A [`ByteSource`] over a local file.
pub struct FileSource {
    file: File,
    path: String,
    position: u64,
    length: u64,
}

impl FileSource {
    /// Open an existing file read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_file(file, path.to_path_buf())
    }

    /// Open or create a file for reading and writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        Self::from_file(file, path.to_path_buf())
    }

    fn from_file(file: File, path: PathBuf) -> Result<Self, IoError> {
        let length = file.metadata()?.len();
        Ok(Self {
            file,
            path: path.display().to_string(),
            position: 0,
            length,
        })
    }

    /// Write `data` at the cursor, extending the file if needed.
    pub fn write(&mut self, data: &[u8]) -> Result<(), IoError> {
        self.file.seek(SeekFrom::Start(self.position))?;
        self.file.write_all(data)?;
        self.position += data.len() as u64;
        self.length = self.length.max(self.position);
        Ok(())
    }
}

impl ByteSource for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        self.file.seek(SeekFrom::Start(self.position))?;
        let n = self.file.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> Result<(), IoError> {
        self.position = pos;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn length(&self) -> u64 {
        self.length
    }

    fn set_length(&mut self, len: u64) -> Result<(), IoError> {
        self.file.set_len(len)?;
        self.length = len;
        Ok(())
    }

    fn identifier(&self) -> &str {
        &self.path
    }
}

// =============================================================================
// MemorySource
// =============================================================================

/// A growable in-memory [`ByteSource`].
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    data: BytesMut,
    position: u64,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, data: impl AsRef<[u8]>) -> Self {
        Self {
            name: name.into(),
            data: BytesMut::from(data.as_ref()),
            position: 0,
        }
    }

    /// Write `data` at the cursor, growing the buffer if needed.
    pub fn write(&mut self, data: &[u8]) {
        let start = self.position as usize;
        let end = start + data.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(data);
        self.position = end as u64;
    }

    /// Snapshot of the current content.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.data)
    }
}

impl ByteSource for MemorySource {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        let len = self.data.len() as u64;
        if self.position >= len {
            return Ok(0);
        }
        let start = self.position as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.position += n as u64;
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> Result<(), IoError> {
        self.position = pos;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn length(&self) -> u64 {
        self.data.len() as u64
    }

    fn set_length(&mut self, len: u64) -> Result<(), IoError> {
        let len = usize::try_from(len)
            .map_err(|_| IoError::Io(format!("length {} exceeds address space", len)))?;
        self.data.resize(len, 0);
        Ok(())
    }

    fn identifier(&self) -> &str {
        &self.name
    }
}

// =============================================================================
// Endian Helper Functions
// =============================================================================
//
// Sample data and palette entries are stored in either byte order, as
// declared by the series' little-endian flag.

/// Read a little-endian u16 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 2 bytes.
#[inline]
pub fn read_u16_le(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

/// Read a big-endian u16 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 2 bytes.
#[inline]
pub fn read_u16_be(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

/// Read a u16 in the given byte order.
#[inline]
pub fn read_u16(bytes: &[u8], little_endian: bool) -> u16 {
    if little_endian {
        read_u16_le(bytes)
    } else {
        read_u16_be(bytes)
    }
}

/// Encode a u16 in the given byte order.
#[inline]
pub fn write_u16(value: u16, little_endian: bool) -> [u8; 2] {
    if little_endian {
        value.to_le_bytes()
    } else {
        value.to_be_bytes()
    }
}

/// Read a little-endian u32 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 4 bytes.
#[inline]
pub fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Read a big-endian u32 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 4 bytes.
#[inline]
pub fn read_u32_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Combine up to 8 bytes into an unsigned integer.
///
/// Bytes beyond the eighth are ignored; an empty slice yields 0.
pub fn unpack_bytes(bytes: &[u8], little_endian: bool) -> u64 {
    let bytes = &bytes[..bytes.len().min(8)];
    if little_endian {
        bytes
            .iter()
            .rev()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
    } else {
        bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
    }
}

/// Write the low `out.len()` bytes of `value` (at most 8) into `out`.
pub fn pack_bytes(value: u64, out: &mut [u8], little_endian: bool) {
    let len = out.len().min(8);
    for (i, byte) in out[..len].iter_mut().enumerate() {
        let shift = if little_endian { i } else { len - 1 - i };
        *byte = (value >> (8 * shift)) as u8;
    }
}
