//! Palette expansion.

use tracing::debug;

use crate::error::{ReaderError, ReaderResult};
use crate::model::{CoreMetadata, LookupTable, PixelType};
use crate::pixels::expand_indexed;
use crate::reader::{forward_to_reader, PlaneReader, ReaderWrapper};

/// Decorator replacing palette indices with real colour values.
///
/// Active when the wrapped series is indexed with a true-colour palette
/// (`indexed && !false_color`) and the reader supplies a lookup table.
/// Pseudo-colour palettes are left alone: their indices are the data.
///
/// Once active, every index becomes one sample per palette channel, the
/// series reports packed, non-indexed planes of 8- or 16-bit samples
/// matching the palette width, and [`lookup_table`](PlaneReader::lookup_table)
/// answers `None`.
pub struct ChannelFiller<R> {
    reader: R,
}

impl<R: PlaneReader> ChannelFiller<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Whether planes of the current series are being expanded.
    pub fn is_filled(&self) -> ReaderResult<bool> {
        Ok(self.active_lut(&self.reader.core()?).is_some())
    }

    fn active_lut(&self, inner: &CoreMetadata) -> Option<&LookupTable> {
        if inner.indexed && !inner.false_color {
            self.reader.lookup_table()
        } else {
            None
        }
    }
}

fn filled(inner: &CoreMetadata, lut: &LookupTable) -> CoreMetadata {
    CoreMetadata {
        size_c: inner.size_c * lut.channel_count(),
        pixel_type: match lut {
            LookupTable::Bits8(_) => PixelType::Uint8,
            LookupTable::Bits16(_) => PixelType::Uint16,
        },
        packed: true,
        indexed: false,
        false_color: false,
        ..*inner
    }
}

impl<R: PlaneReader> ReaderWrapper for ChannelFiller<R> {
    type Inner = R;

    fn reader(&self) -> &R {
        &self.reader
    }

    fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    fn into_reader(self) -> R {
        self.reader
    }
}

impl<R: PlaneReader> PlaneReader for ChannelFiller<R> {
    forward_to_reader!(
        format_name,
        set_id,
        close,
        current_file,
        series_count,
        series,
        set_series,
        add_status_listener,
        remove_status_listener,
        metadata_store,
        metadata_store_mut,
        set_metadata_store,
    );

    fn core(&self) -> ReaderResult<CoreMetadata> {
        let inner = self.reader.core()?;
        Ok(match self.active_lut(&inner) {
            Some(lut) => filled(&inner, lut),
            None => inner,
        })
    }

    fn open_bytes(&mut self, no: usize) -> ReaderResult<Vec<u8>> {
        let inner = self.reader.core()?;
        if self.active_lut(&inner).is_none() {
            return self.reader.open_bytes(no);
        }

        let indices = self.reader.open_bytes(no)?;

        // Fetched after the plane: some readers switch palettes per plane.
        let lut = self.active_lut(&inner).ok_or_else(|| {
            ReaderError::FormatInconsistency(format!(
                "lookup table disappeared while reading plane {}",
                no
            ))
        })?;
        lut.validate()?;
        debug!(no, channels = lut.channel_count(), entries = lut.len(), "expanding palette");

        expand_indexed(
            &indices,
            inner.pixel_type.bytes_per_pixel(),
            inner.little_endian,
            lut,
            inner.interleaved,
        )
    }

    fn lookup_table(&self) -> Option<&LookupTable> {
        // No file open: nothing to expand, let the wrapped reader answer.
        let Ok(inner) = self.reader.core() else {
            return self.reader.lookup_table();
        };
        match self.active_lut(&inner) {
            Some(_) => None,
            None => self.reader.lookup_table(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
