//! Conversion of raw plane bytes into decoded images and sub-regions.

use image::{DynamicImage, ImageBuffer, Luma, LumaA, Rgb, Rgba};

use crate::error::{ReaderError, ReaderResult};
use crate::io::read_u16;
use crate::model::{CoreMetadata, PixelType};

/// Build an image from the bytes of one plane.
///
/// Supports unsigned 8- and 16-bit samples with 1 to 4 channels per plane.
/// Planar multi-channel data is interleaved on the way.
pub fn plane_to_image(core: &CoreMetadata, plane: &[u8]) -> ReaderResult<DynamicImage> {
    check_plane_length(core, plane)?;

    let channels = core.rgb_channel_count();
    let width = to_u32(core.size_x)?;
    let height = to_u32(core.size_y)?;
    let bpp = core.pixel_type.bytes_per_pixel();
    let interleaved = if channels > 1 && !core.interleaved {
        interleave(plane, channels, bpp)
    } else {
        plane.to_vec()
    };

    let malformed =
        || ReaderError::FormatInconsistency(format!("plane does not fit {}x{}", width, height));

    match core.pixel_type {
        PixelType::Uint8 => {
            let image = match channels {
                1 => ImageBuffer::<Luma<u8>, _>::from_raw(width, height, interleaved)
                    .map(DynamicImage::ImageLuma8),
                2 => ImageBuffer::<LumaA<u8>, _>::from_raw(width, height, interleaved)
                    .map(DynamicImage::ImageLumaA8),
                3 => ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, interleaved)
                    .map(DynamicImage::ImageRgb8),
                4 => ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, interleaved)
                    .map(DynamicImage::ImageRgba8),
                n => return Err(unsupported_channels(n)),
            };
            image.ok_or_else(malformed)
        }
        PixelType::Uint16 => {
            let samples: Vec<u16> = interleaved
                .chunks_exact(2)
                .map(|b| read_u16(b, core.little_endian))
                .collect();
            let image = match channels {
                1 => ImageBuffer::<Luma<u16>, _>::from_raw(width, height, samples)
                    .map(DynamicImage::ImageLuma16),
                2 => ImageBuffer::<LumaA<u16>, _>::from_raw(width, height, samples)
                    .map(DynamicImage::ImageLumaA16),
                3 => ImageBuffer::<Rgb<u16>, _>::from_raw(width, height, samples)
                    .map(DynamicImage::ImageRgb16),
                4 => ImageBuffer::<Rgba<u16>, _>::from_raw(width, height, samples)
                    .map(DynamicImage::ImageRgba16),
                n => return Err(unsupported_channels(n)),
            };
            image.ok_or_else(malformed)
        }
        other => Err(ReaderError::UnsupportedPixelType(format!(
            "cannot build an image from {} samples",
            other
        ))),
    }
}

/// Copy the `width x height` rectangle at `(x, y)` out of a full plane.
///
/// The result keeps the plane's sample layout: interleaved planes yield
/// interleaved rows, planar planes yield one sub-rectangle per channel.
pub fn crop_plane(
    core: &CoreMetadata,
    plane: &[u8],
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> ReaderResult<Vec<u8>> {
    check_plane_length(core, plane)?;
    let exceeds = |start: usize, len: usize, size: usize| {
        start.checked_add(len).map_or(true, |end| end > size)
    };
    if exceeds(x, width, core.size_x) || exceeds(y, height, core.size_y) {
        return Err(ReaderError::FormatInconsistency(format!(
            "region {}x{}+{}+{} exceeds plane {}x{}",
            width, height, x, y, core.size_x, core.size_y
        )));
    }

    let bpp = core.pixel_type.bytes_per_pixel();
    let channels = core.rgb_channel_count();
    let mut out = Vec::with_capacity(width * height * channels * bpp);

    if channels == 1 || core.interleaved {
        let pixel = channels * bpp;
        let stride = core.size_x * pixel;
        for row in y..y + height {
            let start = row * stride + x * pixel;
            out.extend_from_slice(&plane[start..start + width * pixel]);
        }
        return Ok(out);
    }

    let stride = core.size_x * bpp;
    let channel_len = stride * core.size_y;
    for c in 0..channels {
        for row in y..y + height {
            let start = c * channel_len + row * stride + x * bpp;
            out.extend_from_slice(&plane[start..start + width * bpp]);
        }
    }
    Ok(out)
}

fn check_plane_length(core: &CoreMetadata, plane: &[u8]) -> ReaderResult<()> {
    let expected = core.plane_size();
    if plane.len() != expected {
        return Err(ReaderError::FormatInconsistency(format!(
            "plane has {} bytes, expected {}",
            plane.len(),
            expected
        )));
    }
    Ok(())
}

fn interleave(plane: &[u8], channels: usize, bpp: usize) -> Vec<u8> {
    let channel_len = plane.len() / channels;
    let mut out = Vec::with_capacity(plane.len());
    for offset in (0..channel_len).step_by(bpp) {
        for c in 0..channels {
            let start = c * channel_len + offset;
            out.extend_from_slice(&plane[start..start + bpp]);
        }
    }
    out
}

fn to_u32(size: usize) -> ReaderResult<u32> {
    u32::try_from(size)
        .map_err(|_| ReaderError::FormatInconsistency(format!("dimension {} too large", size)))
}

fn unsupported_channels(channels: usize) -> ReaderError {
    ReaderError::UnsupportedPixelType(format!("{} channels per plane", channels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn rgb_core(interleaved: bool) -> CoreMetadata {
        CoreMetadata {
            size_c: 3,
            packed: true,
            interleaved,
            ..CoreMetadata::new(2, 2, PixelType::Uint8)
        }
    }

    #[test]
    fn test_gray8_image() {
        let core = CoreMetadata::new(2, 2, PixelType::Uint8);
        let image = plane_to_image(&core, &[1, 2, 3, 4]).unwrap();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.as_luma8().unwrap().get_pixel(1, 1).0, [4]);
    }

    #[test]
    fn test_planar_rgb_is_interleaved() {
        let plane = [1, 2, 3, 4, 11, 12, 13, 14, 21, 22, 23, 24];
        let image = plane_to_image(&rgb_core(false), &plane).unwrap();
        let rgb = image.as_rgb8().unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [1, 11, 21]);
        assert_eq!(rgb.get_pixel(1, 1).0, [4, 14, 24]);
    }

    #[test]
    fn test_gray16_big_endian() {
        let core = CoreMetadata {
            little_endian: false,
            ..CoreMetadata::new(1, 1, PixelType::Uint16)
        };
        let image = plane_to_image(&core, &[0x01, 0x02]).unwrap();
        assert_eq!(image.as_luma16().unwrap().get_pixel(0, 0).0, [0x0102]);
    }

    #[test]
    fn test_unsupported_types() {
        let core = CoreMetadata::new(1, 1, PixelType::Float);
        assert!(matches!(
            plane_to_image(&core, &[0; 4]),
            Err(ReaderError::UnsupportedPixelType(_))
        ));
    }

    #[test]
    fn test_wrong_length() {
        let core = CoreMetadata::new(2, 2, PixelType::Uint8);
        assert!(plane_to_image(&core, &[0; 3]).is_err());
    }

    #[test]
    fn test_crop_interleaved() {
        let core = CoreMetadata::new(3, 2, PixelType::Uint8);
        let plane = [0, 1, 2, 10, 11, 12];
        assert_eq!(crop_plane(&core, &plane, 1, 0, 2, 2).unwrap(), vec![1, 2, 11, 12]);
        assert!(crop_plane(&core, &plane, 2, 0, 2, 1).is_err());
    }

    #[test]
    fn test_crop_region_overflow() {
        let core = CoreMetadata::new(3, 2, PixelType::Uint8);
        let plane = [0; 6];
        for (x, y, width, height) in [
            (usize::MAX, 0, 1, 1),
            (0, usize::MAX, 1, 1),
            (1, 0, usize::MAX, 1),
            (0, 1, 1, usize::MAX),
        ] {
            let err = crop_plane(&core, &plane, x, y, width, height).unwrap_err();
            assert!(matches!(err, ReaderError::FormatInconsistency(_)));
        }
    }

    #[test]
    fn test_crop_planar() {
        let plane = [1, 2, 3, 4, 11, 12, 13, 14, 21, 22, 23, 24];
        let out = crop_plane(&rgb_core(false), &plane, 1, 1, 1, 1).unwrap();
        assert_eq!(out, vec![4, 14, 24]);
    }
}
