//! Low-level image operations: EXIF orientation, rotation, encoding.

use anyhow::Result;
use exif::{In, Reader, Tag};
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, ImageFormat};
use std::io::Cursor;

/// Read the EXIF orientation tag (1-8) from raw image data.
///
/// Returns 1 (normal) when there is no EXIF block or no orientation tag.
pub fn read_exif_orientation(data: &[u8]) -> u8 {
    let mut cursor = Cursor::new(data);
    let Ok(exif) = Reader::new().read_from_container(&mut cursor) else {
        return 1;
    };
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(|v| v as u8)
        .filter(|v| (1..=8).contains(v))
        .unwrap_or(1)
}

/// Get rotation and flip operations needed for a given EXIF orientation.
/// Returns (rotate_angle, flip_horizontal, flip_vertical).
pub fn orientation_transforms(orientation: u8) -> (Option<u16>, bool, bool) {
    match orientation {
        1 => (None, false, false),      // Normal
        2 => (None, true, false),       // Mirror horizontal
        3 => (Some(180), false, false), // Rotate 180
        4 => (None, false, true),       // Mirror vertical
        5 => (Some(270), true, false),  // Mirror horizontal + Rotate 270 CW
        6 => (Some(90), false, false),  // Rotate 90 CW
        7 => (Some(90), true, false),   // Mirror horizontal + Rotate 90 CW
        8 => (Some(270), false, false), // Rotate 270 CW
        _ => (None, false, false),      // Invalid, treat as normal
    }
}

/// Normalize an image to upright orientation based on its EXIF data.
pub fn apply_exif_orientation(mut img: DynamicImage, data: &[u8]) -> DynamicImage {
    let orientation = read_exif_orientation(data);
    let (rotate, flip_h, flip_v) = orientation_transforms(orientation);

    tracing::debug!(
        orientation = orientation,
        rotate = ?rotate,
        flip_horizontal = flip_h,
        flip_vertical = flip_v,
        "Applying EXIF orientation"
    );

    if let Some(angle) = rotate {
        img = match angle {
            90 => DynamicImage::ImageRgba8(imageops::rotate90(&img.to_rgba8())),
            180 => DynamicImage::ImageRgba8(imageops::rotate180(&img.to_rgba8())),
            270 => DynamicImage::ImageRgba8(imageops::rotate270(&img.to_rgba8())),
            _ => img,
        };
    }
    if flip_h {
        img = DynamicImage::ImageRgba8(imageops::flip_horizontal(&img.to_rgba8()));
    }
    if flip_v {
        img = DynamicImage::ImageRgba8(imageops::flip_vertical(&img.to_rgba8()));
    }

    img
}

/// Whether the image carries an alpha channel worth preserving.
pub fn has_alpha(img: &DynamicImage) -> bool {
    img.color().has_alpha()
}

/// Encode as JPEG at the given quality. Alpha is flattened; JPEG has no
/// transparency.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(buf)
}

/// Encode as PNG (lossless, preserves alpha).
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([200, 100, 50, 255])))
    }

    #[test]
    fn test_orientation_transforms_table() {
        assert_eq!(orientation_transforms(1), (None, false, false));
        assert_eq!(orientation_transforms(3), (Some(180), false, false));
        assert_eq!(orientation_transforms(6), (Some(90), false, false));
        assert_eq!(orientation_transforms(8), (Some(270), false, false));
        assert_eq!(orientation_transforms(0), (None, false, false));
        assert_eq!(orientation_transforms(9), (None, false, false));
    }

    #[test]
    fn test_read_orientation_no_exif() {
        let data = encode_png(&test_image(4, 4)).unwrap();
        assert_eq!(read_exif_orientation(&data), 1);
    }

    #[test]
    fn test_apply_orientation_without_exif_is_identity_shape() {
        let img = test_image(6, 4);
        let data = encode_png(&img).unwrap();
        let out = apply_exif_orientation(img, &data);
        assert_eq!(out.width(), 6);
        assert_eq!(out.height(), 4);
    }

    #[test]
    fn test_encode_jpeg_flattens_alpha() {
        let data = encode_jpeg(&test_image(8, 8), 85).unwrap();
        // JPEG SOI marker
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_png_signature() {
        let data = encode_png(&test_image(8, 8)).unwrap();
        assert_eq!(&data[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_has_alpha() {
        assert!(has_alpha(&test_image(2, 2)));
        let opaque = DynamicImage::ImageRgb8(image::RgbImage::new(2, 2));
        assert!(!has_alpha(&opaque));
    }
}
