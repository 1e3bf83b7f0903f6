//! File fixtures for upload tests.

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

/// A real JPEG with a gradient body so it survives decode and re-encode.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .expect("Failed to encode test JPEG");
    buf
}

/// A PNG with partial transparency, which the processor keeps as PNG.
pub fn transparent_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 128]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("Failed to encode test PNG");
    buf
}

/// A minimal structurally sane PDF.
pub fn pdf_bytes(extra: &[u8]) -> Vec<u8> {
    let mut buf = b"%PDF-1.4\n".to_vec();
    buf.extend_from_slice(extra);
    buf.resize(buf.len().max(256), b' ');
    buf.extend_from_slice(b"\n%%EOF");
    buf
}

/// A PDF carrying an active-content marker inside the scan window.
pub fn pdf_with_javascript() -> Vec<u8> {
    pdf_bytes(b"1 0 obj << /S /JavaScript /JS (app.alert(1)) >> endobj")
}

/// A buffer with a Windows executable signature.
pub fn mz_executable() -> Vec<u8> {
    let mut buf = b"MZ\x90\x00\x03\x00\x00\x00".to_vec();
    buf.resize(2048, 0);
    buf
}
