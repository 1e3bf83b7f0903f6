//! Upload validator: accepts or rejects a raw buffer before any processing.
//!
//! Checks run in order and short-circuit on the first failure: size, binary
//! signature detection, MIME allowlist, structural integrity, security
//! heuristic scan. The security scan is a best-effort denylist over the
//! buffer head, not a guarantee; the external verification tier remains the
//! authority on document authenticity.

use crate::sniff::{sniff, Sniffed};
use image::ImageReader;
use std::io::Cursor;
use veridoc_core::RejectionKind;

/// Bytes scanned by the security heuristics for non-PDF files.
const SCAN_WINDOW_BYTES: usize = 1024;
/// Bytes scanned for PDFs, whose active content markers can sit past the header.
const PDF_SCAN_WINDOW_BYTES: usize = 10 * 1024;
/// Smallest byte length accepted as a structurally sane PDF.
const MIN_PDF_BYTES: usize = 100;

/// Substrings rejected in any file type.
const DENYLIST_ANY: &[&[u8]] = &[b"<script", b"<SCRIPT", b"<?php"];
/// Markers rejected only in PDFs (active content).
const DENYLIST_PDF: &[&[u8]] = &[b"/JavaScript", b"/JS", b"/Launch", b"/EmbeddedFile"];

/// A classified upload rejection. No side effects; the caller decides how to
/// surface it.
#[derive(Debug, thiserror::Error)]
pub enum FileRejected {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("Empty file")]
    Empty,

    #[error("Unrecognized file signature")]
    UnknownSignature,

    #[error("Content type not allowed: {detected}")]
    DisallowedType { detected: String },

    #[error("Structural integrity check failed: {0}")]
    Integrity(String),

    #[error("Security scan rejected file: {0}")]
    Security(String),
}

impl FileRejected {
    pub fn kind(&self) -> RejectionKind {
        match self {
            FileRejected::TooLarge { .. } | FileRejected::Empty => RejectionKind::Size,
            FileRejected::UnknownSignature | FileRejected::DisallowedType { .. } => {
                RejectionKind::Type
            }
            FileRejected::Integrity(_) => RejectionKind::Integrity,
            FileRejected::Security(_) => RejectionKind::Security,
        }
    }
}

/// Successful validation: the detected (true) type and, for images, the
/// decoded dimensions.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub detected_mime: &'static str,
    pub dimensions: Option<(u32, u32)>,
}

/// Upload validator. Pure in-memory computation; construction captures the
/// externally configured limits.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_size_bytes: usize,
    allowed_mime_types: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_size_bytes: usize, allowed_mime_types: Vec<String>) -> Self {
        Self {
            max_size_bytes,
            allowed_mime_types,
        }
    }

    /// Validate a buffer against its declared metadata.
    ///
    /// `declared_mime` is advisory only: the true type comes from the byte
    /// signature, and a mismatch with an allowed declared type still rejects.
    pub fn validate(
        &self,
        buffer: &[u8],
        declared_mime: &str,
    ) -> Result<ValidationOutcome, FileRejected> {
        if buffer.is_empty() {
            return Err(FileRejected::Empty);
        }
        if buffer.len() > self.max_size_bytes {
            return Err(FileRejected::TooLarge {
                size: buffer.len(),
                max: self.max_size_bytes,
            });
        }

        let detected = match sniff(buffer) {
            Sniffed::Mime(mime) => mime,
            Sniffed::Executable(mime) => {
                tracing::debug!(detected = mime, declared = declared_mime, "Executable signature in upload");
                return Err(FileRejected::Security(format!(
                    "Executable signature detected ({})",
                    mime
                )));
            }
            Sniffed::Unknown => return Err(FileRejected::UnknownSignature),
        };

        if !self.allowed_mime_types.iter().any(|m| m == detected) {
            return Err(FileRejected::DisallowedType {
                detected: detected.to_string(),
            });
        }

        let dimensions = self.check_integrity(buffer, detected)?;
        self.security_scan(buffer, detected)?;

        Ok(ValidationOutcome {
            detected_mime: detected,
            dimensions,
        })
    }

    /// Structural integrity: decode image metadata, or confirm a sane PDF.
    fn check_integrity(
        &self,
        buffer: &[u8],
        detected: &str,
    ) -> Result<Option<(u32, u32)>, FileRejected> {
        if detected == "application/pdf" {
            if buffer.len() < MIN_PDF_BYTES {
                return Err(FileRejected::Integrity(format!(
                    "PDF too short to be well-formed ({} bytes)",
                    buffer.len()
                )));
            }
            return Ok(None);
        }

        let reader = ImageReader::new(Cursor::new(buffer))
            .with_guessed_format()
            .map_err(|e| FileRejected::Integrity(e.to_string()))?;
        let dims = reader
            .into_dimensions()
            .map_err(|e| FileRejected::Integrity(format!("Image metadata unreadable: {}", e)))?;
        Ok(Some(dims))
    }

    /// Best-effort denylist scan over the buffer head.
    fn security_scan(&self, buffer: &[u8], detected: &str) -> Result<(), FileRejected> {
        let is_pdf = detected == "application/pdf";
        let window_len = if is_pdf {
            PDF_SCAN_WINDOW_BYTES
        } else {
            SCAN_WINDOW_BYTES
        }
        .min(buffer.len());
        let window = &buffer[..window_len];

        for pattern in DENYLIST_ANY {
            if contains(window, pattern) {
                return Err(FileRejected::Security(format!(
                    "Embedded script marker detected ({})",
                    String::from_utf8_lossy(pattern)
                )));
            }
        }

        if is_pdf {
            for pattern in DENYLIST_PDF {
                if contains(window, pattern) {
                    return Err(FileRejected::Security(format!(
                        "Active PDF content detected ({})",
                        String::from_utf8_lossy(pattern)
                    )));
                }
            }
        }

        Ok(())
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn allowed() -> Vec<String> {
        vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "application/pdf".to_string(),
        ]
    }

    fn validator() -> UploadValidator {
        UploadValidator::new(1024 * 1024, allowed())
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(32, 32, Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn pdf_bytes(extra: &[u8]) -> Vec<u8> {
        let mut buf = b"%PDF-1.4\n".to_vec();
        buf.extend_from_slice(extra);
        buf.resize(buf.len().max(256), b' ');
        buf.extend_from_slice(b"\n%%EOF");
        buf
    }

    #[test]
    fn test_empty_rejected_as_size() {
        let err = validator().validate(&[], "image/png").unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Size);
    }

    #[test]
    fn test_oversize_rejected_regardless_of_declared_type() {
        let v = UploadValidator::new(16, allowed());
        let err = v.validate(&png_bytes(), "image/png").unwrap_err();
        assert!(matches!(err, FileRejected::TooLarge { .. }));
        assert_eq!(err.kind(), RejectionKind::Size);
    }

    #[test]
    fn test_mismatched_header_law() {
        // Declared type is allowed, but the bytes carry no known signature.
        let err = validator()
            .validate(b"not really an image at all.....", "image/jpeg")
            .unwrap_err();
        assert!(matches!(err, FileRejected::UnknownSignature));
        assert_eq!(err.kind(), RejectionKind::Type);
    }

    #[test]
    fn test_disallowed_detected_type() {
        let v = UploadValidator::new(1024 * 1024, vec!["application/pdf".to_string()]);
        let err = v.validate(&png_bytes(), "application/pdf").unwrap_err();
        assert!(matches!(err, FileRejected::DisallowedType { .. }));
    }

    #[test]
    fn test_valid_png_detected() {
        let outcome = validator().validate(&png_bytes(), "image/png").unwrap();
        assert_eq!(outcome.detected_mime, "image/png");
        assert_eq!(outcome.dimensions, Some((32, 32)));
    }

    #[test]
    fn test_truncated_png_fails_integrity() {
        // Valid signature but the metadata chunks are cut off.
        let buf = png_bytes()[..12].to_vec();
        let err = validator().validate(&buf, "image/png").unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Integrity);
    }

    #[test]
    fn test_executable_signature_is_security_rejection() {
        let mut buf = b"MZ\x90\x00".to_vec();
        buf.resize(512, 0);
        let err = validator().validate(&buf, "image/jpeg").unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Security);
    }

    #[test]
    fn test_pdf_with_javascript_rejected() {
        let buf = pdf_bytes(b"<< /S /JavaScript /JS (app.alert(1)) >>");
        let err = validator().validate(&buf, "application/pdf").unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Security);
    }

    #[test]
    fn test_clean_pdf_accepted() {
        let buf = pdf_bytes(b"1 0 obj << /Type /Catalog >> endobj");
        let outcome = validator().validate(&buf, "application/pdf").unwrap();
        assert_eq!(outcome.detected_mime, "application/pdf");
        assert_eq!(outcome.dimensions, None);
    }

    #[test]
    fn test_tiny_pdf_fails_integrity() {
        let err = validator().validate(b"%PDF-1.4", "application/pdf").unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Integrity);
    }

    #[test]
    fn test_script_tag_rejected_in_image_window() {
        // A PNG whose head carries a script tag; contrived, but the scan is a
        // denylist over raw bytes.
        let mut buf = png_bytes();
        let insert_at = buf.len().min(64);
        buf.splice(insert_at..insert_at, b"<script>".iter().copied());
        // Splicing breaks the PNG structure, so integrity may trip first;
        // either way the upload must not pass.
        assert!(validator().validate(&buf, "image/png").is_err());
    }

    #[test]
    fn test_pdf_marker_outside_window_is_accepted() {
        // /JavaScript past the 10 KiB window is out of scan range by design.
        let mut buf = b"%PDF-1.4\n".to_vec();
        buf.resize(11 * 1024, b' ');
        buf.extend_from_slice(b"/JavaScript");
        buf.extend_from_slice(b"\n%%EOF");
        assert!(validator().validate(&buf, "application/pdf").is_ok());
    }
}
