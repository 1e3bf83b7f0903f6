//! Binary signature detection.
//!
//! The declared `Content-Type` header is advisory only; the true type of an
//! upload is decided here, from the leading bytes of the buffer.

/// Result of inspecting a buffer's leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sniffed {
    /// A recognized document/image format.
    Mime(&'static str),
    /// A recognized executable format. Surfaced separately so the caller can
    /// classify the rejection as a security failure rather than a type
    /// mismatch.
    Executable(&'static str),
    /// No known signature matched.
    Unknown,
}

/// Detect the true MIME type of `buffer` from its magic bytes.
pub fn sniff(buffer: &[u8]) -> Sniffed {
    if buffer.len() < 4 {
        return Sniffed::Unknown;
    }

    // Executable signatures first: these are security rejections, not
    // unknown-type rejections.
    if buffer.starts_with(b"MZ") {
        return Sniffed::Executable("application/x-msdownload");
    }
    if buffer.starts_with(&[0x7F, 0x45, 0x4C, 0x46]) {
        return Sniffed::Executable("application/x-elf");
    }

    if buffer.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Sniffed::Mime("image/jpeg");
    }
    if buffer.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Sniffed::Mime("image/png");
    }
    if buffer.len() >= 12 && buffer.starts_with(b"RIFF") && &buffer[8..12] == b"WEBP" {
        return Sniffed::Mime("image/webp");
    }
    if buffer.starts_with(b"GIF87a") || buffer.starts_with(b"GIF89a") {
        return Sniffed::Mime("image/gif");
    }
    if buffer.starts_with(b"%PDF") {
        return Sniffed::Mime("application/pdf");
    }

    Sniffed::Unknown
}
