//! Content processor: best-effort normalization of accepted uploads.
//!
//! Processing is best-effort, validation is authoritative: any failure here
//! returns the original buffer with a `processing_failed` marker instead of
//! failing the upload.

use crate::image_ops;
use crate::policy::policy_for;
use anyhow::{Context, Result};
use image::ImageReader;
use sha2::{Digest, Sha256};
use std::io::Cursor;
use veridoc_core::models::DocumentType;

pub const STEP_AUTO_ROTATE: &str = "auto_rotate";
pub const STEP_RESIZE: &str = "resize";
pub const STEP_JPEG_CONVERSION: &str = "jpeg_conversion";
pub const STEP_PNG_OPTIMIZATION: &str = "png_optimization";
pub const STEP_EXTRA_COMPRESSION: &str = "extra_compression";
pub const STEP_PDF_VALIDATION: &str = "pdf_validation";
pub const STEP_PROCESSING_FAILED: &str = "processing_failed";

/// Extra lossy pass quality reduction, floored so text stays legible.
const EXTRA_PASS_QUALITY_DROP: u8 = 20;
const EXTRA_PASS_QUALITY_FLOOR: u8 = 40;

/// A processed (or passed-through) file ready for storage.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub data: Vec<u8>,
    pub content_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub steps_applied: Vec<String>,
}

impl ProcessedFile {
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn checksum_sha256(&self) -> String {
        hex::encode(Sha256::digest(&self.data))
    }
}

/// Transforms an accepted buffer according to per-document-type policy.
#[derive(Debug, Clone)]
pub struct ContentProcessor {
    max_upload_bytes: usize,
}

impl ContentProcessor {
    pub fn new(max_upload_bytes: usize) -> Self {
        Self { max_upload_bytes }
    }

    /// Process a validated buffer. Never fails: on any processing error the
    /// original bytes come back with `steps_applied == ["processing_failed"]`.
    ///
    /// Image decode/encode is CPU-bound and runs off the async pool.
    pub async fn process(
        &self,
        data: Vec<u8>,
        mime: &str,
        document_type: DocumentType,
    ) -> ProcessedFile {
        let max_upload_bytes = self.max_upload_bytes;
        let mime_owned = mime.to_string();
        let original = data.clone();

        let result = tokio::task::spawn_blocking(move || {
            process_sync(data, &mime_owned, document_type, max_upload_bytes)
        })
        .await;

        match result {
            Ok(Ok(processed)) => processed,
            Ok(Err(e)) => {
                tracing::warn!(
                    error = %e,
                    document_type = %document_type,
                    size_bytes = original.len(),
                    "Processing failed, keeping original file"
                );
                failed_passthrough(original, mime)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Processing task panicked, keeping original file");
                failed_passthrough(original, mime)
            }
        }
    }
}

fn failed_passthrough(data: Vec<u8>, mime: &str) -> ProcessedFile {
    ProcessedFile {
        data,
        content_type: mime.to_string(),
        width: None,
        height: None,
        steps_applied: vec![STEP_PROCESSING_FAILED.to_string()],
    }
}

fn process_sync(
    data: Vec<u8>,
    mime: &str,
    document_type: DocumentType,
    max_upload_bytes: usize,
) -> Result<ProcessedFile> {
    if mime == "application/pdf" {
        // Structural checks already ran in the validator; PDFs pass through
        // unchanged in this version. Extension point for flattening/linearizing.
        return Ok(ProcessedFile {
            data,
            content_type: mime.to_string(),
            width: None,
            height: None,
            steps_applied: vec![STEP_PDF_VALIDATION.to_string()],
        });
    }

    let policy = policy_for(document_type);
    if !policy.optimize {
        return Ok(ProcessedFile {
            data,
            content_type: mime.to_string(),
            width: None,
            height: None,
            steps_applied: Vec::new(),
        });
    }

    let mut steps = Vec::new();

    let img = ImageReader::new(Cursor::new(&data))
        .with_guessed_format()
        .context("Format detection failed")?
        .decode()
        .context("Image decode failed")?;

    // Upright the image from its EXIF orientation before any geometry work.
    let mut img = image_ops::apply_exif_orientation(img, &data);
    steps.push(STEP_AUTO_ROTATE.to_string());

    if img.width().max(img.height()) > policy.max_dimension {
        // `resize` with both bounds preserves aspect ratio; only reached when
        // the image exceeds the bound, so this never upscales.
        img = img.resize(
            policy.max_dimension,
            policy.max_dimension,
            image::imageops::FilterType::Lanczos3,
        );
        steps.push(STEP_RESIZE.to_string());
    }

    let (encoded, content_type) = if image_ops::has_alpha(&img) {
        steps.push(STEP_PNG_OPTIMIZATION.to_string());
        (image_ops::encode_png(&img)?, "image/png".to_string())
    } else {
        steps.push(STEP_JPEG_CONVERSION.to_string());
        (
            image_ops::encode_jpeg(&img, policy.jpeg_quality)?,
            "image/jpeg".to_string(),
        )
    };

    // If the result still crowds the global upload limit, try one harder
    // lossy pass and keep it only when strictly smaller.
    let mut final_data = encoded;
    if content_type == "image/jpeg" && final_data.len() > max_upload_bytes * 8 / 10 {
        let quality = policy
            .jpeg_quality
            .saturating_sub(EXTRA_PASS_QUALITY_DROP)
            .max(EXTRA_PASS_QUALITY_FLOOR);
        let recompressed = image_ops::encode_jpeg(&img, quality)?;
        if recompressed.len() < final_data.len() {
            final_data = recompressed;
            steps.push(STEP_EXTRA_COMPRESSION.to_string());
        }
    }

    Ok(ProcessedFile {
        data: final_data,
        content_type,
        width: Some(img.width()),
        height: Some(img.height()),
        steps_applied: steps,
    })
}
