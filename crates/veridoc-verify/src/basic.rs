//! Tier 2: basic structural verification.
//!
//! Re-downloads the stored object and re-applies the upload-time checks.
//! Confidence is the fraction of checks passed; the provider-grade analysis
//! this replaces can only be approximated, so the bar is deliberately high.

use crate::engine::{VerificationEngine, VerifyError, VerifyResult};
use async_trait::async_trait;
use std::sync::Arc;
use veridoc_core::models::{Document, VerificationDetails, VerificationResult, VerificationTier};
use veridoc_processing::{sniff, Sniffed, UploadValidator};
use veridoc_storage::StorageGateway;

/// Fraction of checks that must pass for acceptance.
const ACCEPT_THRESHOLD: f64 = 0.75;

pub struct BasicVerifier {
    storage: Arc<dyn StorageGateway>,
    max_size_bytes: usize,
    allowed_mime_types: Vec<String>,
}

impl BasicVerifier {
    pub fn new(
        storage: Arc<dyn StorageGateway>,
        max_size_bytes: usize,
        allowed_mime_types: Vec<String>,
    ) -> Self {
        Self {
            storage,
            max_size_bytes,
            allowed_mime_types,
        }
    }

    /// Run the structural checks over a downloaded buffer.
    fn run_checks(&self, buffer: &[u8], document: &Document) -> (u32, u32, Vec<&'static str>) {
        let mut passed = 0u32;
        let mut failed = Vec::new();
        let total = 4u32;

        if !buffer.is_empty() {
            passed += 1;
        } else {
            failed.push("object is empty");
        }

        if buffer.len() <= self.max_size_bytes {
            passed += 1;
        } else {
            failed.push("object exceeds size limit");
        }

        match sniff(buffer) {
            Sniffed::Mime(detected) if detected == document.mime_type => passed += 1,
            _ => failed.push("signature does not match recorded content type"),
        }

        let validator =
            UploadValidator::new(self.max_size_bytes, self.allowed_mime_types.clone());
        if validator.validate(buffer, &document.mime_type).is_ok() {
            passed += 1;
        } else {
            failed.push("structural validation failed");
        }

        (passed, total, failed)
    }
}

#[async_trait]
impl VerificationEngine for BasicVerifier {
    async fn verify(&self, document: &Document) -> VerifyResult {
        let buffer = self.storage.download(&document.storage_key).await?;

        let (passed, total, failed) = self.run_checks(&buffer, document);
        let confidence = f64::from(passed) / f64::from(total);

        let details = VerificationDetails {
            checks_passed: Some(passed),
            checks_total: Some(total),
            ..Default::default()
        };

        tracing::debug!(
            document_id = %document.id,
            checks_passed = passed,
            checks_total = total,
            "Basic verification completed"
        );

        if confidence >= ACCEPT_THRESHOLD {
            Ok(VerificationResult::accepted(
                confidence,
                VerificationTier::Basic,
                details,
            ))
        } else {
            Ok(VerificationResult::rejected(
                confidence,
                format!("Structural verification failed: {}", failed.join("; ")),
                VerificationTier::Basic,
                details,
            ))
        }
    }
}
