//! Tier 3: deterministic mock verifier.
//!
//! For environments without a live provider. The verdict is a pure function
//! of the storage key, so repeated runs and test fixtures are stable.

use crate::engine::{VerificationEngine, VerifyResult};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use veridoc_core::models::{Document, VerificationDetails, VerificationResult, VerificationTier};

/// Roughly one in sixteen documents gets rejected, keyed off the digest.
const REJECT_BUCKET: u8 = 0;

#[derive(Debug, Default, Clone)]
pub struct MockVerifier;

impl MockVerifier {
    pub fn new() -> Self {
        Self
    }

    fn decide(&self, storage_key: &str) -> VerificationResult {
        let digest = Sha256::digest(storage_key.as_bytes());
        // Stable pseudo-quality in [0.70, 0.99].
        let quality = 0.70 + f64::from(digest[1] % 30) / 100.0;
        let details = VerificationDetails {
            quality_score: Some(quality),
            tampering_detected: Some(false),
            ..Default::default()
        };

        if digest[0] % 16 == REJECT_BUCKET {
            VerificationResult::rejected(
                quality,
                "Mock verification rejected the document",
                VerificationTier::Mock,
                details,
            )
        } else {
            VerificationResult::accepted(quality, VerificationTier::Mock, details)
        }
    }
}

#[async_trait]
impl VerificationEngine for MockVerifier {
    async fn verify(&self, document: &Document) -> VerifyResult {
        Ok(self.decide(&document.storage_key))
    }
}
