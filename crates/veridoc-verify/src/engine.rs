//! Verification engine trait and errors.

use async_trait::async_trait;
use thiserror::Error;
use veridoc_core::models::{Document, VerificationResult};
use veridoc_storage::StorageError;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// The remote provider could not be reached or answered abnormally.
    /// Transient from the cascade's point of view.
    #[error("Verification provider error: {0}")]
    Provider(String),

    /// The stored object could not be fetched for re-inspection.
    #[error("Storage error during verification: {0}")]
    Storage(#[from] StorageError),

    /// Every configured tier failed; the caller decides the terminal state.
    #[error("Verification unavailable: {0}")]
    Unavailable(String),
}

pub type VerifyResult = Result<VerificationResult, VerifyError>;

/// A verification tier (or a cascade of them).
///
/// `Ok` carries a decision, accepted or rejected; `Err` means this engine
/// could not reach a decision at all.
#[async_trait]
pub trait VerificationEngine: Send + Sync {
    async fn verify(&self, document: &Document) -> VerifyResult;
}
