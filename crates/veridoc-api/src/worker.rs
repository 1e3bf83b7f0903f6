//! Background verification queue.
//!
//! The upload path never waits on verification: it submits the document id
//! here and responds. Concurrency is bounded by a semaphore, duplicate
//! submissions for the same id are dropped while one is in flight, and the
//! compare-and-set `begin_processing` transition makes a duplicate that
//! slips past the in-process guard harmless.
//!
//! Invariant: a submitted document always leaves PROCESSING. Any error or
//! panic in the verification task lands it in REJECTED with reason
//! "Verification process failed".

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use uuid::Uuid;
use veridoc_db::DocumentRepository;
use veridoc_verify::VerificationEngine;

const FAILSAFE_REASON: &str = "Verification process failed";
const DEFAULT_REJECTION_REASON: &str = "Document verification failed";

pub struct VerificationQueue {
    repository: Arc<dyn DocumentRepository>,
    engine: Arc<dyn VerificationEngine>,
    semaphore: Arc<Semaphore>,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
    max_workers: usize,
    shutting_down: Arc<AtomicBool>,
}

impl VerificationQueue {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        engine: Arc<dyn VerificationEngine>,
        max_workers: usize,
    ) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            repository,
            engine,
            semaphore: Arc::new(Semaphore::new(max_workers)),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            max_workers,
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Submit a document for background verification. Returns false when the
    /// submission was dropped (duplicate in flight, or shutting down).
    pub fn submit(&self, document_id: Uuid) -> bool {
        if self.shutting_down.load(Ordering::SeqCst) {
            tracing::warn!(document_id = %document_id, "Queue shutting down, submission dropped");
            return false;
        }
        {
            let mut guard = lock_unpoisoned(&self.in_flight);
            if !guard.insert(document_id) {
                tracing::debug!(document_id = %document_id, "Verification already in flight");
                return false;
            }
        }

        let repository = Arc::clone(&self.repository);
        let engine = Arc::clone(&self.engine);
        let semaphore = Arc::clone(&self.semaphore);
        let in_flight = Arc::clone(&self.in_flight);

        tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    lock_unpoisoned(&in_flight).remove(&document_id);
                    return;
                }
            };

            // The inner spawn isolates panics: a panicked task surfaces as a
            // JoinError here instead of killing the worker.
            let task = tokio::spawn(run_verification(
                Arc::clone(&repository),
                Arc::clone(&engine),
                document_id,
            ));

            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(document_id = %document_id, error = %e, "Verification failed");
                    fail_safe(&repository, document_id).await;
                }
                Err(join_error) => {
                    tracing::error!(document_id = %document_id, error = %join_error, "Verification task panicked");
                    fail_safe(&repository, document_id).await;
                }
            }

            lock_unpoisoned(&in_flight).remove(&document_id);
        });

        true
    }

    /// Stop accepting submissions and wait for in-flight verifications.
    pub async fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        if self
            .semaphore
            .acquire_many(self.max_workers as u32)
            .await
            .is_ok()
        {
            tracing::info!("Verification queue drained");
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

async fn run_verification(
    repository: Arc<dyn DocumentRepository>,
    engine: Arc<dyn VerificationEngine>,
    document_id: Uuid,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // CAS claim; a document that is no longer UPLOADED (already claimed,
    // already terminal, or deleted) is left alone.
    let Some(document) = repository
        .begin_processing(document_id)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?
    else {
        tracing::debug!(document_id = %document_id, "Document not claimable, skipping verification");
        return Ok(());
    };

    let result = engine
        .verify(&document)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let details = serde_json::to_value(&result)?;

    if result.is_valid {
        repository
            .finish_verified(document_id, details)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        tracing::info!(
            document_id = %document_id,
            owner_id = %document.owner_id,
            confidence = result.confidence,
            tier = ?result.tier,
            duration_ms = start.elapsed().as_millis() as u64,
            "Document verified"
        );
    } else {
        let reason = result
            .reason
            .clone()
            .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());
        repository
            .finish_rejected(document_id, &reason, Some(details))
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        tracing::info!(
            document_id = %document_id,
            owner_id = %document.owner_id,
            confidence = result.confidence,
            tier = ?result.tier,
            reason = %reason,
            duration_ms = start.elapsed().as_millis() as u64,
            "Document rejected"
        );
    }

    Ok(())
}

/// Terminal fallback: the document must not stay in PROCESSING.
async fn fail_safe(repository: &Arc<dyn DocumentRepository>, document_id: Uuid) {
    match repository
        .finish_rejected(document_id, FAILSAFE_REASON, None)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::debug!(document_id = %document_id, "No PROCESSING record to fail over");
        }
        Err(e) => {
            tracing::error!(document_id = %document_id, error = %e, "Failed to record verification failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::time::Duration;
    use veridoc_core::models::{
        Document, DocumentStatus, DocumentType, ProcessingMetadata, VerificationDetails,
        VerificationResult, VerificationTier,
    };
    use veridoc_db::InMemoryDocumentRepository;
    use veridoc_verify::{VerifyError, VerifyResult};

    struct AcceptAll;
    #[async_trait]
    impl VerificationEngine for AcceptAll {
        async fn verify(&self, _document: &Document) -> VerifyResult {
            Ok(VerificationResult::accepted(
                0.95,
                VerificationTier::Mock,
                VerificationDetails::default(),
            ))
        }
    }

    struct RejectAllWithoutReason;
    #[async_trait]
    impl VerificationEngine for RejectAllWithoutReason {
        async fn verify(&self, _document: &Document) -> VerifyResult {
            let mut result = VerificationResult::rejected(
                0.2,
                "placeholder",
                VerificationTier::Basic,
                VerificationDetails::default(),
            );
            result.reason = None;
            Ok(result)
        }
    }

    struct AlwaysErrors;
    #[async_trait]
    impl VerificationEngine for AlwaysErrors {
        async fn verify(&self, _document: &Document) -> VerifyResult {
            Err(VerifyError::Unavailable("all tiers down".to_string()))
        }
    }

    struct Panics;
    #[async_trait]
    impl VerificationEngine for Panics {
        async fn verify(&self, _document: &Document) -> VerifyResult {
            panic!("verification blew up");
        }
    }

    fn document() -> Document {
        let owner = Uuid::new_v4();
        Document {
            id: Uuid::new_v4(),
            owner_id: owner,
            storage_key: format!("{owner}/id_card/x.jpg"),
            storage_location: "http://localhost/x.jpg".to_string(),
            original_name: "x.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size_bytes: 512,
            document_type: DocumentType::IdCard,
            status: DocumentStatus::Uploaded,
            uploaded_at: Utc::now(),
            verified_at: None,
            rejected_at: None,
            rejection_reason: None,
            processing_metadata: ProcessingMetadata::default(),
            version: 1,
        }
    }

    async fn wait_for_terminal(
        repo: &InMemoryDocumentRepository,
        id: Uuid,
    ) -> Document {
        for _ in 0..100 {
            if let Some(doc) = repo.get_any(id).await.unwrap() {
                if doc.status.is_terminal() {
                    return doc;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("document never reached a terminal state");
    }

    #[tokio::test]
    async fn test_accepted_document_lands_in_verified() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo.create(&document()).await.unwrap();
        let queue = VerificationQueue::new(
            Arc::new(repo.clone()),
            Arc::new(AcceptAll),
            2,
        );

        assert!(queue.submit(doc.id));
        let done = wait_for_terminal(&repo, doc.id).await;
        assert_eq!(done.status, DocumentStatus::Verified);
        assert!(done.verified_at.is_some());
        assert!(done.processing_metadata.verification.is_some());
    }

    #[tokio::test]
    async fn test_rejection_without_reason_uses_default() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo.create(&document()).await.unwrap();
        let queue = VerificationQueue::new(
            Arc::new(repo.clone()),
            Arc::new(RejectAllWithoutReason),
            2,
        );

        queue.submit(doc.id);
        let done = wait_for_terminal(&repo, doc.id).await;
        assert_eq!(done.status, DocumentStatus::Rejected);
        assert_eq!(
            done.rejection_reason.as_deref(),
            Some("Document verification failed")
        );
    }

    #[tokio::test]
    async fn test_engine_error_triggers_fail_safe() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo.create(&document()).await.unwrap();
        let queue = VerificationQueue::new(
            Arc::new(repo.clone()),
            Arc::new(AlwaysErrors),
            2,
        );

        queue.submit(doc.id);
        let done = wait_for_terminal(&repo, doc.id).await;
        assert_eq!(done.status, DocumentStatus::Rejected);
        assert_eq!(
            done.rejection_reason.as_deref(),
            Some("Verification process failed")
        );
    }

    #[tokio::test]
    async fn test_panicking_engine_triggers_fail_safe() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo.create(&document()).await.unwrap();
        let queue = VerificationQueue::new(
            Arc::new(repo.clone()),
            Arc::new(Panics),
            2,
        );

        queue.submit(doc.id);
        let done = wait_for_terminal(&repo, doc.id).await;
        assert_eq!(done.status, DocumentStatus::Rejected);
        assert_eq!(
            done.rejection_reason.as_deref(),
            Some("Verification process failed")
        );
    }

    #[tokio::test]
    async fn test_duplicate_submission_is_dropped() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo.create(&document()).await.unwrap();
        let queue = VerificationQueue::new(
            Arc::new(repo.clone()),
            Arc::new(AcceptAll),
            1,
        );

        let first = queue.submit(doc.id);
        let second = queue.submit(doc.id);
        assert!(first);
        assert!(!second);
        wait_for_terminal(&repo, doc.id).await;
    }

    #[tokio::test]
    async fn test_terminal_document_is_not_reverified() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo.create(&document()).await.unwrap();
        repo.begin_processing(doc.id).await.unwrap();
        let verified = repo
            .finish_verified(doc.id, serde_json::json!({"tier": "mock"}))
            .await
            .unwrap()
            .unwrap();

        let queue = VerificationQueue::new(
            Arc::new(repo.clone()),
            Arc::new(RejectAllWithoutReason),
            2,
        );
        queue.submit(doc.id);
        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.shutdown().await;

        let after = repo.get_any(doc.id).await.unwrap().unwrap();
        assert_eq!(after.status, DocumentStatus::Verified);
        assert_eq!(after.verified_at, verified.verified_at);
    }

    #[tokio::test]
    async fn test_shutdown_drains_and_refuses_new_work() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo.create(&document()).await.unwrap();
        let queue = VerificationQueue::new(
            Arc::new(repo.clone()),
            Arc::new(AcceptAll),
            2,
        );
        queue.submit(doc.id);
        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.shutdown().await;

        let after = repo.get_any(doc.id).await.unwrap().unwrap();
        assert!(after.status.is_terminal());
        assert!(!queue.submit(Uuid::new_v4()));
    }
}
