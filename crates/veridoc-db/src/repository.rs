//! Repository trait for document records.

use async_trait::async_trait;
use uuid::Uuid;
use veridoc_core::models::{Document, DocumentStatus, DocumentType};
use veridoc_core::AppError;

/// Optional filters for list queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentFilter {
    pub document_type: Option<DocumentType>,
    pub status: Option<DocumentStatus>,
}

/// Persistence operations over document records.
///
/// All reads and deletes except `get_any` are owner-scoped: a document id
/// belonging to another owner behaves exactly like a missing one. The
/// status-transition methods implement compare-and-set semantics and bump
/// `version` on every mutation; a `None` return means the precondition did
/// not hold (already claimed, already terminal, or record gone).
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, document: &Document) -> Result<Document, AppError>;

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Document>, AppError>;

    /// Unscoped fetch, used only by the background verification path and
    /// administrative routes.
    async fn get_any(&self, id: Uuid) -> Result<Option<Document>, AppError>;

    async fn list(&self, owner_id: Uuid, filter: DocumentFilter)
        -> Result<Vec<Document>, AppError>;

    /// Delete the record and return it, so the caller can clean up storage.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Document>, AppError>;

    /// Claim a document for verification: UPLOADED -> PROCESSING, only if it
    /// is still UPLOADED. This is the concurrency guard that makes duplicate
    /// verification triggers harmless.
    async fn begin_processing(&self, id: Uuid) -> Result<Option<Document>, AppError>;

    /// PROCESSING -> VERIFIED, stamping `verified_at` and merging the
    /// verification payload into `processing_metadata`.
    async fn finish_verified(
        &self,
        id: Uuid,
        verification: serde_json::Value,
    ) -> Result<Option<Document>, AppError>;

    /// PROCESSING -> REJECTED, stamping `rejected_at` and the reason.
    async fn finish_rejected(
        &self,
        id: Uuid,
        reason: &str,
        verification: Option<serde_json::Value>,
    ) -> Result<Option<Document>, AppError>;

    /// Administrative override: set any status from any state, stamping the
    /// matching timestamp. Not gated by the automatic state machine.
    async fn admin_set_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
        rejection_reason: Option<String>,
    ) -> Result<Option<Document>, AppError>;
}
