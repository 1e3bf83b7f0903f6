//! In-memory document repository.
//!
//! Same contract as the Postgres implementation, backed by a mutex-guarded
//! map. Used by the test suite and by provider-less development setups where
//! no DATABASE_URL is configured.

use crate::repository::{DocumentFilter, DocumentRepository};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use veridoc_core::models::{Document, DocumentStatus};
use veridoc_core::AppError;

#[derive(Clone, Default)]
pub struct InMemoryDocumentRepository {
    documents: Arc<Mutex<HashMap<Uuid, Document>>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Document>>, AppError> {
        self.documents
            .lock()
            .map_err(|_| AppError::Database("Document store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create(&self, document: &Document) -> Result<Document, AppError> {
        let mut docs = self.lock()?;
        if docs.contains_key(&document.id) {
            return Err(AppError::Database(format!(
                "Duplicate document id {}",
                document.id
            )));
        }
        docs.insert(document.id, document.clone());
        Ok(document.clone())
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Document>, AppError> {
        let docs = self.lock()?;
        Ok(docs.get(&id).filter(|d| d.owner_id == owner_id).cloned())
    }

    async fn get_any(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let docs = self.lock()?;
        Ok(docs.get(&id).cloned())
    }

    async fn list(
        &self,
        owner_id: Uuid,
        filter: DocumentFilter,
    ) -> Result<Vec<Document>, AppError> {
        let docs = self.lock()?;
        let mut out: Vec<Document> = docs
            .values()
            .filter(|d| d.owner_id == owner_id)
            .filter(|d| filter.document_type.map_or(true, |t| d.document_type == t))
            .filter(|d| filter.status.map_or(true, |s| d.status == s))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(out)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Document>, AppError> {
        let mut docs = self.lock()?;
        match docs.get(&id) {
            Some(d) if d.owner_id == owner_id => Ok(docs.remove(&id)),
            _ => Ok(None),
        }
    }

    async fn begin_processing(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let mut docs = self.lock()?;
        match docs.get_mut(&id) {
            Some(d) if d.status == DocumentStatus::Uploaded => {
                d.status = DocumentStatus::Processing;
                d.version += 1;
                Ok(Some(d.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn finish_verified(
        &self,
        id: Uuid,
        verification: serde_json::Value,
    ) -> Result<Option<Document>, AppError> {
        let mut docs = self.lock()?;
        match docs.get_mut(&id) {
            Some(d) if d.status == DocumentStatus::Processing => {
                d.status = DocumentStatus::Verified;
                d.verified_at = Some(Utc::now());
                d.processing_metadata.verification = Some(verification);
                d.version += 1;
                Ok(Some(d.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn finish_rejected(
        &self,
        id: Uuid,
        reason: &str,
        verification: Option<serde_json::Value>,
    ) -> Result<Option<Document>, AppError> {
        let mut docs = self.lock()?;
        match docs.get_mut(&id) {
            Some(d) if d.status == DocumentStatus::Processing => {
                d.status = DocumentStatus::Rejected;
                d.rejected_at = Some(Utc::now());
                d.rejection_reason = Some(reason.to_string());
                if verification.is_some() {
                    d.processing_metadata.verification = verification;
                }
                d.version += 1;
                Ok(Some(d.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn admin_set_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
        rejection_reason: Option<String>,
    ) -> Result<Option<Document>, AppError> {
        let mut docs = self.lock()?;
        match docs.get_mut(&id) {
            Some(d) => {
                let now = Utc::now();
                d.status = status;
                // Stamps follow the target status alone: verified_at only on
                // VERIFIED, rejected_at and the reason only on REJECTED.
                d.verified_at = matches!(status, DocumentStatus::Verified).then_some(now);
                d.rejected_at = matches!(status, DocumentStatus::Rejected).then_some(now);
                d.rejection_reason = if status == DocumentStatus::Rejected {
                    rejection_reason
                } else {
                    None
                };
                d.version += 1;
                Ok(Some(d.clone()))
            }
            None => Ok(None),
        }
    }
}
