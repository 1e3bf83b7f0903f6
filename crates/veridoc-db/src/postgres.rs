//! Postgres implementation of the document repository.
//!
//! Raw `query_as` with string SQL; enums travel as TEXT and
//! `processing_metadata` as JSONB. Status transitions are single-statement
//! compare-and-set updates, so two racing verification tasks can never both
//! claim the same document.

use crate::repository::{DocumentFilter, DocumentRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use std::str::FromStr;
use uuid::Uuid;
use veridoc_core::models::{Document, DocumentStatus, DocumentType, ProcessingMetadata};
use veridoc_core::AppError;

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    owner_id: Uuid,
    storage_key: String,
    storage_location: String,
    original_name: String,
    mime_type: String,
    size_bytes: i64,
    document_type: String,
    status: String,
    uploaded_at: DateTime<Utc>,
    verified_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    processing_metadata: serde_json::Value,
    version: i32,
}

impl DocumentRow {
    fn into_document(self) -> Result<Document, AppError> {
        let document_type = DocumentType::from_str(&self.document_type)
            .map_err(AppError::Database)?;
        let status = DocumentStatus::from_str(&self.status).map_err(AppError::Database)?;
        let processing_metadata: ProcessingMetadata =
            serde_json::from_value(self.processing_metadata)
                .map_err(|e| AppError::Database(format!("Malformed processing_metadata: {}", e)))?;
        Ok(Document {
            id: self.id,
            owner_id: self.owner_id,
            storage_key: self.storage_key,
            storage_location: self.storage_location,
            original_name: self.original_name,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            document_type,
            status,
            uploaded_at: self.uploaded_at,
            verified_at: self.verified_at,
            rejected_at: self.rejected_at,
            rejection_reason: self.rejection_reason,
            processing_metadata,
            version: self.version,
        })
    }
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::Database(e.to_string())
}

#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_opt(row: Option<DocumentRow>) -> Result<Option<Document>, AppError> {
        row.map(DocumentRow::into_document).transpose()
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    #[tracing::instrument(skip(self, document), fields(db.table = "documents", db.operation = "insert", document_id = %document.id))]
    async fn create(&self, document: &Document) -> Result<Document, AppError> {
        let metadata = serde_json::to_value(&document.processing_metadata)
            .map_err(|e| AppError::Database(e.to_string()))?;
        let row: DocumentRow = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            INSERT INTO documents (
                id, owner_id, storage_key, storage_location,
                original_name, mime_type, size_bytes,
                document_type, status, uploaded_at,
                verified_at, rejected_at, rejection_reason,
                processing_metadata, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(document.id)
        .bind(document.owner_id)
        .bind(&document.storage_key)
        .bind(&document.storage_location)
        .bind(&document.original_name)
        .bind(&document.mime_type)
        .bind(document.size_bytes)
        .bind(document.document_type.as_str())
        .bind(document.status.as_str())
        .bind(document.uploaded_at)
        .bind(document.verified_at)
        .bind(document.rejected_at)
        .bind(&document.rejection_reason)
        .bind(&metadata)
        .bind(document.version)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        row.into_document()
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Document>, AppError> {
        let row: Option<DocumentRow> = sqlx::query_as::<Postgres, DocumentRow>(
            "SELECT * FROM documents WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Self::row_opt(row)
    }

    async fn get_any(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let row: Option<DocumentRow> =
            sqlx::query_as::<Postgres, DocumentRow>("SELECT * FROM documents WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        Self::row_opt(row)
    }

    async fn list(
        &self,
        owner_id: Uuid,
        filter: DocumentFilter,
    ) -> Result<Vec<Document>, AppError> {
        let rows: Vec<DocumentRow> = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            SELECT * FROM documents
            WHERE owner_id = $1
              AND ($2::text IS NULL OR document_type = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(filter.document_type.map(|t| t.as_str()))
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "delete"))]
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Document>, AppError> {
        let row: Option<DocumentRow> = sqlx::query_as::<Postgres, DocumentRow>(
            "DELETE FROM documents WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Self::row_opt(row)
    }

    async fn begin_processing(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let row: Option<DocumentRow> = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            UPDATE documents
            SET status = 'PROCESSING', version = version + 1
            WHERE id = $1 AND status = 'UPLOADED'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Self::row_opt(row)
    }

    async fn finish_verified(
        &self,
        id: Uuid,
        verification: serde_json::Value,
    ) -> Result<Option<Document>, AppError> {
        let row: Option<DocumentRow> = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            UPDATE documents
            SET status = 'VERIFIED',
                verified_at = $2,
                processing_metadata = processing_metadata || jsonb_build_object('verification', $3::jsonb),
                version = version + 1
            WHERE id = $1 AND status = 'PROCESSING'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(&verification)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Self::row_opt(row)
    }

    async fn finish_rejected(
        &self,
        id: Uuid,
        reason: &str,
        verification: Option<serde_json::Value>,
    ) -> Result<Option<Document>, AppError> {
        let row: Option<DocumentRow> = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            UPDATE documents
            SET status = 'REJECTED',
                rejected_at = $2,
                rejection_reason = $3,
                processing_metadata = CASE
                    WHEN $4::jsonb IS NULL THEN processing_metadata
                    ELSE processing_metadata || jsonb_build_object('verification', $4::jsonb)
                END,
                version = version + 1
            WHERE id = $1 AND status = 'PROCESSING'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(reason)
        .bind(&verification)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Self::row_opt(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "update", status = %status))]
    async fn admin_set_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
        rejection_reason: Option<String>,
    ) -> Result<Option<Document>, AppError> {
        let now = Utc::now();
        let verified_at = matches!(status, DocumentStatus::Verified).then_some(now);
        let rejected_at = matches!(status, DocumentStatus::Rejected).then_some(now);
        // Stamps follow the target status alone; a NULL bind erases the
        // opposite terminal state's leftovers.
        let rejection_reason = rejection_reason.filter(|_| status == DocumentStatus::Rejected);

        let row: Option<DocumentRow> = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            UPDATE documents
            SET status = $2,
                verified_at = $3,
                rejected_at = $4,
                rejection_reason = $5,
                version = version + 1
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(verified_at)
        .bind(rejected_at)
        .bind(rejection_reason)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Self::row_opt(row)
    }
}
