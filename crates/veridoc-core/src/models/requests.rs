//! Request/response DTOs for the documents API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::document::{DocumentStatus, DocumentType};

/// Query filters for `GET /documents`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListDocumentsQuery {
    #[serde(rename = "documentType")]
    pub document_type: Option<DocumentType>,
    pub status: Option<DocumentStatus>,
}

/// Body of `POST /documents/upload-url`: request a presigned direct-upload URL.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    pub file_name: String,
    /// Declared content type; the presigned PUT is bound to it and it is
    /// re-checked against the stored object on confirm.
    pub file_type: String,
    pub document_type: DocumentType,
    /// Expected object size in bytes, verified on confirm.
    pub file_size: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub s3_key: String,
    pub expires_at: DateTime<Utc>,
}

/// Body of `POST /documents/confirm-upload`: finalize a direct upload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmUploadRequest {
    pub s3_key: String,
    pub original_name: String,
    pub document_type: DocumentType,
    pub size_bytes: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrlResponse {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Body of `PUT /documents/{id}/status` (admin): manual status transition,
/// accepted regardless of the document's current state.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: DocumentStatus,
    pub rejection_reason: Option<String>,
}
