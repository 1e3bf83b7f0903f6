//! Document routes: upload, list, get, download, delete.

use crate::auth::AuthContext;
use crate::error::HttpAppError;
use crate::response::{message_only, ApiResponse};
use crate::services::upload::handle_upload;
use crate::state::AppState;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use veridoc_core::models::{
    DocumentResponse, DocumentType, DownloadUrlResponse, ListDocumentsQuery,
};
use veridoc_core::AppError;
use veridoc_db::DocumentFilter;
use veridoc_storage::StorageError;

struct UploadForm {
    data: Vec<u8>,
    file_name: String,
    content_type: String,
    document_type: DocumentType,
}

/// Pull the `file` and `documentType` fields out of the multipart body.
async fn parse_upload_form(mut multipart: Multipart) -> Result<UploadForm, HttpAppError> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut document_type: Option<DocumentType> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?;
                file = Some((data.to_vec(), file_name, content_type));
            }
            Some("documentType") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Malformed field: {}", e)))?;
                let parsed = text
                    .parse::<DocumentType>()
                    .map_err(AppError::InvalidInput)?;
                document_type = Some(parsed);
            }
            _ => {}
        }
    }

    let (data, file_name, content_type) =
        file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
    let document_type = document_type
        .ok_or_else(|| AppError::InvalidInput("Missing documentType field".to_string()))?;

    Ok(UploadForm {
        data,
        file_name,
        content_type,
        document_type,
    })
}

#[utoipa::path(
    post,
    path = "/documents/upload",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document created", body = ApiResponse<DocumentResponse>),
        (status = 400, description = "File rejected or malformed request"),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = parse_upload_form(multipart).await?;

    let document = handle_upload(
        &state,
        auth.user_id,
        form.data,
        &form.content_type,
        &form.file_name,
        form.document_type,
    )
    .await?;

    if state.config.auto_verification_enabled {
        state.queue.submit(document.id);
    }

    Ok(ApiResponse::created(
        "Document uploaded successfully",
        DocumentResponse::from(document),
    ))
}

#[utoipa::path(
    get,
    path = "/documents",
    tag = "documents",
    params(ListDocumentsQuery),
    responses(
        (status = 200, description = "Caller's documents", body = ApiResponse<Vec<DocumentResponse>>),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let documents = state
        .repository
        .list(
            auth.user_id,
            DocumentFilter {
                document_type: query.document_type,
                status: query.status,
            },
        )
        .await?;

    let data: Vec<DocumentResponse> = documents.into_iter().map(DocumentResponse::from).collect();
    Ok(ApiResponse::ok("Documents retrieved successfully", data))
}

#[utoipa::path(
    get,
    path = "/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document", body = ApiResponse<DocumentResponse>),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "Unknown or foreign document id")
    )
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .repository
        .get(auth.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    Ok(ApiResponse::ok(
        "Document retrieved successfully",
        DocumentResponse::from(document),
    ))
}

#[utoipa::path(
    get,
    path = "/documents/{id}/download",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Presigned download URL", body = ApiResponse<DownloadUrlResponse>),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "Unknown or foreign document id")
    )
)]
pub async fn download_document(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .repository
        .get(auth.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    let ttl = Duration::from_secs(state.config.presign_ttl_secs);
    let url = state
        .storage
        .presign_download(&document.storage_key, ttl)
        .await?;

    Ok(ApiResponse::ok(
        "Download URL generated successfully",
        DownloadUrlResponse {
            url,
            expires_at: Utc::now() + ChronoDuration::seconds(state.config.presign_ttl_secs as i64),
        },
    ))
}

#[utoipa::path(
    delete,
    path = "/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document deleted"),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "Unknown or foreign document id")
    )
)]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .repository
        .get(auth.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    // Object first, record second: a failed object delete keeps the record,
    // so the document stays visible and the delete can be retried.
    match state.storage.delete(&document.storage_key).await {
        Ok(()) | Err(StorageError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    state.repository.delete(auth.user_id, id).await?;

    tracing::info!(
        document_id = %id,
        owner_id = %auth.user_id,
        storage_key = %document.storage_key,
        "Document deleted"
    );

    Ok(message_only(StatusCode::OK, "Document deleted successfully"))
}
