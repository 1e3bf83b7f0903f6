//! Presigned direct-upload routes.
//!
//! Two-step flow for large files: the caller asks for a time-bounded PUT URL
//! bound to an exact content type, uploads directly to storage, then
//! confirms. Confirmation checks the object exists, matches what was
//! promised, and passes the same content validation as a multipart upload
//! before any record is created.

use crate::auth::AuthContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::pending::PendingUpload;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use veridoc_core::models::{
    ConfirmUploadRequest, Document, DocumentResponse, DocumentStatus, ProcessingMetadata,
    UploadUrlRequest, UploadUrlResponse,
};
use veridoc_core::AppError;
use veridoc_storage::{keys, StorageError};

/// A confirmed object that failed validation is unreachable by any record;
/// remove it before rejecting so nothing lingers in storage.
async fn remove_rejected_object(state: &AppState, storage_key: &str) {
    match state.storage.delete(storage_key).await {
        Ok(()) | Err(StorageError::NotFound(_)) => {}
        Err(e) => {
            tracing::warn!(storage_key = %storage_key, error = %e, "Failed to remove rejected direct upload");
        }
    }
}

fn mime_for_key(key: &str) -> &'static str {
    match key.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[utoipa::path(
    post,
    path = "/documents/upload-url",
    tag = "documents",
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "Presigned upload URL", body = ApiResponse<UploadUrlResponse>),
        (status = 400, description = "Disallowed type or size"),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn create_upload_url(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ValidatedJson(request): ValidatedJson<UploadUrlRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state
        .config
        .allowed_mime_types
        .iter()
        .any(|m| m == &request.file_type)
    {
        return Err(AppError::InvalidInput(format!(
            "Content type not allowed: {}",
            request.file_type
        ))
        .into());
    }
    if request.file_size <= 0 || request.file_size as usize > state.config.max_upload_bytes {
        return Err(AppError::InvalidInput(format!(
            "File size {} outside allowed range (max {} bytes)",
            request.file_size, state.config.max_upload_bytes
        ))
        .into());
    }

    let storage_key = keys::document_key(
        auth.user_id,
        request.document_type,
        keys::extension_for_mime(&request.file_type),
    );
    let ttl = Duration::from_secs(state.config.upload_url_ttl_secs);
    let upload_url = state
        .storage
        .presign_upload(&storage_key, &request.file_type, ttl)
        .await?;
    let expires_at = Utc::now() + ChronoDuration::seconds(state.config.upload_url_ttl_secs as i64);

    state.pending_uploads.register(
        storage_key.clone(),
        PendingUpload {
            owner_id: auth.user_id,
            document_type: request.document_type,
            content_type: request.file_type.clone(),
            expected_size: request.file_size,
            expires_at,
        },
    );

    tracing::info!(
        owner_id = %auth.user_id,
        document_type = %request.document_type,
        storage_key = %storage_key,
        "Presigned upload URL issued"
    );

    Ok(ApiResponse::ok(
        "Upload URL generated successfully",
        UploadUrlResponse {
            upload_url,
            s3_key: storage_key,
            expires_at,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/documents/confirm-upload",
    tag = "documents",
    request_body = ConfirmUploadRequest,
    responses(
        (status = 201, description = "Document created", body = ApiResponse<DocumentResponse>),
        (status = 400, description = "Object missing or mismatched"),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "Key belongs to another owner")
    )
)]
pub async fn confirm_upload(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ValidatedJson(request): ValidatedJson<ConfirmUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    keys::validate_key(&request.s3_key)?;
    // A key under another owner's prefix is indistinguishable from a missing
    // document.
    if !keys::key_belongs_to(&request.s3_key, auth.user_id) {
        return Err(AppError::NotFound("Document not found".to_string()).into());
    }

    let head = match state.storage.head(&request.s3_key).await {
        Ok(head) => head,
        Err(StorageError::NotFound(_)) => {
            return Err(AppError::InvalidInput(
                "Uploaded object not found in storage".to_string(),
            )
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    // The session recorded at upload-url time binds the confirmation to what
    // was promised. After a restart there is no session; the object's own
    // metadata is all we can check against.
    let session = state.pending_uploads.take(&request.s3_key);
    if let Some(session) = &session {
        if session.owner_id != auth.user_id {
            return Err(AppError::NotFound("Document not found".to_string()).into());
        }
        if session.document_type != request.document_type {
            return Err(AppError::InvalidInput(
                "Document type does not match the upload session".to_string(),
            )
            .into());
        }
        if head.size_bytes as i64 != session.expected_size {
            return Err(AppError::InvalidInput(format!(
                "Uploaded object size {} does not match expected {}",
                head.size_bytes, session.expected_size
            ))
            .into());
        }
    } else if head.size_bytes as i64 != request.size_bytes {
        return Err(AppError::InvalidInput(format!(
            "Uploaded object size {} does not match declared {}",
            head.size_bytes, request.size_bytes
        ))
        .into());
    }

    // The object was written by the caller, not this service, so it gets the
    // same validation the multipart path runs before any record exists. The
    // size and security limits were already enforced on the declared metadata;
    // this checks the bytes themselves.
    let declared_mime = session
        .as_ref()
        .map(|s| s.content_type.clone())
        .or_else(|| head.content_type.clone())
        .unwrap_or_else(|| mime_for_key(&request.s3_key).to_string());
    let data = state.storage.download(&request.s3_key).await?;
    let validator = state.validator.clone();
    let outcome = tokio::task::spawn_blocking(move || validator.validate(&data, &declared_mime))
        .await
        .map_err(|e| AppError::Internal(format!("Validation task failed: {}", e)))?;
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(rejected) => {
            remove_rejected_object(&state, &request.s3_key).await;
            return Err(rejected.into());
        }
    };
    if let Some(session) = &session {
        if outcome.detected_mime != session.content_type {
            remove_rejected_object(&state, &request.s3_key).await;
            return Err(AppError::InvalidInput(format!(
                "Uploaded content is {}, upload session promised {}",
                outcome.detected_mime, session.content_type
            ))
            .into());
        }
    }
    let mime_type = outcome.detected_mime.to_string();

    let location = state
        .storage
        .presign_download(&request.s3_key, Duration::from_secs(state.config.presign_ttl_secs))
        .await
        .unwrap_or_else(|_| request.s3_key.clone());

    let document = Document {
        id: Uuid::new_v4(),
        owner_id: auth.user_id,
        storage_key: request.s3_key.clone(),
        storage_location: location,
        original_name: crate::services::upload::sanitize_filename(&request.original_name),
        mime_type,
        size_bytes: head.size_bytes as i64,
        document_type: request.document_type,
        status: DocumentStatus::Uploaded,
        uploaded_at: Utc::now(),
        verified_at: None,
        rejected_at: None,
        rejection_reason: None,
        processing_metadata: ProcessingMetadata {
            width: outcome.dimensions.map(|(w, _)| w),
            height: outcome.dimensions.map(|(_, h)| h),
            ..ProcessingMetadata::default()
        },
        version: 1,
    };

    let created = state.repository.create(&document).await?;

    if state.config.auto_verification_enabled {
        state.queue.submit(created.id);
    }

    tracing::info!(
        document_id = %created.id,
        owner_id = %auth.user_id,
        storage_key = %created.storage_key,
        size_bytes = created.size_bytes,
        "Direct upload confirmed"
    );

    Ok(ApiResponse::created(
        "Document created successfully",
        DocumentResponse::from(created),
    ))
}
