//! Upload orchestration: validate, process, store, persist.
//!
//! The synchronous half of the pipeline. Everything here completes before
//! the HTTP response; verification is handed to the queue afterwards.
//! Failure ordering matters: a rejected file performs no storage write, and
//! a failed record insert cleans up the already-stored object so no orphan
//! survives.

use crate::error::HttpAppError;
use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use veridoc_core::models::{Document, DocumentStatus, DocumentType, ProcessingMetadata};
use veridoc_core::AppError;
use veridoc_storage::{keys, StorageError, StorageGateway};

/// Longest `original_name` persisted; anything longer is truncated.
const MAX_FILENAME_LEN: usize = 255;

/// Strip path components and control characters from a client filename.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>();
    let trimmed = base.trim();
    let safe = if trimmed.is_empty() { "upload" } else { trimmed };
    safe.chars().take(MAX_FILENAME_LEN).collect()
}

/// Run the synchronous pipeline for one multipart upload and persist the
/// resulting document in UPLOADED. Submission to the verification queue is
/// the caller's last step, after the record exists.
pub async fn handle_upload(
    state: &AppState,
    owner_id: Uuid,
    data: Vec<u8>,
    declared_mime: &str,
    original_name: &str,
    document_type: DocumentType,
) -> Result<Document, HttpAppError> {
    let start = std::time::Instant::now();
    let original_name = sanitize_filename(original_name);

    // Validation decodes image headers; keep it off the async pool together
    // with the declared-type check.
    let validator = state.validator.clone();
    let declared = declared_mime.to_string();
    let (data, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = validator.validate(&data, &declared);
        (data, outcome)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Validation task failed: {}", e)))?;
    let outcome = outcome.map_err(HttpAppError::from)?;

    let processed = state
        .processor
        .process(data, outcome.detected_mime, document_type)
        .await;

    let checksum = processed.checksum_sha256();
    let size_bytes = processed.size_bytes() as i64;
    let storage_key = keys::document_key(
        owner_id,
        document_type,
        keys::extension_for_mime(&processed.content_type),
    );

    let content_type = processed.content_type.clone();
    let put = state
        .storage
        .put(&storage_key, processed.data, &content_type)
        .await
        .map_err(HttpAppError::from)?;

    let document = Document {
        id: Uuid::new_v4(),
        owner_id,
        storage_key: storage_key.clone(),
        storage_location: put.location,
        original_name,
        mime_type: content_type,
        size_bytes,
        document_type,
        status: DocumentStatus::Uploaded,
        uploaded_at: Utc::now(),
        verified_at: None,
        rejected_at: None,
        rejection_reason: None,
        processing_metadata: ProcessingMetadata {
            width: processed.width,
            height: processed.height,
            steps_applied: processed.steps_applied,
            quality_score: None,
            checksum_sha256: Some(checksum),
            verification: None,
        },
        version: 1,
    };

    let created = match state.repository.create(&document).await {
        Ok(created) => created,
        Err(e) => {
            // The object exists but the record does not; remove it so the
            // store never holds orphans a caller cannot reach.
            cleanup_orphan(Arc::clone(&state.storage), storage_key);
            return Err(e.into());
        }
    };

    tracing::info!(
        document_id = %created.id,
        owner_id = %owner_id,
        document_type = %document_type,
        size_bytes = created.size_bytes,
        storage_key = %created.storage_key,
        duration_ms = start.elapsed().as_millis() as u64,
        "Document uploaded"
    );

    Ok(created)
}

/// Best-effort removal of a stored object whose record failed to persist.
fn cleanup_orphan(storage: Arc<dyn StorageGateway>, storage_key: String) {
    tokio::spawn(async move {
        match storage.delete(&storage_key).await {
            Ok(()) | Err(StorageError::NotFound(_)) => {}
            Err(e) => {
                tracing::error!(storage_key = %storage_key, error = %e, "Orphan cleanup failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_paths() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\scan.jpg"), "scan.jpg");
        assert_eq!(sanitize_filename("scan.jpg"), "scan.jpg");
    }

    #[test]
    fn test_sanitize_strips_control_chars() {
        assert_eq!(sanitize_filename("sc\x00an\n.jpg"), "scan.jpg");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("  "), "upload");
        assert_eq!(sanitize_filename("a/"), "upload");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(400);
        assert_eq!(sanitize_filename(&long).len(), MAX_FILENAME_LEN);
    }
}
