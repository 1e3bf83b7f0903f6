//! Administrative routes.

use crate::auth::AuthContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use std::sync::Arc;
use uuid::Uuid;
use veridoc_core::models::{DocumentResponse, DocumentStatus, StatusUpdateRequest};
use veridoc_core::AppError;

#[utoipa::path(
    put,
    path = "/documents/{id}/status",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<DocumentResponse>),
        (status = 400, description = "Invalid status transition payload"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Unknown document id")
    )
)]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<StatusUpdateRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    auth.require_admin()?;

    if request.status == DocumentStatus::Rejected && request.rejection_reason.is_none() {
        return Err(
            AppError::InvalidInput("Rejection requires a rejectionReason".to_string()).into(),
        );
    }

    // Manual transitions bypass the automatic state machine entirely: any
    // target state, from any current state.
    let document = state
        .repository
        .admin_set_status(id, request.status, request.rejection_reason)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    tracing::info!(
        document_id = %id,
        admin_id = %auth.user_id,
        status = %document.status,
        "Document status overridden"
    );

    Ok(ApiResponse::ok(
        "Document status updated successfully",
        DocumentResponse::from(document),
    ))
}
