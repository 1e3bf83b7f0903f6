//! Liveness probe.

use crate::response::message_only;
use axum::http::StatusCode;
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> impl IntoResponse {
    message_only(StatusCode::OK, "ok")
}
