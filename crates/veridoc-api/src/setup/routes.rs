//! Route configuration and setup.

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;
use axum::http::Method;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

// Multipart framing adds overhead beyond the file itself.
const BODY_LIMIT_HEADROOM: usize = 1024 * 1024;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router. Authentication happens per-handler via the
/// [`crate::auth::AuthContext`] extractor; only `/health` and `/openapi.json`
/// skip it.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let body_limit = state.config.max_upload_bytes + BODY_LIMIT_HEADROOM;

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/openapi.json", get(openapi))
        .route("/documents/upload", post(handlers::documents::upload_document))
        .route("/documents", get(handlers::documents::list_documents))
        .route(
            "/documents/{id}",
            get(handlers::documents::get_document).delete(handlers::documents::delete_document),
        )
        .route(
            "/documents/{id}/download",
            get(handlers::documents::download_document),
        )
        .route(
            "/documents/upload-url",
            post(handlers::presigned::create_upload_url),
        )
        .route(
            "/documents/confirm-upload",
            post(handlers::presigned::confirm_upload),
        )
        .route("/documents/{id}/status", put(handlers::admin::update_status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
