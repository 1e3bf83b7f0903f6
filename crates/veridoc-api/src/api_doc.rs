//! OpenAPI documentation, served at `/openapi.json`.

use crate::handlers;
use utoipa::OpenApi;
use veridoc_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Veridoc API",
        version = "0.1.0",
        description = "Document ingestion and verification API: validated uploads, \
                       presigned direct uploads, and asynchronous authenticity verification. \
                       All routes except /health and /openapi.json require a bearer token."
    ),
    paths(
        handlers::documents::upload_document,
        handlers::documents::list_documents,
        handlers::documents::get_document,
        handlers::documents::download_document,
        handlers::documents::delete_document,
        handlers::presigned::create_upload_url,
        handlers::presigned::confirm_upload,
        handlers::admin::update_status,
        handlers::health::health,
    ),
    components(schemas(
        models::DocumentResponse,
        models::DocumentType,
        models::DocumentStatus,
        models::ProcessingMetadata,
        models::UploadUrlRequest,
        models::UploadUrlResponse,
        models::ConfirmUploadRequest,
        models::DownloadUrlResponse,
        models::StatusUpdateRequest,
        models::VerificationResult,
        models::VerificationDetails,
        models::VerificationTier,
    )),
    tags(
        (name = "documents", description = "Document upload and lifecycle"),
        (name = "admin", description = "Administrative overrides"),
        (name = "system", description = "Health and metadata")
    )
)]
pub struct ApiDoc;
