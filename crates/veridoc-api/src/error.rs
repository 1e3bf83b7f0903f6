//! HTTP error response conversion.
//!
//! `HttpAppError` wraps `AppError` so `IntoResponse` (external trait) can be
//! implemented here despite the orphan rule. Handlers return
//! `Result<impl IntoResponse, HttpAppError>` and use `?` on anything that
//! converts into `AppError`.

use crate::response::ApiResponse;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use veridoc_core::{AppError, ErrorMetadata, LogLevel};
use veridoc_processing::FileRejected;
use veridoc_storage::StorageError;

#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<FileRejected> for HttpAppError {
    fn from(err: FileRejected) -> Self {
        HttpAppError(AppError::FileRejected {
            kind: err.kind(),
            message: err.to_string(),
        })
    }
}

/// Invalid JSON bodies render the same envelope as every other 400.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor returning the envelope on deserialization failure,
/// instead of axum's plain-text 422.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, code = error.error_code(), "Request failed"),
        LogLevel::Warn => tracing::warn!(error = %error, code = error.error_code(), "Request failed"),
        LogLevel::Error => tracing::error!(error = %error, code = error.error_code(), "Request failed"),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body: ApiResponse<()> =
            ApiResponse::failure(app_error.client_message(), app_error.error_code());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veridoc_core::RejectionKind;

    #[test]
    fn test_storage_not_found_maps_to_404() {
        let HttpAppError(app) = StorageError::NotFound("key".to_string()).into();
        assert!(matches!(app, AppError::NotFound(_)));
        assert_eq!(app.http_status_code(), 404);
    }

    #[test]
    fn test_storage_backend_failure_is_sensitive_500() {
        let HttpAppError(app) = StorageError::UploadFailed("creds".to_string()).into();
        assert_eq!(app.http_status_code(), 500);
        assert!(app.is_sensitive());
    }

    #[test]
    fn test_file_rejection_keeps_classification() {
        let rejection = FileRejected::Security("Executable signature detected".to_string());
        let HttpAppError(app) = rejection.into();
        assert_eq!(app.http_status_code(), 400);
        assert_eq!(app.error_code(), RejectionKind::Security.error_code());
    }
}
