//! Verification pipeline integration tests: automatic state transitions,
//! failure containment, and administrative overrides.

mod helpers;

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use helpers::{fixtures, setup_test_app, setup_test_app_with, wait_for_terminal, TestApp};
use std::sync::Arc;
use uuid::Uuid;
use veridoc_core::models::{
    Document, DocumentStatus, VerificationDetails, VerificationResult, VerificationTier,
};
use veridoc_verify::{VerificationEngine, VerifyError, VerifyResult};

struct AcceptAll;

#[async_trait]
impl VerificationEngine for AcceptAll {
    async fn verify(&self, _document: &Document) -> VerifyResult {
        Ok(VerificationResult::accepted(
            0.93,
            VerificationTier::External,
            VerificationDetails {
                quality_score: Some(0.93),
                tampering_detected: Some(false),
                ..Default::default()
            },
        ))
    }
}

struct RejectWithoutReason;

#[async_trait]
impl VerificationEngine for RejectWithoutReason {
    async fn verify(&self, _document: &Document) -> VerifyResult {
        Ok(VerificationResult {
            is_valid: false,
            confidence: 0.3,
            reason: None,
            tier: VerificationTier::Basic,
            details: VerificationDetails::default(),
        })
    }
}

struct AlwaysUnavailable;

#[async_trait]
impl VerificationEngine for AlwaysUnavailable {
    async fn verify(&self, _document: &Document) -> VerifyResult {
        Err(VerifyError::Unavailable(
            "provider unreachable".to_string(),
        ))
    }
}

async fn upload_id_card(app: &TestApp, token: &str) -> Uuid {
    let part = Part::bytes(fixtures::jpeg_bytes(80, 80))
        .file_name("id.jpg")
        .mime_type("image/jpeg");
    let form = MultipartForm::new()
        .add_part("file", part)
        .add_text("documentType", "ID_CARD");
    let response = app
        .client()
        .post("/documents/upload")
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    Uuid::parse_str(body["data"]["id"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_accepted_document_ends_verified() {
    let app = setup_test_app_with(true, Arc::new(AcceptAll)).await;
    let token = app.token(Uuid::new_v4());

    let id = upload_id_card(&app, &token).await;
    let doc = wait_for_terminal(&app.state, id).await;

    assert_eq!(doc.status, DocumentStatus::Verified);
    assert!(doc.verified_at.is_some());
    assert!(doc.rejected_at.is_none());
    assert!(doc.rejection_reason.is_none());

    let verification = doc
        .processing_metadata
        .verification
        .expect("verification details recorded");
    assert_eq!(verification["is_valid"], true);
    assert_eq!(verification["tier"], "external");
}

#[tokio::test]
async fn test_rejection_without_reason_gets_default() {
    let app = setup_test_app_with(true, Arc::new(RejectWithoutReason)).await;
    let token = app.token(Uuid::new_v4());

    let id = upload_id_card(&app, &token).await;
    let doc = wait_for_terminal(&app.state, id).await;

    assert_eq!(doc.status, DocumentStatus::Rejected);
    assert!(doc.rejected_at.is_some());
    assert_eq!(
        doc.rejection_reason.as_deref(),
        Some("Document verification failed")
    );
}

#[tokio::test]
async fn test_unreachable_engine_never_leaves_document_processing() {
    let app = setup_test_app_with(true, Arc::new(AlwaysUnavailable)).await;
    let token = app.token(Uuid::new_v4());

    let id = upload_id_card(&app, &token).await;
    let doc = wait_for_terminal(&app.state, id).await;

    assert_eq!(doc.status, DocumentStatus::Rejected);
    assert_eq!(
        doc.rejection_reason.as_deref(),
        Some("Verification process failed")
    );
}

#[tokio::test]
async fn test_auto_verification_disabled_keeps_uploaded() {
    let app = setup_test_app().await;
    let token = app.token(Uuid::new_v4());

    let id = upload_id_card(&app, &token).await;
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let doc = app.state.repository.get_any(id).await.unwrap().unwrap();
    assert_eq!(doc.status, DocumentStatus::Uploaded);
}

#[tokio::test]
async fn test_admin_override_requires_admin_claim() {
    let app = setup_test_app().await;
    let user = Uuid::new_v4();
    let token = app.token(user);

    let id = upload_id_card(&app, &token).await;

    let response = app
        .client()
        .put(&format!("/documents/{}/status", id))
        .add_header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"status": "VERIFIED"}))
        .await;
    assert_eq!(response.status_code(), 403);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_rejection_requires_reason() {
    let app = setup_test_app().await;
    let token = app.token(Uuid::new_v4());
    let admin = app.admin_token(Uuid::new_v4());

    let id = upload_id_card(&app, &token).await;

    let response = app
        .client()
        .put(&format!("/documents/{}/status", id))
        .add_header("Authorization", format!("Bearer {}", admin))
        .json(&serde_json::json!({"status": "REJECTED"}))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .client()
        .put(&format!("/documents/{}/status", id))
        .add_header("Authorization", format!("Bearer {}", admin))
        .json(&serde_json::json!({
            "status": "REJECTED",
            "rejectionReason": "Illegible scan"
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["status"], "REJECTED");
    assert_eq!(body["data"]["rejection_reason"], "Illegible scan");
}

#[tokio::test]
async fn test_admin_can_override_terminal_status() {
    let app = setup_test_app_with(true, Arc::new(RejectWithoutReason)).await;
    let token = app.token(Uuid::new_v4());
    let admin = app.admin_token(Uuid::new_v4());

    let id = upload_id_card(&app, &token).await;
    let doc = wait_for_terminal(&app.state, id).await;
    assert_eq!(doc.status, DocumentStatus::Rejected);

    let response = app
        .client()
        .put(&format!("/documents/{}/status", id))
        .add_header("Authorization", format!("Bearer {}", admin))
        .json(&serde_json::json!({"status": "VERIFIED"}))
        .await;
    assert_eq!(response.status_code(), 200);

    let doc = app.state.repository.get_any(id).await.unwrap().unwrap();
    assert_eq!(doc.status, DocumentStatus::Verified);
    assert!(doc.verified_at.is_some());
    // The rejection stamps from the automatic run are gone.
    assert!(doc.rejected_at.is_none());
    assert!(doc.rejection_reason.is_none());
}

#[tokio::test]
async fn test_admin_override_unknown_id_is_not_found() {
    let app = setup_test_app().await;
    let admin = app.admin_token(Uuid::new_v4());

    let response = app
        .client()
        .put(&format!("/documents/{}/status", Uuid::new_v4()))
        .add_header("Authorization", format!("Bearer {}", admin))
        .json(&serde_json::json!({"status": "PENDING_REVIEW"}))
        .await;
    assert_eq!(response.status_code(), 404);
}
