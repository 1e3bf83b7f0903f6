//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs against in-memory backends: the in-memory repository,
//! local storage in a temp directory, and a stub verification engine.
//! Run from workspace root: `cargo test -p veridoc-api`.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;
use uuid::Uuid;
use veridoc_api::auth::encode_token;
use veridoc_api::setup::routes;
use veridoc_api::state::AppState;
use veridoc_core::models::{Document, DocumentStatus};
use veridoc_core::Config;
use veridoc_db::{DocumentRepository, InMemoryDocumentRepository};
use veridoc_storage::{LocalStorage, StorageGateway};
use veridoc_verify::{MockVerifier, VerificationEngine};

/// Test application: server, state, and owned storage directory.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn token(&self, user_id: Uuid) -> String {
        encode_token(&self.state.config.jwt_secret, user_id, false, 3600)
            .expect("Failed to encode test token")
    }

    pub fn admin_token(&self, user_id: Uuid) -> String {
        encode_token(&self.state.config.jwt_secret, user_id, true, 3600)
            .expect("Failed to encode test token")
    }
}

/// Setup test app with local storage, in-memory repository, and the mock
/// verifier; automatic verification disabled.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(false, Arc::new(MockVerifier::new())).await
}

/// Setup test app with a caller-supplied verification engine.
pub async fn setup_test_app_with(
    auto_verification: bool,
    engine: Arc<dyn VerificationEngine>,
) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut config = Config::for_tests();
    config.auto_verification_enabled = auto_verification;
    config.local_storage_path = temp_dir.path().display().to_string();

    let storage: Arc<dyn StorageGateway> = Arc::new(storage::PresigningLocalStorage::new(
        LocalStorage::new(temp_dir.path(), "http://localhost:8080/files"),
    ));
    let repository: Arc<dyn DocumentRepository> = Arc::new(InMemoryDocumentRepository::new());

    let state = Arc::new(AppState::new(config, repository, storage, engine));
    let server = TestServer::new(routes::build_router(Arc::clone(&state)))
        .expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// Poll the repository until the document leaves the automatic pipeline.
pub async fn wait_for_terminal(state: &AppState, id: Uuid) -> Document {
    for _ in 0..100 {
        if let Some(doc) = state
            .repository
            .get_any(id)
            .await
            .expect("Repository read failed")
        {
            if doc.status.is_terminal() {
                return doc;
            }
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("Document {} never reached a terminal status", id);
}

/// Poll until the document carries the given status.
pub async fn wait_for_status(state: &AppState, id: Uuid, status: DocumentStatus) -> Document {
    for _ in 0..100 {
        if let Some(doc) = state
            .repository
            .get_any(id)
            .await
            .expect("Repository read failed")
        {
            if doc.status == status {
                return doc;
            }
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("Document {} never reached {}", id, status);
}
