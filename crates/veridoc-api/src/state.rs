//! Application state.
//!
//! Storage, verification engine, and repository are constructor-injected
//! trait objects, so every piece can be swapped per test without touching
//! handler or orchestrator logic.

use crate::pending::PendingUploads;
use crate::worker::VerificationQueue;
use std::sync::Arc;
use veridoc_core::Config;
use veridoc_db::DocumentRepository;
use veridoc_processing::{ContentProcessor, UploadValidator};
use veridoc_storage::StorageGateway;
use veridoc_verify::VerificationEngine;

pub struct AppState {
    pub config: Config,
    pub repository: Arc<dyn DocumentRepository>,
    pub storage: Arc<dyn StorageGateway>,
    pub validator: UploadValidator,
    pub processor: ContentProcessor,
    pub queue: Arc<VerificationQueue>,
    pub pending_uploads: PendingUploads,
}

impl AppState {
    pub fn new(
        config: Config,
        repository: Arc<dyn DocumentRepository>,
        storage: Arc<dyn StorageGateway>,
        engine: Arc<dyn VerificationEngine>,
    ) -> Self {
        let validator = UploadValidator::new(
            config.max_upload_bytes,
            config.allowed_mime_types.clone(),
        );
        let processor = ContentProcessor::new(config.max_upload_bytes);
        let queue = Arc::new(VerificationQueue::new(
            Arc::clone(&repository),
            engine,
            config.verification_workers,
        ));
        Self {
            config,
            repository,
            storage,
            validator,
            processor,
            queue,
            pending_uploads: PendingUploads::new(),
        }
    }
}
