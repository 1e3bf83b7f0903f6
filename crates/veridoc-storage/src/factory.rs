//! Storage factory: builds the configured backend behind the
//! [`StorageGateway`] trait so callers never couple to a concrete store.

use crate::local::LocalStorage;
use crate::s3::S3Storage;
use crate::traits::{StorageGateway, StorageResult};
use std::sync::Arc;
use veridoc_core::config::{Config, StorageBackendKind};

/// Create the storage gateway selected by configuration.
pub fn create_storage(config: &Config) -> StorageResult<Arc<dyn StorageGateway>> {
    match config.storage_backend {
        StorageBackendKind::S3 => {
            let storage = S3Storage::new(
                config.s3_bucket.clone(),
                config.s3_region.clone(),
                config.s3_endpoint_url.clone(),
            )?;
            tracing::info!(bucket = %config.s3_bucket, region = %config.s3_region, "Using S3 storage backend");
            Ok(Arc::new(storage))
        }
        StorageBackendKind::Local => {
            tracing::info!(path = %config.local_storage_path, "Using local storage backend");
            Ok(Arc::new(LocalStorage::new(
                config.local_storage_path.clone(),
                config.local_public_base_url.clone(),
            )))
        }
    }
}
