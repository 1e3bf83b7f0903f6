//! Local storage wrapper that also issues (fake) presigned upload URLs, so
//! the direct-upload flow can be exercised without S3.

#![allow(dead_code)]

use async_trait::async_trait;
use std::time::Duration;
use veridoc_storage::{
    LocalStorage, ObjectHead, PutOutcome, StorageBackend, StorageGateway, StorageResult,
};

pub struct PresigningLocalStorage {
    inner: LocalStorage,
}

impl PresigningLocalStorage {
    pub fn new(inner: LocalStorage) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageGateway for PresigningLocalStorage {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<PutOutcome> {
        self.inner.put(key, data, content_type).await
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.download(key).await
    }

    async fn presign_download(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        self.inner.presign_download(key, expires_in).await
    }

    async fn presign_upload(
        &self,
        key: &str,
        _content_type: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!("http://localhost:8080/presigned-put/{}", key))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn head(&self, key: &str) -> StorageResult<ObjectHead> {
        self.inner.head(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}
