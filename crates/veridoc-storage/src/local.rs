use crate::keys::validate_key;
use crate::traits::{
    ObjectHead, PutOutcome, StorageBackend, StorageError, StorageGateway, StorageResult,
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

/// Local filesystem storage implementation.
///
/// Intended for development and tests. Objects live under `root/{key}`;
/// download URLs are built from `public_base_url` and are not time-bounded,
/// and presigned uploads are not supported.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    fn guess_content_type(key: &str) -> Option<String> {
        let ext = key.rsplit('.').next()?.to_lowercase();
        let ct = match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "pdf" => "application/pdf",
            _ => return None,
        };
        Some(ct.to_string())
    }
}

#[async_trait]
impl StorageGateway for LocalStorage {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<PutOutcome> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let size = data.len() as u64;
        fs::write(&path, data)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::info!(key = %key, size_bytes = size, "Local upload successful");

        Ok(PutOutcome {
            location: self.url_for(key),
            etag: None,
        })
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }

    async fn presign_download(&self, key: &str, _expires_in: Duration) -> StorageResult<String> {
        let path = self.path_for(key)?;
        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(self.url_for(key))
    }

    async fn presign_upload(
        &self,
        _key: &str,
        _content_type: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Err(StorageError::ConfigError(
            "Presigned uploads require the S3 storage backend".to_string(),
        ))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.path_for(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn head(&self, key: &str) -> StorageResult<ObjectHead> {
        let path = self.path_for(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(ObjectHead {
                content_type: Self::guess_content_type(key),
                size_bytes: meta.len(),
                etag: None,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %key, "Local delete successful");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:8080/files/");
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_download_round_trip() {
        let (_dir, storage) = storage();
        let outcome = storage
            .put("owner/id_card/a.jpg", b"hello".to_vec(), "image/jpeg")
            .await
            .unwrap();
        assert_eq!(outcome.location, "http://localhost:8080/files/owner/id_card/a.jpg");

        let data = storage.download("owner/id_card/a.jpg").await.unwrap();
        assert_eq!(data, b"hello");
    }

    #[tokio::test]
    async fn test_head_and_exists() {
        let (_dir, storage) = storage();
        storage
            .put("o/passport/b.pdf", vec![0u8; 128], "application/pdf")
            .await
            .unwrap();

        assert!(storage.exists("o/passport/b.pdf").await.unwrap());
        assert!(!storage.exists("o/passport/missing.pdf").await.unwrap());

        let head = storage.head("o/passport/b.pdf").await.unwrap();
        assert_eq!(head.size_bytes, 128);
        assert_eq!(head.content_type.as_deref(), Some("application/pdf"));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (_dir, storage) = storage();
        assert!(matches!(
            storage.delete("o/other/missing.bin").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_traversal_key_rejected() {
        let (_dir, storage) = storage();
        assert!(matches!(
            storage.download("../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_presign_upload_unsupported() {
        let (_dir, storage) = storage();
        assert!(matches!(
            storage
                .presign_upload("o/x/y.jpg", "image/jpeg", Duration::from_secs(60))
                .await,
            Err(StorageError::ConfigError(_))
        ));
    }
}
