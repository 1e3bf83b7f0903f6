//! Pending direct-upload sessions.
//!
//! `POST /documents/upload-url` records what the caller promised to upload;
//! `POST /documents/confirm-upload` consumes the session and checks the
//! stored object against it. Sessions are in-process state: after a restart
//! confirmation falls back to the request body plus the object's `head()`
//! metadata.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;
use veridoc_core::models::DocumentType;

#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub owner_id: Uuid,
    pub document_type: DocumentType,
    pub content_type: String,
    pub expected_size: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct PendingUploads {
    inner: Mutex<HashMap<String, PendingUpload>>,
}

impl PendingUploads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, storage_key: String, session: PendingUpload) {
        let mut map = match self.inner.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Opportunistic cleanup keeps the map bounded by active sessions.
        let now = Utc::now();
        map.retain(|_, s| s.expires_at > now);
        map.insert(storage_key, session);
    }

    /// Consume the session for this key. Expired sessions count as absent.
    pub fn take(&self, storage_key: &str) -> Option<PendingUpload> {
        let mut map = match self.inner.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.remove(storage_key)
            .filter(|s| s.expires_at > Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_in: Duration) -> PendingUpload {
        PendingUpload {
            owner_id: Uuid::new_v4(),
            document_type: DocumentType::Passport,
            content_type: "image/jpeg".to_string(),
            expected_size: 1024,
            expires_at: Utc::now() + expires_in,
        }
    }

    #[test]
    fn test_take_consumes_session() {
        let pending = PendingUploads::new();
        pending.register("k".to_string(), session(Duration::minutes(10)));
        assert!(pending.take("k").is_some());
        assert!(pending.take("k").is_none());
    }

    #[test]
    fn test_expired_sessions_are_absent() {
        let pending = PendingUploads::new();
        pending.register("k".to_string(), session(Duration::seconds(-1)));
        assert!(pending.take("k").is_none());
    }
}
