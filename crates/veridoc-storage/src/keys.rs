//! Shared key generation for storage backends.
//!
//! Key format: `{owner_id}/{document_type}/{uuid}.{extension}`.

use crate::traits::{StorageError, StorageResult};
use uuid::Uuid;
use veridoc_core::models::DocumentType;

/// Generate a storage key for the given owner and document type.
///
/// The embedded UUID makes keys collision-free without a central sequence;
/// the owner prefix makes per-owner enumeration (and ownership checks on
/// direct uploads) possible.
pub fn document_key(owner_id: Uuid, document_type: DocumentType, extension: &str) -> String {
    format!(
        "{}/{}/{}.{}",
        owner_id,
        document_type.key_segment(),
        Uuid::new_v4(),
        extension.trim_start_matches('.').to_lowercase()
    )
}

/// File extension for a detected MIME type.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "application/pdf" => "pdf",
        _ => "bin",
    }
}

/// Reject keys that could escape the store or collide with another owner.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.contains("..") || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// True when `key` lives under this owner's prefix. Used when finalizing
/// direct uploads so a caller cannot claim another owner's object.
pub fn key_belongs_to(key: &str, owner_id: Uuid) -> bool {
    key.starts_with(&format!("{}/", owner_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_key_shape() {
        let owner = Uuid::new_v4();
        let key = document_key(owner, DocumentType::Passport, "jpg");
        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], owner.to_string());
        assert_eq!(parts[1], "passport");
        assert!(parts[2].ends_with(".jpg"));
        assert!(key_belongs_to(&key, owner));
        assert!(!key_belongs_to(&key, Uuid::new_v4()));
    }

    #[test]
    fn test_keys_are_unique() {
        let owner = Uuid::new_v4();
        let a = document_key(owner, DocumentType::Other, "pdf");
        let b = document_key(owner, DocumentType::Other, "pdf");
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_key_rejects_traversal() {
        assert!(validate_key("a/../b").is_err());
        assert!(validate_key("/abs").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("owner/id_card/x.jpg").is_ok());
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("application/pdf"), "pdf");
        assert_eq!(extension_for_mime("application/zip"), "bin");
    }
}
