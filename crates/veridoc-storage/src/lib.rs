//! Veridoc Storage Library
//!
//! Durable object-store abstraction for uploaded documents, with S3 and local
//! filesystem backends.
//!
//! # Storage key format
//!
//! Keys are owner-scoped: `{owner_id}/{document_type}/{uuid}.{extension}`.
//! This makes per-owner enumeration possible and avoids collisions without a
//! central sequence. Keys must not contain `..` or a leading `/`; generation
//! is centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

pub use factory::create_storage;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{ObjectHead, PutOutcome, StorageBackend, StorageError, StorageGateway, StorageResult};
