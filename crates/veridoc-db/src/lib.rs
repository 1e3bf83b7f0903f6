//! Document persistence layer.
//!
//! One repository trait, two implementations: Postgres (sqlx) for real
//! deployments and an in-memory map for tests and provider-less development.

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::InMemoryDocumentRepository;
pub use postgres::PgDocumentRepository;
pub use repository::{DocumentFilter, DocumentRepository};
