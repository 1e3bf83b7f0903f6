//! Veridoc Core Library
//!
//! Domain models, error types, and configuration shared by every crate in the
//! veridoc document-verification pipeline.

pub mod config;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel, RejectionKind};
