//! Veridoc API
//!
//! HTTP surface for the document verification pipeline: upload handlers,
//! auth context extraction, the upload orchestrator, the background
//! verification queue, and application setup.

mod api_doc;
mod handlers;
mod services;

pub mod telemetry;

pub mod auth;
pub mod error;
pub mod pending;
pub mod response;
pub mod setup;
pub mod state;
pub mod worker;

pub use error::HttpAppError;
pub use response::ApiResponse;
pub use state::AppState;
pub use worker::VerificationQueue;
