//! Application setup and initialization.

pub mod database;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::Result;
use std::sync::Arc;
use veridoc_core::Config;
use veridoc_db::{DocumentRepository, InMemoryDocumentRepository, PgDocumentRepository};

/// Build the full application: repository, storage, verification engine,
/// state, and router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let pool = database::setup_database(&config).await?;

    let repository: Arc<dyn DocumentRepository> = match pool {
        Some(pool) => Arc::new(PgDocumentRepository::new(pool)),
        None => {
            tracing::warn!("No DATABASE_URL configured, using in-memory document store");
            Arc::new(InMemoryDocumentRepository::new())
        }
    };

    let storage = veridoc_storage::create_storage(&config)?;
    let engine = veridoc_verify::create_engine(&config, Arc::clone(&storage))?;

    let state = Arc::new(AppState::new(config, repository, storage, engine));
    let router = routes::build_router(Arc::clone(&state));

    Ok((state, router))
}
