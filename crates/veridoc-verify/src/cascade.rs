//! Ordered verification cascade.
//!
//! With a provider configured: external tier first, basic structural tier on
//! transient provider failure, hard error if both fail. Without one: the
//! deterministic mock, and nothing else. The mock must never run against a
//! configured provider, so the two arms are disjoint by construction.

use crate::basic::BasicVerifier;
use crate::engine::{VerificationEngine, VerifyError, VerifyResult};
use crate::external::ExternalVerifier;
use crate::mock::MockVerifier;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use veridoc_core::models::Document;
use veridoc_core::Config;
use veridoc_storage::StorageGateway;

enum Tiers {
    Provider {
        external: ExternalVerifier,
        basic: BasicVerifier,
    },
    Mock(MockVerifier),
}

pub struct CascadeVerifier {
    tiers: Tiers,
}

impl CascadeVerifier {
    pub fn from_config(config: &Config, storage: Arc<dyn StorageGateway>) -> anyhow::Result<Self> {
        let tiers = if config.external_verification_configured() {
            // `external_verification_configured` guarantees both are set.
            let api_url = config.verification_api_url.clone().unwrap_or_default();
            let api_key = config.verification_api_key.clone().unwrap_or_default();
            let external = ExternalVerifier::new(
                api_url,
                api_key,
                Duration::from_secs(config.verification_timeout_secs),
                Arc::clone(&storage),
            )?;
            let basic = BasicVerifier::new(
                storage,
                config.max_upload_bytes,
                config.allowed_mime_types.clone(),
            );
            Tiers::Provider { external, basic }
        } else {
            Tiers::Mock(MockVerifier::new())
        };
        Ok(Self { tiers })
    }

    pub fn mock_only() -> Self {
        Self {
            tiers: Tiers::Mock(MockVerifier::new()),
        }
    }
}

#[async_trait]
impl VerificationEngine for CascadeVerifier {
    async fn verify(&self, document: &Document) -> VerifyResult {
        match &self.tiers {
            Tiers::Mock(mock) => mock.verify(document).await,
            Tiers::Provider { external, basic } => {
                let provider_error = match external.verify(document).await {
                    Ok(result) => return Ok(result),
                    // Definitive verdicts come back as Ok above; only
                    // transient faults fall through.
                    Err(e) => e,
                };

                tracing::warn!(
                    document_id = %document.id,
                    error = %provider_error,
                    "External verification unavailable, falling back to structural checks"
                );

                match basic.verify(document).await {
                    Ok(result) => Ok(result),
                    Err(basic_error) => Err(VerifyError::Unavailable(format!(
                        "external: {provider_error}; basic: {basic_error}"
                    ))),
                }
            }
        }
    }
}

/// Build the engine the orchestrator injects.
pub fn create_engine(
    config: &Config,
    storage: Arc<dyn StorageGateway>,
) -> anyhow::Result<Arc<dyn VerificationEngine>> {
    let cascade = CascadeVerifier::from_config(config, storage)?;
    match &cascade.tiers {
        Tiers::Provider { .. } => tracing::info!("Verification engine: external provider cascade"),
        Tiers::Mock(_) => tracing::info!("Verification engine: deterministic mock"),
    }
    Ok(Arc::new(cascade))
}
