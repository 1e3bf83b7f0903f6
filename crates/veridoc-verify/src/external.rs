//! Tier 1: external authenticity provider.
//!
//! The document itself never transits through this service; the provider
//! receives a time-bounded presigned download URL plus metadata.

use crate::engine::{VerificationEngine, VerifyError, VerifyResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use veridoc_core::models::{Document, VerificationDetails, VerificationResult, VerificationTier};
use veridoc_storage::StorageGateway;

/// Minimum provider-reported quality score for acceptance.
const QUALITY_THRESHOLD: f64 = 0.7;

/// How long the provider's presigned URL stays valid. Generously above the
/// request timeout so the provider can fetch asynchronously within the call.
const DOCUMENT_URL_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisRequest<'a> {
    document_url: &'a str,
    document_type: &'a str,
    content_type: &'a str,
    size_bytes: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisResponse {
    authentic: bool,
    #[serde(default)]
    quality_score: f64,
    #[serde(default)]
    tampering_detected: bool,
    #[serde(default)]
    extracted_fields: Option<serde_json::Value>,
    #[serde(default)]
    reason: Option<String>,
}

pub struct ExternalVerifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    storage: Arc<dyn StorageGateway>,
}

impl ExternalVerifier {
    pub fn new(
        api_url: String,
        api_key: String,
        timeout: Duration,
        storage: Arc<dyn StorageGateway>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url,
            api_key,
            storage,
        })
    }

    fn decide(&self, response: AnalysisResponse) -> VerificationResult {
        let details = VerificationDetails {
            quality_score: Some(response.quality_score),
            tampering_detected: Some(response.tampering_detected),
            extracted_fields: response.extracted_fields,
            ..Default::default()
        };

        if response.authentic && response.quality_score >= QUALITY_THRESHOLD {
            VerificationResult::accepted(response.quality_score, VerificationTier::External, details)
        } else {
            let reason = response.reason.unwrap_or_else(|| {
                if !response.authentic {
                    "Document failed authenticity analysis".to_string()
                } else {
                    format!(
                        "Document quality score {:.2} below threshold {:.2}",
                        response.quality_score, QUALITY_THRESHOLD
                    )
                }
            });
            VerificationResult::rejected(
                response.quality_score,
                reason,
                VerificationTier::External,
                details,
            )
        }
    }
}

#[async_trait]
impl VerificationEngine for ExternalVerifier {
    async fn verify(&self, document: &Document) -> VerifyResult {
        let document_url = self
            .storage
            .presign_download(&document.storage_key, DOCUMENT_URL_TTL)
            .await?;

        let request = AnalysisRequest {
            document_url: &document_url,
            document_type: document.document_type.as_str(),
            content_type: &document.mime_type,
            size_bytes: document.size_bytes,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| VerifyError::Provider(format!("Request failed: {}", e)))?;

        let status = response.status();

        // A 4xx from the provider is a definitive verdict on this document,
        // not a transient fault: no fallback, no retry.
        if status.is_client_error() {
            tracing::info!(
                document_id = %document.id,
                status = status.as_u16(),
                "Provider rejected document"
            );
            return Ok(VerificationResult::rejected(
                0.0,
                format!("Verification provider rejected the document ({})", status),
                VerificationTier::External,
                VerificationDetails::default(),
            ));
        }

        if !status.is_success() {
            return Err(VerifyError::Provider(format!(
                "Provider returned {}",
                status
            )));
        }

        let body: AnalysisResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::Provider(format!("Malformed provider response: {}", e)))?;

        Ok(self.decide(body))
    }
}
