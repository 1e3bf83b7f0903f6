use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which tier of the verification cascade produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationTier {
    External,
    Basic,
    Mock,
}

/// Structured details returned by every tier, on acceptance and rejection
/// alike, so rejected documents can still be triaged manually.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VerificationDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tampering_detected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_fields: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks_passed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks_total: Option<u32>,
}

/// Outcome of one verification attempt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerificationResult {
    pub is_valid: bool,
    /// Confidence in [0, 1].
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub tier: VerificationTier,
    pub details: VerificationDetails,
}

impl VerificationResult {
    pub fn accepted(confidence: f64, tier: VerificationTier, details: VerificationDetails) -> Self {
        Self {
            is_valid: true,
            confidence: confidence.clamp(0.0, 1.0),
            reason: None,
            tier,
            details,
        }
    }

    pub fn rejected(
        confidence: f64,
        reason: impl Into<String>,
        tier: VerificationTier,
        details: VerificationDetails,
    ) -> Self {
        Self {
            is_valid: false,
            confidence: confidence.clamp(0.0, 1.0),
            reason: Some(reason.into()),
            tier,
            details,
        }
    }
}
