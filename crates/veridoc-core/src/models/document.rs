use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed enumeration of the document categories the pipeline accepts.
///
/// The wire representation is SCREAMING_SNAKE_CASE, matching what the
/// dashboard sends in the `documentType` multipart field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    IdCard,
    Passport,
    DriversLicense,
    BusinessLicense,
    TaxCertificate,
    BankStatement,
    UtilityBill,
    ProofOfAddress,
    RegistrationCertificate,
    FinancialStatement,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::IdCard => "ID_CARD",
            DocumentType::Passport => "PASSPORT",
            DocumentType::DriversLicense => "DRIVERS_LICENSE",
            DocumentType::BusinessLicense => "BUSINESS_LICENSE",
            DocumentType::TaxCertificate => "TAX_CERTIFICATE",
            DocumentType::BankStatement => "BANK_STATEMENT",
            DocumentType::UtilityBill => "UTILITY_BILL",
            DocumentType::ProofOfAddress => "PROOF_OF_ADDRESS",
            DocumentType::RegistrationCertificate => "REGISTRATION_CERTIFICATE",
            DocumentType::FinancialStatement => "FINANCIAL_STATEMENT",
            DocumentType::Other => "OTHER",
        }
    }

    /// Lowercase form used inside storage keys (`{owner}/{type}/{uuid}.{ext}`).
    pub fn key_segment(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ID_CARD" => Ok(DocumentType::IdCard),
            "PASSPORT" => Ok(DocumentType::Passport),
            "DRIVERS_LICENSE" => Ok(DocumentType::DriversLicense),
            "BUSINESS_LICENSE" => Ok(DocumentType::BusinessLicense),
            "TAX_CERTIFICATE" => Ok(DocumentType::TaxCertificate),
            "BANK_STATEMENT" => Ok(DocumentType::BankStatement),
            "UTILITY_BILL" => Ok(DocumentType::UtilityBill),
            "PROOF_OF_ADDRESS" => Ok(DocumentType::ProofOfAddress),
            "REGISTRATION_CERTIFICATE" => Ok(DocumentType::RegistrationCertificate),
            "FINANCIAL_STATEMENT" => Ok(DocumentType::FinancialStatement),
            "OTHER" => Ok(DocumentType::Other),
            other => Err(format!("Unknown document type: {}", other)),
        }
    }
}

/// Document lifecycle status.
///
/// The automatic pipeline only drives UPLOADED → PROCESSING → {VERIFIED,
/// REJECTED}. EXPIRED and PENDING_REVIEW are reserved for administrative
/// transitions; no automatic path reaches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Verified,
    Rejected,
    Expired,
    PendingReview,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "UPLOADED",
            DocumentStatus::Processing => "PROCESSING",
            DocumentStatus::Verified => "VERIFIED",
            DocumentStatus::Rejected => "REJECTED",
            DocumentStatus::Expired => "EXPIRED",
            DocumentStatus::PendingReview => "PENDING_REVIEW",
        }
    }

    /// Terminal states are never overwritten by the automatic pipeline.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Verified | DocumentStatus::Rejected)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UPLOADED" => Ok(DocumentStatus::Uploaded),
            "PROCESSING" => Ok(DocumentStatus::Processing),
            "VERIFIED" => Ok(DocumentStatus::Verified),
            "REJECTED" => Ok(DocumentStatus::Rejected),
            "EXPIRED" => Ok(DocumentStatus::Expired),
            "PENDING_REVIEW" => Ok(DocumentStatus::PendingReview),
            other => Err(format!("Unknown document status: {}", other)),
        }
    }
}

/// Free-form processing outcome recorded alongside the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProcessingMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub steps_applied: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum_sha256: Option<String>,
    /// Structured verification details (extracted fields, tampering flag),
    /// merged in when the verification engine completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<serde_json::Value>,
}

/// The central entity: one uploaded file and its verification lifecycle.
///
/// Exactly one storage object corresponds to one document id; the object is
/// never mutated after creation. `owner_id` is immutable and every read path
/// filters by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub storage_key: String,
    pub storage_location: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub document_type: DocumentType,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub processing_metadata: ProcessingMetadata,
    /// Incremented on every mutation; used for optimistic status transitions.
    pub version: i32,
}

/// Client-facing view of a document. Storage keys stay internal; the caller
/// gets the resolvable location instead.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub document_type: DocumentType,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub processing_metadata: ProcessingMetadata,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        DocumentResponse {
            id: doc.id,
            original_name: doc.original_name,
            mime_type: doc.mime_type,
            size_bytes: doc.size_bytes,
            document_type: doc.document_type,
            status: doc.status,
            uploaded_at: doc.uploaded_at,
            verified_at: doc.verified_at,
            rejected_at: doc.rejected_at,
            rejection_reason: doc.rejection_reason,
            processing_metadata: doc.processing_metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_document(status: DocumentStatus) -> Document {
        Document {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            storage_key: "owner/id_card/abc.jpg".to_string(),
            storage_location: "https://bucket.s3.eu-west-1.amazonaws.com/owner/id_card/abc.jpg"
                .to_string(),
            original_name: "passport-scan.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size_bytes: 2048,
            document_type: DocumentType::IdCard,
            status,
            uploaded_at: Utc::now(),
            verified_at: None,
            rejected_at: None,
            rejection_reason: None,
            processing_metadata: ProcessingMetadata::default(),
            version: 1,
        }
    }

    #[test]
    fn test_document_type_round_trip() {
        for ty in [
            DocumentType::IdCard,
            DocumentType::Passport,
            DocumentType::DriversLicense,
            DocumentType::BusinessLicense,
            DocumentType::TaxCertificate,
            DocumentType::BankStatement,
            DocumentType::UtilityBill,
            DocumentType::ProofOfAddress,
            DocumentType::RegistrationCertificate,
            DocumentType::FinancialStatement,
            DocumentType::Other,
        ] {
            assert_eq!(ty.as_str().parse::<DocumentType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_document_type_serde_wire_format() {
        let json = serde_json::to_string(&DocumentType::IdCard).unwrap();
        assert_eq!(json, "\"ID_CARD\"");
        let back: DocumentType = serde_json::from_str("\"DRIVERS_LICENSE\"").unwrap();
        assert_eq!(back, DocumentType::DriversLicense);
    }

    #[test]
    fn test_document_type_unknown() {
        assert!("SELFIE".parse::<DocumentType>().is_err());
    }

    #[test]
    fn test_status_terminal() {
        assert!(DocumentStatus::Verified.is_terminal());
        assert!(DocumentStatus::Rejected.is_terminal());
        assert!(!DocumentStatus::Uploaded.is_terminal());
        assert!(!DocumentStatus::Processing.is_terminal());
        assert!(!DocumentStatus::Expired.is_terminal());
        assert!(!DocumentStatus::PendingReview.is_terminal());
    }

    #[test]
    fn test_document_response_hides_storage_key() {
        let doc = test_document(DocumentStatus::Uploaded);
        let response = DocumentResponse::from(doc.clone());
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("storage_key").is_none());
        assert_eq!(
            json.get("original_name").and_then(|v| v.as_str()),
            Some("passport-scan.jpg")
        );
        assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("UPLOADED"));
    }

    #[test]
    fn test_key_segment() {
        assert_eq!(DocumentType::ProofOfAddress.key_segment(), "proof_of_address");
    }
}
