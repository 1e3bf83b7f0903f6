//! Per-document-type processing policy.
//!
//! Identity documents are kept at a resolution where machine-readable zones
//! survive; statements and bills tolerate stronger compression. OTHER is
//! stored as received.

use veridoc_core::models::DocumentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingPolicy {
    /// Longest edge after processing; images are never upscaled to reach it.
    pub max_dimension: u32,
    /// JPEG re-encode quality (0-100).
    pub jpeg_quality: u8,
    /// When false the buffer passes through untouched.
    pub optimize: bool,
}

pub fn policy_for(document_type: DocumentType) -> ProcessingPolicy {
    match document_type {
        DocumentType::IdCard | DocumentType::Passport | DocumentType::DriversLicense => {
            ProcessingPolicy {
                max_dimension: 1600,
                jpeg_quality: 85,
                optimize: true,
            }
        }
        DocumentType::BusinessLicense
        | DocumentType::TaxCertificate
        | DocumentType::RegistrationCertificate => ProcessingPolicy {
            max_dimension: 2000,
            jpeg_quality: 85,
            optimize: true,
        },
        DocumentType::BankStatement
        | DocumentType::UtilityBill
        | DocumentType::ProofOfAddress
        | DocumentType::FinancialStatement => ProcessingPolicy {
            max_dimension: 2000,
            jpeg_quality: 80,
            optimize: true,
        },
        DocumentType::Other => ProcessingPolicy {
            max_dimension: 4096,
            jpeg_quality: 80,
            optimize: false,
        },
    }
}
