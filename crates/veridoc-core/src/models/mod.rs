pub mod document;
pub mod requests;
pub mod verification;

pub use document::{
    Document, DocumentResponse, DocumentStatus, DocumentType, ProcessingMetadata,
};
pub use requests::{
    ConfirmUploadRequest, DownloadUrlResponse, ListDocumentsQuery, StatusUpdateRequest,
    UploadUrlRequest, UploadUrlResponse,
};
pub use verification::{VerificationDetails, VerificationResult, VerificationTier};
