//! Veridoc Processing Library
//!
//! In-memory validation and transformation of uploaded document files:
//!
//! - [`validator`]: accepts or rejects a raw buffer before any processing
//!   happens (size, binary signature, allowlist, structural integrity,
//!   security heuristics). Validation is authoritative.
//! - [`processor`]: best-effort normalization (EXIF auto-rotation, bounded
//!   resize, re-encode) driven by the per-document-type [`policy`] table.
//!   Processing failures never fail the upload.

pub mod image_ops;
pub mod policy;
pub mod processor;
pub mod sniff;
pub mod validator;

pub use policy::{policy_for, ProcessingPolicy};
pub use processor::{ContentProcessor, ProcessedFile};
pub use sniff::{sniff, Sniffed};
pub use validator::{FileRejected, UploadValidator, ValidationOutcome};
