//! Document verification engines.
//!
//! Three tiers behind one trait: an external authenticity provider, a basic
//! structural fallback that re-checks the stored bytes, and a deterministic
//! mock for environments without a provider. `CascadeVerifier` wires them
//! together; the mock is unreachable once a provider is configured.

pub mod basic;
pub mod cascade;
pub mod engine;
pub mod external;
pub mod mock;

pub use basic::BasicVerifier;
pub use cascade::{create_engine, CascadeVerifier};
pub use engine::{VerificationEngine, VerifyError, VerifyResult};
pub use external::ExternalVerifier;
pub use mock::MockVerifier;
