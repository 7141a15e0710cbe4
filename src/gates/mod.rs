// src/gates/mod.rs
pub mod completeness;
pub mod credentials;

pub use completeness::{completion_score, ensure_present, is_complete, missing_fields};
pub use credentials::CredentialGate;
