//! Collaborator traits consumed through narrow interfaces.

pub mod cache;
pub mod plan;
pub mod signer;
pub mod telemetry;
