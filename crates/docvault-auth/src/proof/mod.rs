//! Signed unlock proofs.
//!
//! A successful password unlock or email confirmation yields a short,
//! signed proof bound to one specific share token. Proofs ride along on
//! later requests (cookie for unlock, query parameter for email) and are
//! re-checked by the policy gate on every authorization; a missing,
//! expired, or foreign proof is simply treated as absent.

mod claims;
mod service;

pub use claims::{ProofClaims, ProofPurpose};
pub use service::ProofService;
