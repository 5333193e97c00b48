//! # docvault-auth
//!
//! Password verification for protected shares and signed unlock proofs
//! carried by subsequent requests. No user accounts live here; the
//! pipeline authenticates possession (token), knowledge (password), and
//! identity hints (email proof) only.

pub mod password;
pub mod proof;

pub use password::PasswordHasher;
pub use proof::{ProofPurpose, ProofService};
