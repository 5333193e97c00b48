//! Proof claims payload.

use serde::{Deserialize, Serialize};

/// What a proof attests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofPurpose {
    /// The bearer supplied the share password.
    Unlock,
    /// The bearer confirmed control of the recipient email address.
    Email,
}

/// Claims embedded in every proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofClaims {
    /// Subject, the canonical hex form of the share token the proof
    /// is bound to. A proof never transfers to another share.
    pub sub: String,
    /// What this proof attests.
    pub purpose: ProofPurpose,
    /// Confirmed email address, present on email proofs only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}
