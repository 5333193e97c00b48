//! Proof issuance and verification with HMAC signing.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use docvault_core::error::AppError;
use docvault_core::result::AppResult;

use super::claims::{ProofClaims, ProofPurpose};

/// Issues and verifies signed proofs for one proof purpose.
///
/// Unlock and email proofs are signed with independent secrets so a
/// leaked email-proof key cannot mint password unlocks.
#[derive(Clone)]
pub struct ProofService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    purpose: ProofPurpose,
    ttl_seconds: u64,
}

impl std::fmt::Debug for ProofService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofService")
            .field("purpose", &self.purpose)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl ProofService {
    /// Create a proof service for the given purpose.
    pub fn new(secret: &str, purpose: ProofPurpose, ttl_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            purpose,
            ttl_seconds,
        }
    }

    /// Issue a proof bound to the given share token (canonical hex form).
    pub fn issue(&self, token_hex: &str, email: Option<&str>) -> AppResult<String> {
        let now = Utc::now();
        let claims = ProofClaims {
            sub: token_hex.to_string(),
            purpose: self.purpose,
            email: email.map(str::to_string),
            iat: now.timestamp(),
            exp: now.timestamp() + self.ttl_seconds as i64,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("failed to encode proof: {e}")))
    }

    /// Verify a proof against the share token it must be bound to.
    ///
    /// Any defect (bad signature, expiry, wrong purpose, binding to a
    /// different token) yields `None`; the caller treats the proof as
    /// absent rather than surfacing a distinct error.
    pub fn verify(&self, proof: &str, token_hex: &str) -> Option<ProofClaims> {
        let mut validation = Validation::default();
        // The default 60s expiry leeway would keep accepting proofs well
        // past their exp; clock skew between our own instances is tiny.
        validation.leeway = 5;
        let data = decode::<ProofClaims>(proof, &self.decoding_key, &validation).ok()?;
        let claims = data.claims;
        if claims.purpose != self.purpose || claims.sub != token_hex {
            return None;
        }
        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0123456789abcdef0123456789abcdef";

    fn unlock_service() -> ProofService {
        ProofService::new("test-secret", ProofPurpose::Unlock, 1800)
    }

    #[test]
    fn issued_proof_verifies_for_its_token() {
        let service = unlock_service();
        let proof = service.issue(TOKEN, None).unwrap();
        assert!(service.verify(&proof, TOKEN).is_some());
    }

    #[test]
    fn proof_does_not_transfer_to_another_token() {
        let service = unlock_service();
        let proof = service.issue(TOKEN, None).unwrap();
        assert!(service
            .verify(&proof, "ffffffffffffffffffffffffffffffff")
            .is_none());
    }

    #[test]
    fn purpose_mismatch_is_rejected() {
        let unlock = unlock_service();
        let email = ProofService::new("test-secret", ProofPurpose::Email, 1800);
        let proof = unlock.issue(TOKEN, None).unwrap();
        assert!(email.verify(&proof, TOKEN).is_none());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let service = unlock_service();
        let other = ProofService::new("other-secret", ProofPurpose::Unlock, 1800);
        let proof = service.issue(TOKEN, None).unwrap();
        assert!(other.verify(&proof, TOKEN).is_none());
    }

    #[test]
    fn expired_proof_is_rejected() {
        let service = unlock_service();
        let now = Utc::now().timestamp();
        let claims = ProofClaims {
            sub: TOKEN.to_string(),
            purpose: ProofPurpose::Unlock,
            email: None,
            iat: now - 1830,
            exp: now - 30,
        };
        let proof = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(service.verify(&proof, TOKEN).is_none());
    }

    #[test]
    fn email_proof_carries_the_address() {
        let service = ProofService::new("test-secret", ProofPurpose::Email, 1800);
        let proof = service.issue(TOKEN, Some("reader@example.com")).unwrap();
        let claims = service.verify(&proof, TOKEN).unwrap();
        assert_eq!(claims.email.as_deref(), Some("reader@example.com"));
    }
}
