//! HMAC-signed URLs for a local object gateway.
//!
//! Used in development and single-node deployments where no S3 endpoint
//! exists. The gateway validates the signature and expiry before
//! streaming the object; the signature covers every response-shaping
//! parameter so none can be swapped after issuance.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use sha2::Sha256;

use docvault_core::config::storage::LocalSignerConfig;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::signer::ObjectUrlSigner;
use docvault_core::types::ObjectPointer;

type HmacSha256 = Hmac<Sha256>;

/// Signs gateway URLs with HMAC-SHA256.
#[derive(Clone)]
pub struct LocalUrlSigner {
    base_url: String,
    secret: Vec<u8>,
}

impl std::fmt::Debug for LocalUrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalUrlSigner")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LocalUrlSigner {
    /// Create a signer from configuration.
    pub fn new(config: &LocalSignerConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret: config.signing_secret.as_bytes().to_vec(),
        }
    }

    fn signature(
        &self,
        pointer: &ObjectPointer,
        content_type: &str,
        disposition: &str,
        expires: i64,
    ) -> AppResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::internal(format!("invalid signing key: {e}")))?;
        let canonical = format!(
            "{}\n{}\n{}\n{}\n{}",
            pointer.bucket, pointer.key, content_type, disposition, expires
        );
        mac.update(canonical.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl ObjectUrlSigner for LocalUrlSigner {
    async fn presign_get(
        &self,
        pointer: &ObjectPointer,
        content_type: &str,
        disposition: &str,
        expires_in: Duration,
    ) -> AppResult<String> {
        let expires = chrono::Utc::now().timestamp() + expires_in.as_secs() as i64;
        let sig = self.signature(pointer, content_type, disposition, expires)?;

        let ct = utf8_percent_encode(content_type, NON_ALPHANUMERIC);
        let disp = utf8_percent_encode(disposition, NON_ALPHANUMERIC);
        Ok(format!(
            "{}/objects/{}/{}?ct={}&disp={}&exp={}&sig={}",
            self.base_url, pointer.bucket, pointer.key, ct, disp, expires, sig
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> LocalUrlSigner {
        LocalUrlSigner::new(&LocalSignerConfig {
            base_url: "http://gateway:9000/".to_string(),
            signing_secret: "test-secret".to_string(),
        })
    }

    #[tokio::test]
    async fn url_contains_signature_and_expiry() {
        let pointer = ObjectPointer::new("vault".to_string(), "docs/report.pdf".to_string());
        let url = signer()
            .presign_get(
                &pointer,
                "application/pdf",
                "inline",
                Duration::from_secs(300),
            )
            .await
            .unwrap();
        assert!(url.starts_with("http://gateway:9000/objects/vault/docs/report.pdf?"));
        assert!(url.contains("&sig="));
        assert!(url.contains("&exp="));
    }

    #[tokio::test]
    async fn changing_disposition_changes_the_signature() {
        let s = signer();
        let pointer = ObjectPointer::new("vault".to_string(), "k".to_string());
        let a = s.signature(&pointer, "application/pdf", "inline", 100).unwrap();
        let b = s
            .signature(&pointer, "application/pdf", "attachment; filename=\"x\"", 100)
            .unwrap();
        assert_ne!(a, b);
    }
}
