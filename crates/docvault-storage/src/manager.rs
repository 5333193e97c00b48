//! Storage manager routing presign calls to the configured signer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use docvault_core::config::storage::StorageConfig;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::signer::ObjectUrlSigner;
use docvault_core::types::ObjectPointer;

use crate::providers::{LocalUrlSigner, S3UrlSigner};

/// Selects and wraps the concrete URL signer.
#[derive(Debug, Clone)]
pub struct StorageManager {
    signer: Arc<dyn ObjectUrlSigner>,
    url_ttl: Duration,
}

impl StorageManager {
    /// Build a storage manager from configuration.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let signer: Arc<dyn ObjectUrlSigner> = match config.provider.as_str() {
            "s3" => Arc::new(S3UrlSigner::new(&config.s3).await?),
            "local" => Arc::new(LocalUrlSigner::new(&config.local)),
            other => {
                return Err(AppError::configuration(format!(
                    "unknown storage provider '{other}'"
                )))
            }
        };
        Ok(Self {
            signer,
            url_ttl: Duration::from_secs(config.url_ttl_seconds),
        })
    }

    /// Wrap an already-built signer. Used by tests.
    pub fn from_signer(signer: Arc<dyn ObjectUrlSigner>, url_ttl: Duration) -> Self {
        Self { signer, url_ttl }
    }

    /// The configured presigned URL lifetime.
    pub fn url_ttl(&self) -> Duration {
        self.url_ttl
    }
}

#[async_trait]
impl ObjectUrlSigner for StorageManager {
    async fn presign_get(
        &self,
        pointer: &ObjectPointer,
        content_type: &str,
        disposition: &str,
        expires_in: Duration,
    ) -> AppResult<String> {
        self.signer
            .presign_get(pointer, content_type, disposition, expires_in)
            .await
    }
}
