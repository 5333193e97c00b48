//! S3-compatible presigned URL signer.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;

use docvault_core::config::storage::S3Config;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::signer::ObjectUrlSigner;
use docvault_core::types::ObjectPointer;

/// Presigns GETs against S3 or an S3-compatible endpoint.
#[derive(Debug, Clone)]
pub struct S3UrlSigner {
    client: aws_sdk_s3::Client,
}

impl S3UrlSigner {
    /// Build a signer from ambient AWS configuration plus overrides.
    pub async fn new(config: &S3Config) -> AppResult<Self> {
        let mut loader = aws_config::from_env();
        if !config.region.is_empty() {
            loader = loader.region(aws_config::Region::new(config.region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if !config.endpoint.is_empty() {
            builder = builder.endpoint_url(&config.endpoint).force_path_style(true);
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());

        tracing::info!(
            region = %config.region,
            endpoint = %config.endpoint,
            "initialized S3 URL signer"
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl ObjectUrlSigner for S3UrlSigner {
    async fn presign_get(
        &self,
        pointer: &ObjectPointer,
        content_type: &str,
        disposition: &str,
        expires_in: Duration,
    ) -> AppResult<String> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "invalid presign expiry", e)
        })?;

        let request = self
            .client
            .get_object()
            .bucket(&pointer.bucket)
            .key(&pointer.key)
            .response_content_type(content_type)
            .response_content_disposition(disposition)
            .presigned(presigning)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "failed to presign object URL", e)
            })?;

        Ok(request.uri().to_string())
    }
}
