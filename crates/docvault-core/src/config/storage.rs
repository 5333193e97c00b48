//! Object URL signer configuration.

use serde::{Deserialize, Serialize};

/// Object storage signer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Signer provider: `"s3"` or `"local"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Presigned URL lifetime in seconds.
    #[serde(default = "default_url_ttl")]
    pub url_ttl_seconds: u64,
    /// S3 signer configuration.
    #[serde(default)]
    pub s3: S3Config,
    /// Local signer configuration.
    #[serde(default)]
    pub local: LocalSignerConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            url_ttl_seconds: default_url_ttl(),
            s3: S3Config::default(),
            local: LocalSignerConfig::default(),
        }
    }
}

/// S3 presigner configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct S3Config {
    /// AWS region. Empty uses the ambient environment configuration.
    #[serde(default)]
    pub region: String,
    /// Optional endpoint override (MinIO and friends).
    #[serde(default)]
    pub endpoint: String,
}

/// Local HMAC URL signer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSignerConfig {
    /// Base URL of the internal object gateway.
    #[serde(default = "default_local_base")]
    pub base_url: String,
    /// HMAC secret for URL signatures.
    #[serde(default = "default_local_secret")]
    pub signing_secret: String,
}

impl Default for LocalSignerConfig {
    fn default() -> Self {
        Self {
            base_url: default_local_base(),
            signing_secret: default_local_secret(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_url_ttl() -> u64 {
    300
}

fn default_local_base() -> String {
    "http://localhost:9000".to_string()
}

fn default_local_secret() -> String {
    "insecure-dev-secret-change-me".to_string()
}
