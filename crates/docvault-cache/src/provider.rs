//! Cache manager dispatching to the configured backend.

use std::sync::Arc;

use docvault_core::config::cache::CacheConfig;
use docvault_core::traits::cache::CacheProvider;
use docvault_core::{AppError, AppResult};

#[cfg(feature = "memory")]
use crate::memory::MemoryCacheProvider;
#[cfg(feature = "redis-backend")]
use crate::redis::RedisCacheProvider;

/// Selects and wraps the concrete cache backend.
#[derive(Debug)]
pub struct CacheManager {
    provider: Arc<dyn CacheProvider>,
    provider_name: &'static str,
}

impl CacheManager {
    /// Build a cache manager from configuration.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            #[cfg(feature = "memory")]
            "memory" => {
                tracing::info!(
                    max_capacity = config.memory.max_capacity,
                    ttl_seconds = config.memory.time_to_live_seconds,
                    "initializing in-memory cache"
                );
                let provider = MemoryCacheProvider::new(&config.memory);
                Ok(Self {
                    provider: Arc::new(provider),
                    provider_name: "memory",
                })
            }
            #[cfg(feature = "redis-backend")]
            "redis" => {
                tracing::info!(
                    url = %crate::redis::mask_redis_url(&config.redis.url),
                    "initializing redis cache"
                );
                let provider = RedisCacheProvider::new(&config.redis).await?;
                Ok(Self {
                    provider: Arc::new(provider),
                    provider_name: "redis",
                })
            }
            other => Err(AppError::configuration(format!(
                "unknown cache provider '{other}'"
            ))),
        }
    }

    /// Wrap an already-built provider. Used by tests to inject a
    /// deterministic backend.
    pub fn from_provider(provider: Arc<dyn CacheProvider>, name: &'static str) -> Self {
        Self {
            provider,
            provider_name: name,
        }
    }

    /// The underlying provider handle.
    pub fn provider(&self) -> Arc<dyn CacheProvider> {
        Arc::clone(&self.provider)
    }

    /// Name of the active backend, for health reporting.
    pub fn provider_name(&self) -> &'static str {
        self.provider_name
    }

    /// Delegate health check to the active backend.
    pub async fn health_check(&self) -> AppResult<()> {
        self.provider.health_check().await
    }
}
