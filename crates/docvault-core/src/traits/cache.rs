//! Cache provider trait for pluggable caching backends.

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for cache backends (Redis or in-memory).
///
/// All values are strings; callers serialize structured values as JSON.
/// TTLs are in seconds, `None` means no expiry (bounded only by backend
/// eviction).
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or
    /// has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value, optionally with a TTL.
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> AppResult<()>;

    /// Delete a key. Returns `true` when a key was removed.
    async fn delete(&self, key: &str) -> AppResult<bool>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Set a value only if the key does not already exist (NX).
    /// Returns `true` if the value was set, `false` if the key existed.
    async fn set_nx(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> AppResult<bool>;

    /// Add `delta` to an integer value, creating it at zero first.
    /// Returns the new value.
    async fn incr(&self, key: &str, delta: i64) -> AppResult<i64>;

    /// Set the TTL on an existing key. Returns `true` when the key
    /// exists.
    async fn expire(&self, key: &str, ttl_seconds: u64) -> AppResult<bool>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<()>;
}
