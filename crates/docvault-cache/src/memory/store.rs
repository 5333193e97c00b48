//! Moka-backed cache provider.
//!
//! Counters live in a separate dashmap so `incr` stays atomic; the
//! string view of a counter is kept in moka so `get`/`exists` behave
//! the same across backends. Per-key TTLs are tracked in a deadline
//! map and enforced lazily on access, so an entry set with a TTL
//! longer than the configured default (an abuse block, for example)
//! lives its full term. Entries set without a TTL fall back to the
//! configured default.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;

use docvault_core::config::cache::MemoryCacheConfig;
use docvault_core::traits::cache::CacheProvider;
use docvault_core::AppResult;

pub struct MemoryCacheProvider {
    cache: Cache<String, String>,
    counters: Arc<DashMap<String, AtomicI64>>,
    expiries: Arc<DashMap<String, Instant>>,
    default_ttl: Duration,
}

impl std::fmt::Debug for MemoryCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheProvider")
            .field("entries", &self.cache.entry_count())
            .field("counters", &self.counters.len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl MemoryCacheProvider {
    pub fn new(config: &MemoryCacheConfig) -> Self {
        // Capacity-only eviction; lifetimes come from the deadline map
        // so explicit TTLs are not capped by a cache-wide setting.
        let cache = Cache::builder().max_capacity(config.max_capacity).build();
        Self {
            cache,
            counters: Arc::new(DashMap::new()),
            expiries: Arc::new(DashMap::new()),
            default_ttl: Duration::from_secs(config.time_to_live_seconds),
        }
    }

    /// A small provider for unit tests.
    pub fn for_tests() -> Self {
        Self::new(&MemoryCacheConfig {
            max_capacity: 10_000,
            time_to_live_seconds: 300,
        })
    }

    fn deadline(&self, ttl_seconds: Option<u64>) -> Instant {
        Instant::now() + ttl_seconds.map(Duration::from_secs).unwrap_or(self.default_ttl)
    }

    async fn purge_if_expired(&self, key: &str) {
        let expired = self
            .expiries
            .get(key)
            .map(|deadline| Instant::now() >= *deadline)
            .unwrap_or(false);
        if expired {
            self.expiries.remove(key);
            self.counters.remove(key);
            self.cache.invalidate(key).await;
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.purge_if_expired(key).await;
        if let Some(counter) = self.counters.get(key) {
            return Ok(Some(counter.load(Ordering::SeqCst).to_string()));
        }
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> AppResult<()> {
        self.counters.remove(key);
        self.expiries
            .insert(key.to_string(), self.deadline(ttl_seconds));
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        self.purge_if_expired(key).await;
        self.expiries.remove(key);
        let had_counter = self.counters.remove(key).is_some();
        let had_value = self.cache.get(key).await.is_some();
        self.cache.invalidate(key).await;
        Ok(had_counter || had_value)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.purge_if_expired(key).await;
        Ok(self.counters.contains_key(key) || self.cache.get(key).await.is_some())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> AppResult<bool> {
        self.purge_if_expired(key).await;
        if self.counters.contains_key(key) || self.cache.get(key).await.is_some() {
            return Ok(false);
        }
        self.expiries
            .insert(key.to_string(), self.deadline(ttl_seconds));
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(true)
    }

    async fn incr(&self, key: &str, delta: i64) -> AppResult<i64> {
        self.purge_if_expired(key).await;
        // A fresh counter gets the default deadline; `expire` on the
        // first window hit replaces it with the window's own.
        self.expiries
            .entry(key.to_string())
            .or_insert_with(|| self.deadline(None));
        let counter = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| AtomicI64::new(0));
        let value = counter.fetch_add(delta, Ordering::SeqCst) + delta;
        // Mirror into moka so the key participates in capacity eviction.
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(value)
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> AppResult<bool> {
        self.purge_if_expired(key).await;
        if !self.counters.contains_key(key) && self.cache.get(key).await.is_none() {
            return Ok(false);
        }
        self.expiries
            .insert(key.to_string(), self.deadline(Some(ttl_seconds)));
        Ok(true)
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}
