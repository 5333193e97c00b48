//! Rate limiting and abuse detection.
//!
//! Fixed-window counters per IP and per token (atomic INCR, EXPIRE set
//! on the first hit in a window) plus a secondary detector that counts
//! denials per IP and installs a temporary block past a threshold. All
//! state is cache-resident and disappears with its TTL.

use std::sync::Arc;

use chrono::Utc;

use docvault_cache::keys;
use docvault_core::config::limits::LimitsConfig;
use docvault_core::deny::DenyReason;
use docvault_core::events::SecurityEvent;
use docvault_core::result::AppResult;
use docvault_core::traits::cache::CacheProvider;

use crate::telemetry::{hash_ip, TelemetryService};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// The window is exhausted; retry after the window rolls over.
    Limited { retry_after_seconds: u64 },
}

/// Fixed-window rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cache: Arc<dyn CacheProvider>,
    config: LimitsConfig,
}

impl RateLimiter {
    /// Create a new limiter.
    pub fn new(cache: Arc<dyn CacheProvider>, config: LimitsConfig) -> Self {
        Self { cache, config }
    }

    /// Check the per-IP limit for an endpoint scope.
    pub async fn check_ip(&self, scope: &str, ip: &str) -> AppResult<RateDecision> {
        self.check(&format!("ip:{scope}"), ip, self.config.ip_limit)
            .await
    }

    /// Check the per-token limit for an endpoint scope.
    pub async fn check_token(&self, scope: &str, token: &str) -> AppResult<RateDecision> {
        self.check(&format!("token:{scope}"), token, self.config.token_limit)
            .await
    }

    async fn check(&self, scope: &str, identifier: &str, limit: i64) -> AppResult<RateDecision> {
        let window = self.config.window_seconds.max(1);
        let now = Utc::now().timestamp().max(0) as u64;
        let bucket = now / window;

        let key = keys::rate_window(scope, identifier, bucket);
        let count = self.cache.incr(&key, 1).await?;
        if count == 1 {
            // First hit in this window; bound the counter's lifetime.
            self.cache.expire(&key, window).await?;
        }

        if count > limit {
            Ok(RateDecision::Limited {
                retry_after_seconds: window - (now % window),
            })
        } else {
            Ok(RateDecision::Allowed)
        }
    }
}

/// Counts denials per IP and installs temporary blocks.
#[derive(Debug, Clone)]
pub struct AbuseDetector {
    cache: Arc<dyn CacheProvider>,
    config: LimitsConfig,
    telemetry: TelemetryService,
}

impl AbuseDetector {
    /// Create a new detector.
    pub fn new(
        cache: Arc<dyn CacheProvider>,
        config: LimitsConfig,
        telemetry: TelemetryService,
    ) -> Self {
        Self {
            cache,
            config,
            telemetry,
        }
    }

    /// Whether the IP carries an active block. Checked before anything
    /// else in the pipeline.
    pub async fn is_blocked(&self, ip: &str) -> AppResult<bool> {
        self.cache.exists(&keys::ip_block(ip)).await
    }

    /// Feed one denial into the detector, installing a block when the
    /// threshold is crossed.
    pub async fn record_denial(&self, ip: &str, reason: DenyReason) -> AppResult<()> {
        if !reason.counts_toward_abuse() {
            return Ok(());
        }

        let window = self.config.abuse_window_seconds.max(1);
        let bucket = Utc::now().timestamp().max(0) as u64 / window;
        let key = keys::deny_counter(ip, bucket);
        let denials = self.cache.incr(&key, 1).await?;
        if denials == 1 {
            self.cache.expire(&key, window).await?;
        }

        if denials >= self.config.abuse_threshold {
            let installed = self
                .cache
                .set_nx(&keys::ip_block(ip), "1", Some(self.config.block_seconds))
                .await?;
            if installed {
                tracing::warn!(denials, "installed temporary IP block");
                self.telemetry
                    .emit(SecurityEvent::abuse_block("share_raw", denials).with_ip_hash(hash_ip(ip)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_cache::memory::MemoryCacheProvider;

    fn limits() -> LimitsConfig {
        LimitsConfig {
            ip_limit: 3,
            token_limit: 5,
            window_seconds: 60,
            abuse_threshold: 4,
            abuse_window_seconds: 300,
            block_seconds: 900,
        }
    }

    fn cache() -> Arc<dyn CacheProvider> {
        Arc::new(MemoryCacheProvider::for_tests())
    }

    /// A sink that drops events; detector tests only exercise counters.
    #[derive(Debug)]
    struct NullSink;

    #[async_trait::async_trait]
    impl docvault_core::traits::telemetry::TelemetrySink for NullSink {
        async fn record(&self, _event: SecurityEvent) -> AppResult<()> {
            Ok(())
        }
    }

    fn telemetry() -> TelemetryService {
        TelemetryService::new(Arc::new(NullSink))
    }

    #[tokio::test]
    async fn ip_limit_fires_after_the_configured_count() {
        let limiter = RateLimiter::new(cache(), limits());
        for _ in 0..3 {
            assert_eq!(
                limiter.check_ip("share_raw", "203.0.113.9").await.unwrap(),
                RateDecision::Allowed
            );
        }
        assert!(matches!(
            limiter.check_ip("share_raw", "203.0.113.9").await.unwrap(),
            RateDecision::Limited { .. }
        ));
    }

    #[tokio::test]
    async fn limits_are_isolated_per_identifier() {
        let limiter = RateLimiter::new(cache(), limits());
        for _ in 0..3 {
            limiter.check_ip("share_raw", "203.0.113.9").await.unwrap();
        }
        assert_eq!(
            limiter.check_ip("share_raw", "203.0.113.10").await.unwrap(),
            RateDecision::Allowed
        );
    }

    #[tokio::test]
    async fn block_installs_after_threshold_denials() {
        let cache = cache();
        let detector = AbuseDetector::new(Arc::clone(&cache), limits(), telemetry());

        assert!(!detector.is_blocked("203.0.113.9").await.unwrap());
        for _ in 0..4 {
            detector
                .record_denial("203.0.113.9", DenyReason::NotFound)
                .await
                .unwrap();
        }
        assert!(detector.is_blocked("203.0.113.9").await.unwrap());
    }

    #[tokio::test]
    async fn throttle_denials_do_not_extend_blocks() {
        let cache = cache();
        let detector = AbuseDetector::new(Arc::clone(&cache), limits(), telemetry());

        for _ in 0..10 {
            detector
                .record_denial("203.0.113.9", DenyReason::RateLimited)
                .await
                .unwrap();
        }
        assert!(!detector.is_blocked("203.0.113.9").await.unwrap());
    }
}
