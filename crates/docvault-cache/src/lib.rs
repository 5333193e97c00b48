//! # docvault-cache
//!
//! Cache providers for DocVault. Volatile pipeline state lives here:
//! access tickets, rate-limit windows, abuse blocks. Two backends are
//! provided, in-memory (moka) for single-node and tests, Redis for
//! multi-instance deployments.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
