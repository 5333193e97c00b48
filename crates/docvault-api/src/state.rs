//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use docvault_cache::provider::CacheManager;
use docvault_core::config::AppConfig;
use docvault_database::{DatabasePool, SchemaCapabilities};
use docvault_service::AccessService;
use docvault_storage::StorageManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL pool, used directly only by the health endpoint.
    pub db: DatabasePool,
    /// Cache manager (Redis or in-memory).
    pub cache: Arc<CacheManager>,
    /// Presigned URL signer.
    pub storage: Arc<StorageManager>,
    /// The access pipeline.
    pub access: Arc<AccessService>,
    /// Optional-schema flags resolved at startup.
    pub capabilities: SchemaCapabilities,
}
