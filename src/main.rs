//! DocVault server entry point.
//!
//! Wires the database, cache, storage signer, and the access pipeline
//! together and serves the HTTP API until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing;
use tracing_subscriber::{fmt, EnvFilter};

use docvault_core::config::AppConfig;
use docvault_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("DOCVAULT_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    tracing::info!("Loaded configuration (env: {})", env);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DocVault v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = docvault_database::DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    docvault_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    let capabilities = docvault_database::SchemaCapabilities::detect(db.pool()).await?;

    // ── Step 2: Initialize cache ─────────────────────────────────
    tracing::info!(
        "Initializing cache (provider: {})...",
        config.cache.provider
    );
    let cache = Arc::new(docvault_cache::CacheManager::new(&config.cache).await?);
    tracing::info!("Cache initialized");

    // ── Step 3: Initialize object URL signer ─────────────────────
    tracing::info!(
        "Initializing storage signer (provider: {})...",
        config.storage.provider
    );
    let storage = Arc::new(docvault_storage::StorageManager::new(&config.storage).await?);
    tracing::info!("Storage signer initialized");

    // ── Step 4: Initialize repositories ──────────────────────────
    let share_repo = Arc::new(
        docvault_database::repositories::ShareRepository::new(db.pool().clone(), capabilities),
    );
    let alias_repo = Arc::new(docvault_database::repositories::AliasRepository::new(
        db.pool().clone(),
    ));
    let document_repo = Arc::new(docvault_database::repositories::DocumentRepository::new(
        db.pool().clone(),
    ));
    let quota_repo = Arc::new(docvault_database::repositories::QuotaRepository::new(
        db.pool().clone(),
    ));
    let event_repo = Arc::new(
        docvault_database::repositories::SecurityEventRepository::new(db.pool().clone()),
    );

    // ── Step 5: Initialize access pipeline ───────────────────────
    tracing::info!("Initializing access pipeline...");
    let telemetry = docvault_service::telemetry::TelemetryService::new(event_repo);
    let limiter =
        docvault_service::abuse::RateLimiter::new(cache.provider(), config.limits.clone());
    let abuse = docvault_service::abuse::AbuseDetector::new(
        cache.provider(),
        config.limits.clone(),
        telemetry.clone(),
    );
    let resolver = docvault_service::access::resolver::Resolver::new(
        Arc::clone(&share_repo),
        alias_repo,
        document_repo,
    );
    let ledger = docvault_service::access::ledger::ViewLedger::new(share_repo);
    let tickets = docvault_service::ticket::TicketService::new(
        cache.provider(),
        config.access.ticket_ttl_seconds,
    );
    let unlock_proofs = docvault_auth::proof::ProofService::new(
        &config.access.unlock_secret,
        docvault_auth::proof::ProofPurpose::Unlock,
        config.access.unlock_ttl_seconds,
    );
    let email_proofs = docvault_auth::proof::ProofService::new(
        &config.access.email_proof_secret,
        docvault_auth::proof::ProofPurpose::Email,
        config.access.unlock_ttl_seconds,
    );
    let hasher = docvault_auth::password::PasswordHasher::new();

    let access = Arc::new(docvault_service::access::AccessService::new(
        resolver,
        ledger,
        tickets,
        limiter,
        abuse,
        quota_repo,
        unlock_proofs,
        email_proofs,
        hasher,
        telemetry,
    ));
    tracing::info!("Access pipeline initialized");

    // ── Step 6: Build and start HTTP server ──────────────────────
    tracing::info!(
        "Starting HTTP server on {}:{}...",
        config.server.host,
        config.server.port
    );
    let shutdown_grace = config.server.shutdown_grace_seconds;

    let app_state = docvault_api::state::AppState {
        config: Arc::new(config.clone()),
        db: db.clone(),
        cache,
        storage,
        access,
        capabilities,
    };

    let app = docvault_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("DocVault server listening on {}", addr);

    // ── Step 7: Graceful shutdown ────────────────────────────────
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    let _ = tokio::time::timeout(
        std::time::Duration::from_secs(shutdown_grace),
        db.close(),
    )
    .await;

    tracing::info!("DocVault server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
