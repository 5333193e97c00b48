//! Append-only security event repository.

use async_trait::async_trait;
use sqlx::PgPool;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::events::SecurityEvent;
use docvault_core::result::AppResult;
use docvault_core::traits::telemetry::TelemetrySink;

/// PostgreSQL-backed telemetry sink. Events are inserted and never
/// updated or deleted by the application.
#[derive(Debug, Clone)]
pub struct SecurityEventRepository {
    pool: PgPool,
}

impl SecurityEventRepository {
    /// Create a new security event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TelemetrySink for SecurityEventRepository {
    async fn record(&self, event: SecurityEvent) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO security_events \
             (occurred_at, event_type, severity, scope, message, ip_hash, actor, \
              share_id, document_id, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(event.occurred_at)
        .bind(&event.event_type)
        .bind(event.severity.as_str())
        .bind(&event.scope)
        .bind(&event.message)
        .bind(&event.ip_hash)
        .bind(&event.actor)
        .bind(event.share_id)
        .bind(event.document_id)
        .bind(&event.metadata)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "failed to append security event", e)
        })?;
        Ok(())
    }
}
