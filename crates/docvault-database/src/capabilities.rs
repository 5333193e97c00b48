//! Schema capability detection.
//!
//! Deployments migrate on different schedules, so optional columns are
//! probed once at startup and the result is threaded through application
//! state. Per-request schema sniffing is never performed, and a column
//! required for a security decision is never silently assumed present.

use sqlx::PgPool;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;

/// Optional-schema feature flags resolved at startup.
#[derive(Debug, Clone, Copy)]
pub struct SchemaCapabilities {
    /// Whether `shares.watermark` exists. Absent means shares serve
    /// without watermark settings attached.
    pub share_watermark: bool,
}

impl Default for SchemaCapabilities {
    /// Capabilities assumed by tests that never reach the database.
    fn default() -> Self {
        Self {
            share_watermark: true,
        }
    }
}

impl SchemaCapabilities {
    /// Probe the connected database for optional columns.
    pub async fn detect(pool: &PgPool) -> AppResult<Self> {
        let share_watermark = column_exists(pool, "shares", "watermark").await?;
        tracing::info!(share_watermark, "resolved schema capabilities");
        Ok(Self { share_watermark })
    }
}

async fn column_exists(pool: &PgPool, table: &str, column: &str) -> AppResult<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS ( \
             SELECT 1 FROM information_schema.columns \
             WHERE table_name = $1 AND column_name = $2 \
         )",
    )
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("failed to probe column {table}.{column}"),
            e,
        )
    })
}
