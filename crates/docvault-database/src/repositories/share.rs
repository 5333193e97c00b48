//! Share repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::share::{ShareRecord, ShareToken};

use crate::capabilities::SchemaCapabilities;

/// Column list for share reads when the watermark column exists.
const SHARE_COLUMNS: &str = "id, token, document_id, recipient_email, password_hash, \
     allow_download, watermark, max_views, view_count, allowed_countries, \
     is_active, revoked_at, expires_at, created_at";

/// Column list for deployments that have not migrated the watermark
/// column yet; the field decodes as absent.
const SHARE_COLUMNS_NO_WATERMARK: &str = "id, token, document_id, recipient_email, password_hash, \
     allow_download, NULL::jsonb AS watermark, max_views, view_count, allowed_countries, \
     is_active, revoked_at, expires_at, created_at";

/// Outcome of the atomic view-consumption update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewConsumption {
    /// The view was recorded; `view_count` is the post-increment value.
    Consumed { view_count: i32 },
    /// The guarded update matched no row. The share was concurrently
    /// revoked, expired, deactivated, or its cap was reached.
    Rejected,
}

/// Repository for share lookup and view-ledger operations.
#[derive(Debug, Clone)]
pub struct ShareRepository {
    pool: PgPool,
    capabilities: SchemaCapabilities,
}

impl ShareRepository {
    /// Create a new share repository.
    pub fn new(pool: PgPool, capabilities: SchemaCapabilities) -> Self {
        Self { pool, capabilities }
    }

    fn columns(&self) -> &'static str {
        if self.capabilities.share_watermark {
            SHARE_COLUMNS
        } else {
            SHARE_COLUMNS_NO_WATERMARK
        }
    }

    /// Find a share by normalized token, trying both textual forms in
    /// one round trip. Rows are returned regardless of active or revoked
    /// state so the policy gate can classify the denial.
    pub async fn find_by_token(&self, token: &ShareToken) -> AppResult<Option<ShareRecord>> {
        let candidates: Vec<String> = token.candidates().to_vec();
        let sql = format!("SELECT {} FROM shares WHERE token = ANY($1)", self.columns());
        sqlx::query_as::<_, ShareRecord>(&sql)
            .bind(&candidates)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "failed to find share by token", e)
            })
    }

    /// Find a share by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ShareRecord>> {
        let sql = format!("SELECT {} FROM shares WHERE id = $1", self.columns());
        sqlx::query_as::<_, ShareRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "failed to find share", e))
    }

    /// Atomically consume one view.
    ///
    /// The guard conditions live inside the UPDATE itself so that two
    /// concurrent requests racing for the last remaining view can never
    /// both succeed. A cap of NULL or zero is unlimited.
    pub async fn consume_view(&self, share_id: Uuid) -> AppResult<ViewConsumption> {
        let row: Option<i32> = sqlx::query_scalar(
            "UPDATE shares SET view_count = view_count + 1 \
             WHERE id = $1 \
               AND is_active = TRUE \
               AND revoked_at IS NULL \
               AND (expires_at IS NULL OR expires_at > NOW()) \
               AND (max_views IS NULL OR max_views <= 0 OR view_count < max_views) \
             RETURNING view_count",
        )
        .bind(share_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "failed to consume view", e))?;

        Ok(match row {
            Some(view_count) => ViewConsumption::Consumed { view_count },
            None => ViewConsumption::Rejected,
        })
    }
}
