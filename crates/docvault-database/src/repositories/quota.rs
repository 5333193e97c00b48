//! Owner plan and monthly view-quota repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::plan::{Plan, PlanProvider};

/// PostgreSQL-backed plan and quota provider.
///
/// Monthly usage is keyed by owner and calendar month (`YYYY-MM` in UTC),
/// so rollover needs no scheduled job.
#[derive(Debug, Clone)]
pub struct QuotaRepository {
    pool: PgPool,
}

impl QuotaRepository {
    /// Create a new quota repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn current_period() -> String {
        chrono::Utc::now().format("%Y-%m").to_string()
    }
}

#[async_trait]
impl PlanProvider for QuotaRepository {
    async fn plan_for_owner(&self, owner_id: Uuid) -> AppResult<Plan> {
        let ceiling: Option<Option<i64>> =
            sqlx::query_scalar("SELECT max_views_per_month FROM plans WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "failed to load owner plan", e)
                })?;

        Ok(match ceiling {
            Some(max_views_per_month) => Plan {
                max_views_per_month,
            },
            None => Plan::unlimited(),
        })
    }

    async fn monthly_views(&self, owner_id: Uuid) -> AppResult<i64> {
        let views: Option<i64> = sqlx::query_scalar(
            "SELECT views FROM owner_view_usage WHERE owner_id = $1 AND period = $2",
        )
        .bind(owner_id)
        .bind(Self::current_period())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "failed to load monthly usage", e)
        })?;

        Ok(views.unwrap_or(0))
    }

    async fn increment_monthly_views(&self, owner_id: Uuid, n: i64) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO owner_view_usage (owner_id, period, views) VALUES ($1, $2, $3) \
             ON CONFLICT (owner_id, period) \
             DO UPDATE SET views = owner_view_usage.views + EXCLUDED.views",
        )
        .bind(owner_id)
        .bind(Self::current_period())
        .bind(n)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "failed to record monthly usage", e)
        })?;
        Ok(())
    }
}
