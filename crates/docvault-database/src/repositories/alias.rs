//! Alias repository implementation.

use sqlx::PgPool;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::alias::AliasRecord;

/// Repository for named alias lookup.
#[derive(Debug, Clone)]
pub struct AliasRepository {
    pool: PgPool,
}

impl AliasRepository {
    /// Create a new alias repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an alias by its slug. Alias slugs are stored lowercase and
    /// matched case-insensitively. Revoked and expired rows are returned
    /// so the policy gate can classify the denial.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<AliasRecord>> {
        sqlx::query_as::<_, AliasRecord>("SELECT * FROM aliases WHERE slug = LOWER($1)")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "failed to find alias by slug", e)
            })
    }
}
