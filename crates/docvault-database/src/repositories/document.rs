//! Document repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::document::Document;

/// Repository for serve-time document reads.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a document with its full safety classification in one read.
    ///
    /// The organization-disabled flag and any active quarantine override
    /// are computed inside the query so the classification is a single
    /// consistent snapshot.
    pub async fn find_for_serving(&self, document_id: Uuid) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT d.id, d.owner_id, d.org_id, d.bucket, d.object_key, \
                    d.content_type, d.size_bytes, d.lifecycle_status, \
                    d.moderation_status, d.scan_status, d.risk_level, \
                    COALESCE(o.is_disabled, FALSE) AS org_disabled, \
                    EXISTS ( \
                        SELECT 1 FROM quarantine_overrides q \
                        WHERE q.document_id = d.id \
                          AND (q.expires_at IS NULL OR q.expires_at > NOW()) \
                    ) AS quarantine_override, \
                    d.created_at \
             FROM documents d \
             LEFT JOIN organizations o ON o.id = d.org_id \
             WHERE d.id = $1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "failed to load document for serving", e)
        })
    }
}
