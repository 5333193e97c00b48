//! Alias entity model: human-readable slugs bound to a document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A human-readable alias for a document. The slug is a case-insensitive
/// key; aliases carry no view counting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AliasRecord {
    /// Unique alias identifier.
    pub id: Uuid,
    /// The slug, stored lowercase.
    pub slug: String,
    /// Target document.
    pub document_id: Uuid,
    /// Password hash for protected aliases.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Whether the alias is currently active.
    pub is_active: bool,
    /// When the alias expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the alias was revoked.
    pub revoked_at: Option<DateTime<Utc>>,
    /// When the alias was created.
    pub created_at: DateTime<Utc>,
}

impl AliasRecord {
    /// Whether the alias has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Whether the alias has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|t| t <= now).unwrap_or(false)
    }
}
