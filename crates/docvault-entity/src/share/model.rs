//! Share record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A share record granting bounded access to one document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareRecord {
    /// Unique share identifier.
    pub id: Uuid,
    /// Opaque token (stored in canonical hex form; legacy rows may hold
    /// the dashed form, which is why lookups try both).
    pub token: String,
    /// Target document.
    pub document_id: Uuid,
    /// Optional recipient email binding.
    pub recipient_email: Option<String>,
    /// Password hash for protected shares.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Whether attachment-disposition downloads are allowed.
    pub allow_download: bool,
    /// Watermark settings applied at render time (rendering out of scope).
    pub watermark: Option<serde_json::Value>,
    /// Maximum number of views. `NULL` or `0` means unlimited.
    pub max_views: Option<i32>,
    /// Current view count.
    pub view_count: i32,
    /// ISO country codes permitted to access. `NULL` means everywhere.
    pub allowed_countries: Option<Vec<String>>,
    /// Whether the share is currently active.
    pub is_active: bool,
    /// When the share was revoked. Set means always denied.
    pub revoked_at: Option<DateTime<Utc>>,
    /// When the share expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the share was created.
    pub created_at: DateTime<Utc>,
}

impl ShareRecord {
    /// Whether the share has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Whether the share has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|t| t <= now).unwrap_or(false)
    }

    /// The finite view cap, if one is configured. `0` means unlimited.
    pub fn finite_cap(&self) -> Option<i32> {
        self.max_views.filter(|m| *m > 0)
    }

    /// Whether the finite view cap has been reached.
    pub fn is_maxed(&self) -> bool {
        self.finite_cap()
            .map(|cap| self.view_count >= cap)
            .unwrap_or(false)
    }

    /// Whether a given country is permitted.
    pub fn country_allowed(&self, country: Option<&str>) -> bool {
        match &self.allowed_countries {
            None => true,
            Some(allowed) if allowed.is_empty() => true,
            Some(allowed) => match country {
                // Restricted shares fail closed on an unknown origin.
                None => false,
                Some(c) => allowed.iter().any(|a| a.eq_ignore_ascii_case(c)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share() -> ShareRecord {
        ShareRecord {
            id: Uuid::new_v4(),
            token: "0123456789abcdef0123456789abcdef".into(),
            document_id: Uuid::new_v4(),
            recipient_email: None,
            password_hash: None,
            allow_download: true,
            watermark: None,
            max_views: None,
            view_count: 0,
            allowed_countries: None,
            is_active: true,
            revoked_at: None,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn zero_max_views_means_unlimited() {
        let mut s = share();
        s.max_views = Some(0);
        s.view_count = 1000;
        assert!(!s.is_maxed());
        assert_eq!(s.finite_cap(), None);
    }

    #[test]
    fn finite_cap_is_enforced() {
        let mut s = share();
        s.max_views = Some(3);
        s.view_count = 3;
        assert!(s.is_maxed());
        s.view_count = 2;
        assert!(!s.is_maxed());
    }

    #[test]
    fn geo_restriction_fails_closed_without_country() {
        let mut s = share();
        s.allowed_countries = Some(vec!["DE".into(), "FR".into()]);
        assert!(s.country_allowed(Some("de")));
        assert!(!s.country_allowed(Some("US")));
        assert!(!s.country_allowed(None));

        s.allowed_countries = None;
        assert!(s.country_allowed(None));
    }
}
