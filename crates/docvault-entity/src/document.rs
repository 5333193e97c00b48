//! Document entity model and safety classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use docvault_core::types::ObjectPointer;

/// Document lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "doc_lifecycle", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Ready,
    Deleted,
}

/// Operator-controlled moderation status, independent of malware scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "moderation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Active,
    Quarantined,
    Disabled,
    Deleted,
}

/// Malware-scan pipeline outcome. Only `Clean` permits serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "scan_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Unscanned,
    Queued,
    Running,
    Clean,
    Failed,
    Error,
    Infected,
    Quarantined,
}

/// Heuristic severity classification used to restrict inline preview
/// without blocking download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "risk_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// A classified document as loaded by the resolver.
///
/// `org_disabled` and `quarantine_override` are computed in the fetch
/// query (organization join and active-override subquery) so the whole
/// classification arrives in one read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique document identifier.
    pub id: Uuid,
    /// Owning user, for plan quota accounting.
    pub owner_id: Uuid,
    /// Owning organization, if any.
    pub org_id: Option<Uuid>,
    /// Object-store bucket.
    pub bucket: String,
    /// Object-store key.
    pub object_key: String,
    /// Content type served on redemption.
    pub content_type: String,
    /// Object size in bytes.
    pub size_bytes: i64,
    /// Lifecycle status.
    pub lifecycle_status: LifecycleStatus,
    /// Moderation status.
    pub moderation_status: ModerationStatus,
    /// Malware scan status.
    pub scan_status: ScanStatus,
    /// Risk classification.
    pub risk_level: RiskLevel,
    /// Whether the owning organization is disabled (false when unbound).
    pub org_disabled: bool,
    /// Whether an active quarantine override exists.
    pub quarantine_override: bool,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Whether moderation status permits serving, counting an active
    /// quarantine override as an exception.
    pub fn moderation_permits(&self) -> bool {
        match self.moderation_status {
            ModerationStatus::Active => true,
            ModerationStatus::Quarantined => self.quarantine_override,
            ModerationStatus::Disabled | ModerationStatus::Deleted => false,
        }
    }

    /// The object pointer, populated only when the document is
    /// structurally servable.
    ///
    /// This is the single place the structural invariant lives: deleted
    /// lifecycle, disabled organization, blocking moderation status, or
    /// any scan status other than clean never yields a pointer, no matter
    /// what the caller intends to do with it.
    pub fn servable_pointer(&self) -> Option<ObjectPointer> {
        if self.lifecycle_status != LifecycleStatus::Ready {
            return None;
        }
        if self.org_disabled {
            return None;
        }
        if self.scan_status != ScanStatus::Clean {
            return None;
        }
        if !self.moderation_permits() {
            return None;
        }
        Some(ObjectPointer::new(
            self.bucket.clone(),
            self.object_key.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        Document {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            org_id: None,
            bucket: "vault".into(),
            object_key: "docs/report.pdf".into(),
            content_type: "application/pdf".into(),
            size_bytes: 1024,
            lifecycle_status: LifecycleStatus::Ready,
            moderation_status: ModerationStatus::Active,
            scan_status: ScanStatus::Clean,
            risk_level: RiskLevel::Low,
            org_disabled: false,
            quarantine_override: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn clean_active_document_is_servable() {
        assert!(document().servable_pointer().is_some());
    }

    #[test]
    fn any_non_clean_scan_status_blocks_serving() {
        for status in [
            ScanStatus::Unscanned,
            ScanStatus::Queued,
            ScanStatus::Running,
            ScanStatus::Failed,
            ScanStatus::Error,
            ScanStatus::Infected,
            ScanStatus::Quarantined,
        ] {
            let mut doc = document();
            doc.scan_status = status;
            assert!(doc.servable_pointer().is_none(), "{status:?} must block");
        }
    }

    #[test]
    fn quarantine_needs_an_active_override() {
        let mut doc = document();
        doc.moderation_status = ModerationStatus::Quarantined;
        assert!(doc.servable_pointer().is_none());

        doc.quarantine_override = true;
        assert!(doc.servable_pointer().is_some());
    }

    #[test]
    fn disabled_org_blocks_even_when_clean() {
        let mut doc = document();
        doc.org_disabled = true;
        assert!(doc.servable_pointer().is_none());
    }

    #[test]
    fn deleted_lifecycle_blocks() {
        let mut doc = document();
        doc.lifecycle_status = LifecycleStatus::Deleted;
        assert!(doc.servable_pointer().is_none());
    }
}
