//! Security event structures consumed by the telemetry sink.
//!
//! Events are append-only and best-effort: emitting one must never change
//! an access decision that has already been made.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::deny::DenyReason;

/// Severity attached to a security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecuritySeverity {
    Info,
    Notice,
    Warning,
    Critical,
}

impl SecuritySeverity {
    /// Stable string form stored in the events table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// A single append-only security event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
    /// Event type, e.g. `access_granted`, `access_denied`, `abuse_block`.
    pub event_type: String,
    /// Severity.
    pub severity: SecuritySeverity,
    /// Scope the event applies to, e.g. `share_raw`, `ticket_redeem`.
    pub scope: String,
    /// Free-form human-readable message.
    pub message: String,
    /// SHA-256 hash of the requesting IP (never the raw address).
    pub ip_hash: Option<String>,
    /// Acting principal, when known.
    pub actor: Option<String>,
    /// Related share, when known.
    pub share_id: Option<Uuid>,
    /// Related document, when known.
    pub document_id: Option<Uuid>,
    /// Free-form structured metadata.
    pub metadata: serde_json::Value,
}

impl SecurityEvent {
    /// Start a new event with the given type, severity, and scope.
    pub fn new(
        event_type: impl Into<String>,
        severity: SecuritySeverity,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            occurred_at: Utc::now(),
            event_type: event_type.into(),
            severity,
            scope: scope.into(),
            message: String::new(),
            ip_hash: None,
            actor: None,
            share_id: None,
            document_id: None,
            metadata: serde_json::Value::Null,
        }
    }

    /// An access-denied event for the given reason.
    pub fn access_denied(scope: impl Into<String>, reason: DenyReason) -> Self {
        let mut event = Self::new("access_denied", SecuritySeverity::Notice, scope);
        event.message = format!("access denied: {}", reason.code());
        event.metadata = serde_json::json!({ "reason": reason.code() });
        event
    }

    /// An access-granted event.
    pub fn access_granted(scope: impl Into<String>) -> Self {
        let mut event = Self::new("access_granted", SecuritySeverity::Info, scope);
        event.message = "access granted".to_string();
        event
    }

    /// An abuse-block installation event.
    pub fn abuse_block(scope: impl Into<String>, denials: i64) -> Self {
        let mut event = Self::new("abuse_block", SecuritySeverity::Warning, scope);
        event.message = format!("temporary IP block installed after {denials} denials");
        event.metadata = serde_json::json!({ "denials": denials });
        event
    }

    /// Attach the hashed requester IP.
    pub fn with_ip_hash(mut self, ip_hash: impl Into<String>) -> Self {
        self.ip_hash = Some(ip_hash.into());
        self
    }

    /// Attach the related share.
    pub fn with_share(mut self, share_id: Uuid) -> Self {
        self.share_id = Some(share_id);
        self
    }

    /// Attach the related document.
    pub fn with_document(mut self, document_id: Uuid) -> Self {
        self.document_id = Some(document_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_event_carries_reason_code() {
        let event = SecurityEvent::access_denied("share_raw", DenyReason::Revoked);
        assert_eq!(event.event_type, "access_denied");
        assert_eq!(event.metadata["reason"], "REVOKED");
        assert_eq!(event.severity, SecuritySeverity::Notice);
    }
}
