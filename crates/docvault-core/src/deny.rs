//! The closed deny-reason taxonomy.
//!
//! Every refusal the access pipeline can produce is one of these variants.
//! The reason is recorded in telemetry verbatim; the client only ever sees
//! the collapsed HTTP status assigned once in the API layer, so reasons
//! never leak through response bodies.

use serde::{Deserialize, Serialize};

/// Why a request was refused.
///
/// Ordering of the variants loosely follows the policy-gate check order,
/// but nothing depends on it; matching is always exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    /// No record for the token/alias, or the record is inactive, or the
    /// document is structurally unservable. Also used for a valid token
    /// bound to a different document: the conflation is intentional, it
    /// denies attackers an existence oracle.
    NotFound,
    /// Moderation status forbids serving (disabled/deleted, or quarantined
    /// without an active override).
    ModerationBlocked,
    /// Malware scan status is anything other than clean.
    ScanBlocked,
    /// High-risk document requested with inline/preview purpose.
    RiskBlocked,
    /// Requesting country is outside the share's allowed set.
    GeoBlocked,
    /// The share was revoked.
    Revoked,
    /// The share or alias expired.
    Expired,
    /// The finite view cap has been reached.
    Maxed,
    /// Password protection with no valid unlock proof.
    PasswordRequired,
    /// Recipient email binding with no valid email proof.
    EmailRequired,
    /// Download requested on a share that forbids downloads.
    DownloadDisabled,
    /// The owner's plan has no monthly view quota remaining.
    QuotaExceeded,
    /// A per-IP or per-token rate limit fired.
    RateLimited,
    /// The requesting IP carries an active abuse block.
    AbuseBlocked,
    /// Top-level browser navigation against a preview-purpose ticket.
    NavigationBlocked,
}

impl DenyReason {
    /// Stable string code used in telemetry events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::ModerationBlocked => "MODERATION_BLOCKED",
            Self::ScanBlocked => "SCAN_BLOCKED",
            Self::RiskBlocked => "RISK_BLOCKED",
            Self::GeoBlocked => "GEO_BLOCKED",
            Self::Revoked => "REVOKED",
            Self::Expired => "EXPIRED",
            Self::Maxed => "MAXED",
            Self::PasswordRequired => "PASSWORD_REQUIRED",
            Self::EmailRequired => "EMAIL_REQUIRED",
            Self::DownloadDisabled => "DOWNLOAD_DISABLED",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::RateLimited => "RATE_LIMITED",
            Self::AbuseBlocked => "ABUSE_BLOCKED",
            Self::NavigationBlocked => "NAVIGATION_BLOCKED",
        }
    }

    /// Whether this deny should feed the per-IP abuse detector.
    ///
    /// Rate-limit and abuse-block denials are excluded so an installed
    /// block does not keep extending itself.
    pub fn counts_toward_abuse(&self) -> bool {
        !matches!(self, Self::RateLimited | Self::AbuseBlocked)
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(DenyReason::Revoked.code(), "REVOKED");
        assert_eq!(DenyReason::NavigationBlocked.code(), "NAVIGATION_BLOCKED");
    }

    #[test]
    fn throttle_denials_do_not_feed_abuse_detector() {
        assert!(!DenyReason::RateLimited.counts_toward_abuse());
        assert!(!DenyReason::AbuseBlocked.counts_toward_abuse());
        assert!(DenyReason::NotFound.counts_toward_abuse());
        assert!(DenyReason::PasswordRequired.counts_toward_abuse());
    }
}
