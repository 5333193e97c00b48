//! The ordered policy gate.
//!
//! A pure, synchronous chain of checks over a resolved access and the
//! request context. Evaluation stops at the first failing check, so a
//! quarantined document on a revoked share reports the moderation denial.
//! The precise reason feeds telemetry only; clients see the collapsed
//! status taxonomy.

use chrono::{DateTime, Utc};

use docvault_core::deny::DenyReason;
use docvault_entity::document::{RiskLevel, ScanStatus};
use docvault_entity::ticket::TicketPurpose;

use super::resolver::ResolvedAccess;

/// Owner monthly-quota snapshot taken before evaluation.
#[derive(Debug, Clone, Copy)]
pub struct QuotaSnapshot {
    /// Monthly ceiling, `None` for unlimited plans.
    pub ceiling: Option<i64>,
    /// Views already consumed this calendar month.
    pub used: i64,
}

impl QuotaSnapshot {
    /// A snapshot that never denies.
    pub fn unlimited() -> Self {
        Self {
            ceiling: None,
            used: 0,
        }
    }

    fn exhausted(&self) -> bool {
        matches!(self.ceiling, Some(ceiling) if self.used >= ceiling)
    }
}

/// Request context the gate evaluates against.
#[derive(Debug, Clone)]
pub struct AccessContext<'a> {
    /// What the requester intends to do with the document.
    pub purpose: TicketPurpose,
    /// Requesting country, from the configured edge header.
    pub country: Option<&'a str>,
    /// Whether a valid unlock proof bound to this subject was presented.
    pub unlock_proven: bool,
    /// Email address attested by a valid email proof, if any.
    pub proven_email: Option<&'a str>,
    /// Owner quota snapshot.
    pub quota: QuotaSnapshot,
    /// Evaluation instant.
    pub now: DateTime<Utc>,
}

/// Evaluate the gate. `Ok(())` means every check passed.
pub fn evaluate(access: &ResolvedAccess, ctx: &AccessContext<'_>) -> Result<(), DenyReason> {
    let subject = &access.subject;
    let document = &access.document;
    let share = subject.share();

    // 1. Deactivated records do not exist as far as the outside is
    //    concerned.
    if !subject.is_active() {
        return Err(DenyReason::NotFound);
    }

    // 2. Moderation, with an active quarantine override as the only
    //    exception.
    if !document.moderation_permits() {
        return Err(DenyReason::ModerationBlocked);
    }

    // 3. Exactly clean; pending, failed, and infected all block.
    if document.scan_status != ScanStatus::Clean {
        return Err(DenyReason::ScanBlocked);
    }

    // 4. High-risk documents may be downloaded but not previewed inline.
    if document.risk_level == RiskLevel::High && ctx.purpose == TicketPurpose::Preview {
        return Err(DenyReason::RiskBlocked);
    }

    // Attachment disposition is an opt-in per share.
    if ctx.purpose == TicketPurpose::Download {
        if let Some(share) = share {
            if !share.allow_download {
                return Err(DenyReason::DownloadDisabled);
            }
        }
    }

    // 5. Geography.
    if let Some(share) = share {
        if !share.country_allowed(ctx.country) {
            return Err(DenyReason::GeoBlocked);
        }
    }

    // 6. Revocation.
    if subject.is_revoked() {
        return Err(DenyReason::Revoked);
    }

    // 7. Expiry.
    if subject.is_expired(ctx.now) {
        return Err(DenyReason::Expired);
    }

    // 8. Finite view cap.
    if let Some(share) = share {
        if share.is_maxed() {
            return Err(DenyReason::Maxed);
        }
    }

    // 9. Password protection.
    if subject.password_hash().is_some() && !ctx.unlock_proven {
        return Err(DenyReason::PasswordRequired);
    }

    // 10. Recipient email binding.
    if let Some(share) = share {
        if let Some(recipient) = share.recipient_email.as_deref() {
            let matches = ctx
                .proven_email
                .map(|proven| proven.eq_ignore_ascii_case(recipient))
                .unwrap_or(false);
            if !matches {
                return Err(DenyReason::EmailRequired);
            }
        }
    }

    // 11. Owner monthly quota.
    if ctx.quota.exhausted() {
        return Err(DenyReason::QuotaExceeded);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::resolver::ResolvedSubject;
    use docvault_entity::document::{Document, LifecycleStatus, ModerationStatus};
    use docvault_entity::share::ShareRecord;
    use uuid::Uuid;

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

    fn access(share: ShareRecord, document: Document) -> ResolvedAccess {
        let pointer = document.servable_pointer();
        ResolvedAccess {
            subject: ResolvedSubject::Share(share),
            document,
            pointer,
        }
    }

    fn ctx(purpose: TicketPurpose) -> AccessContext<'static> {
        AccessContext {
            purpose,
            country: None,
            unlock_proven: false,
            proven_email: None,
            quota: QuotaSnapshot::unlimited(),
            now: Utc::now(),
        }
    }

    #[test]
    fn clean_open_share_passes() {
        let a = access(share(), document());
        assert_eq!(evaluate(&a, &ctx(TicketPurpose::Preview)), Ok(()));
    }

    #[test]
    fn inactive_share_is_not_found() {
        let mut s = share();
        s.is_active = false;
        let a = access(s, document());
        assert_eq!(
            evaluate(&a, &ctx(TicketPurpose::Preview)),
            Err(DenyReason::NotFound)
        );
    }

    #[test]
    fn moderation_outranks_revocation() {
        let mut s = share();
        s.revoked_at = Some(Utc::now());
        let mut d = document();
        d.moderation_status = ModerationStatus::Quarantined;
        let a = access(s, d);
        assert_eq!(
            evaluate(&a, &ctx(TicketPurpose::Preview)),
            Err(DenyReason::ModerationBlocked)
        );
    }

    #[test]
    fn quarantine_override_restores_serving() {
        let mut d = document();
        d.moderation_status = ModerationStatus::Quarantined;
        d.quarantine_override = true;
        let a = access(share(), d);
        assert_eq!(evaluate(&a, &ctx(TicketPurpose::Preview)), Ok(()));
    }

    #[test]
    fn unscanned_document_is_scan_blocked() {
        let mut d = document();
        d.scan_status = ScanStatus::Queued;
        let a = access(share(), d);
        assert_eq!(
            evaluate(&a, &ctx(TicketPurpose::Download)),
            Err(DenyReason::ScanBlocked)
        );
    }

    #[test]
    fn high_risk_blocks_preview_but_not_download() {
        let mut d = document();
        d.risk_level = RiskLevel::High;
        let a = access(share(), d);
        assert_eq!(
            evaluate(&a, &ctx(TicketPurpose::Preview)),
            Err(DenyReason::RiskBlocked)
        );
        assert_eq!(evaluate(&a, &ctx(TicketPurpose::Download)), Ok(()));
    }

    #[test]
    fn download_requires_the_share_opt_in() {
        let mut s = share();
        s.allow_download = false;
        let a = access(s, document());
        assert_eq!(
            evaluate(&a, &ctx(TicketPurpose::Download)),
            Err(DenyReason::DownloadDisabled)
        );
        assert_eq!(evaluate(&a, &ctx(TicketPurpose::Preview)), Ok(()));
    }

    #[test]
    fn geo_restriction_checks_the_request_country() {
        let mut s = share();
        s.allowed_countries = Some(vec!["DE".into()]);
        let a = access(s, document());

        let mut context = ctx(TicketPurpose::Preview);
        context.country = Some("US");
        assert_eq!(evaluate(&a, &context), Err(DenyReason::GeoBlocked));

        context.country = Some("de");
        assert_eq!(evaluate(&a, &context), Ok(()));

        context.country = None;
        assert_eq!(evaluate(&a, &context), Err(DenyReason::GeoBlocked));
    }

    #[test]
    fn revoked_then_expired_then_maxed_order() {
        let mut s = share();
        s.revoked_at = Some(Utc::now());
        s.expires_at = Some(Utc::now() - chrono::Duration::hours(1));
        s.max_views = Some(1);
        s.view_count = 1;
        let a = access(s.clone(), document());
        assert_eq!(
            evaluate(&a, &ctx(TicketPurpose::Preview)),
            Err(DenyReason::Revoked)
        );

        s.revoked_at = None;
        let a = access(s.clone(), document());
        assert_eq!(
            evaluate(&a, &ctx(TicketPurpose::Preview)),
            Err(DenyReason::Expired)
        );

        s.expires_at = None;
        let a = access(s, document());
        assert_eq!(
            evaluate(&a, &ctx(TicketPurpose::Preview)),
            Err(DenyReason::Maxed)
        );
    }

    #[test]
    fn password_gate_requires_an_unlock_proof() {
        let mut s = share();
        s.password_hash = Some("$argon2id$...".into());
        let a = access(s, document());

        assert_eq!(
            evaluate(&a, &ctx(TicketPurpose::Preview)),
            Err(DenyReason::PasswordRequired)
        );

        let mut context = ctx(TicketPurpose::Preview);
        context.unlock_proven = true;
        assert_eq!(evaluate(&a, &context), Ok(()));
    }

    #[test]
    fn email_binding_matches_case_insensitively() {
        let mut s = share();
        s.recipient_email = Some("Reader@Example.com".into());
        let a = access(s, document());

        assert_eq!(
            evaluate(&a, &ctx(TicketPurpose::Preview)),
            Err(DenyReason::EmailRequired)
        );

        let mut context = ctx(TicketPurpose::Preview);
        context.proven_email = Some("reader@example.com");
        assert_eq!(evaluate(&a, &context), Ok(()));

        context.proven_email = Some("other@example.com");
        assert_eq!(evaluate(&a, &context), Err(DenyReason::EmailRequired));
    }

    #[test]
    fn exhausted_owner_quota_denies_last() {
        let a = access(share(), document());
        let mut context = ctx(TicketPurpose::Preview);
        context.quota = QuotaSnapshot {
            ceiling: Some(100),
            used: 100,
        };
        assert_eq!(evaluate(&a, &context), Err(DenyReason::QuotaExceeded));

        context.quota.used = 99;
        assert_eq!(evaluate(&a, &context), Ok(()));
    }
}
