//! The authorize pipeline, in fixed order: abuse block, rate limits,
//! resolve, policy gate, view ledger, ticket mint.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use docvault_auth::password::PasswordHasher;
use docvault_auth::proof::ProofService;
use docvault_core::deny::DenyReason;
use docvault_core::error::AppError;
use docvault_core::events::SecurityEvent;
use docvault_core::result::AppResult;
use docvault_core::traits::plan::PlanProvider;
use docvault_entity::ticket::Disposition;

use crate::abuse::{AbuseDetector, RateDecision, RateLimiter};
use crate::telemetry::{hash_ip, TelemetryService};
use crate::ticket::TicketService;

use super::ledger::ViewLedger;
use super::policy::{self, AccessContext, QuotaSnapshot};
use super::resolver::{ResolvedSubject, Resolution, Resolver};

/// Endpoint scope for the gated fetch.
const SCOPE_RAW: &str = "share_raw";
/// Endpoint scope for password unlock attempts.
const SCOPE_UNLOCK: &str = "share_unlock";

/// One gated fetch request, as seen by the pipeline.
#[derive(Debug, Clone)]
pub struct RawRequest<'a> {
    /// Raw token or alias string from the path.
    pub subject: &'a str,
    /// Requesting IP.
    pub ip: &'a str,
    /// Requesting country, from the configured edge header.
    pub country: Option<&'a str>,
    /// Requested disposition (defaults to inline upstream).
    pub disposition: Disposition,
    /// Unlock proof from the cookie, if present.
    pub unlock_proof: Option<&'a str>,
    /// Email proof from the `ep` query parameter, if present.
    pub email_proof: Option<&'a str>,
    /// Start offset of a `Range` request, if one was sent.
    pub range_start: Option<u64>,
}

/// Pipeline outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizeOutcome {
    /// Access granted; redirect the client to `location`.
    Granted { location: String },
    /// Access denied. `retry_after` accompanies rate-limit denials.
    Denied {
        reason: DenyReason,
        retry_after: Option<u64>,
    },
}

/// Gate metadata returned to the share landing page.
#[derive(Debug, Clone, Serialize)]
pub struct GateInfo {
    /// Whether a password unlock is required.
    pub password_required: bool,
    /// Whether the share is bound to a recipient email.
    pub email_required: bool,
    /// Whether attachment downloads are allowed.
    pub allow_download: bool,
    /// Watermark settings to apply at render time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<serde_json::Value>,
}

/// Orchestrates the whole access pipeline.
#[derive(Debug, Clone)]
pub struct AccessService {
    resolver: Resolver,
    ledger: ViewLedger,
    tickets: TicketService,
    limiter: RateLimiter,
    abuse: AbuseDetector,
    plans: Arc<dyn PlanProvider>,
    unlock_proofs: ProofService,
    email_proofs: ProofService,
    hasher: PasswordHasher,
    telemetry: TelemetryService,
}

impl AccessService {
    /// Wire the pipeline together.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resolver: Resolver,
        ledger: ViewLedger,
        tickets: TicketService,
        limiter: RateLimiter,
        abuse: AbuseDetector,
        plans: Arc<dyn PlanProvider>,
        unlock_proofs: ProofService,
        email_proofs: ProofService,
        hasher: PasswordHasher,
        telemetry: TelemetryService,
    ) -> Self {
        Self {
            resolver,
            ledger,
            tickets,
            limiter,
            abuse,
            plans,
            unlock_proofs,
            email_proofs,
            hasher,
            telemetry,
        }
    }

    /// Gate metadata for the landing page. Denied lookups surface the
    /// same deny taxonomy as the raw path but consume nothing.
    pub async fn gate_info(&self, subject: &str) -> AppResult<Result<GateInfo, DenyReason>> {
        let resolved = match self.resolver.resolve(subject).await? {
            Resolution::Resolved(resolved) => resolved,
            Resolution::Denied(reason) => return Ok(Err(reason)),
        };
        if !resolved.subject.is_active() {
            return Ok(Err(DenyReason::NotFound));
        }

        let share = resolved.subject.share();
        Ok(Ok(GateInfo {
            password_required: resolved.subject.password_hash().is_some(),
            email_required: share
                .map(|s| s.recipient_email.is_some())
                .unwrap_or(false),
            allow_download: share.map(|s| s.allow_download).unwrap_or(true),
            watermark: share.and_then(|s| s.watermark.clone()),
        }))
    }

    /// Verify a share password and issue an unlock proof on success.
    pub async fn unlock(
        &self,
        subject: &str,
        password: &str,
        ip: &str,
    ) -> AppResult<Result<String, DenyReason>> {
        // Unlock attempts are guess oracles, so the abuse block and the
        // per-IP limit apply before any Argon2 work is done.
        if self.abuse.is_blocked(ip).await? {
            self.telemetry.emit(
                SecurityEvent::access_denied(SCOPE_UNLOCK, DenyReason::AbuseBlocked)
                    .with_ip_hash(hash_ip(ip)),
            );
            return Ok(Err(DenyReason::AbuseBlocked));
        }
        if let RateDecision::Limited { .. } = self.limiter.check_ip(SCOPE_UNLOCK, ip).await? {
            self.note_denial(SCOPE_UNLOCK, DenyReason::RateLimited, ip, None, None)
                .await?;
            return Ok(Err(DenyReason::RateLimited));
        }

        let resolved = match self.resolver.resolve(subject).await? {
            Resolution::Resolved(resolved) => resolved,
            Resolution::Denied(reason) => {
                self.note_denial(SCOPE_UNLOCK, reason, ip, None, None).await?;
                return Ok(Err(reason));
            }
        };
        if !resolved.subject.is_active() {
            return Ok(Err(DenyReason::NotFound));
        }

        let proof_key = resolved.subject.proof_key();
        if let Some(hash) = resolved.subject.password_hash() {
            if !self.hasher.verify_password(password, hash)? {
                self.note_denial(
                    SCOPE_UNLOCK,
                    DenyReason::PasswordRequired,
                    ip,
                    resolved.subject.share().map(|s| s.id),
                    Some(resolved.document.id),
                )
                .await?;
                return Ok(Err(DenyReason::PasswordRequired));
            }
        }

        let proof = self.unlock_proofs.issue(proof_key, None)?;
        Ok(Ok(proof))
    }

    /// Run the gated fetch pipeline.
    pub async fn authorize_raw(&self, req: RawRequest<'_>) -> AppResult<AuthorizeOutcome> {
        // An installed abuse block short-circuits everything.
        if self.abuse.is_blocked(req.ip).await? {
            self.telemetry.emit(
                SecurityEvent::access_denied(SCOPE_RAW, DenyReason::AbuseBlocked)
                    .with_ip_hash(hash_ip(req.ip)),
            );
            return Ok(AuthorizeOutcome::Denied {
                reason: DenyReason::AbuseBlocked,
                retry_after: None,
            });
        }

        // Fixed-window limits, IP first so a noisy IP cannot exhaust a
        // token's budget for everyone else.
        if let RateDecision::Limited {
            retry_after_seconds,
        } = self.limiter.check_ip(SCOPE_RAW, req.ip).await?
        {
            return self
                .deny(
                    SCOPE_RAW,
                    DenyReason::RateLimited,
                    req.ip,
                    None,
                    None,
                    Some(retry_after_seconds),
                )
                .await;
        }
        let token_key = req.subject.trim().to_ascii_lowercase();
        if let RateDecision::Limited {
            retry_after_seconds,
        } = self.limiter.check_token(SCOPE_RAW, &token_key).await?
        {
            return self
                .deny(
                    SCOPE_RAW,
                    DenyReason::RateLimited,
                    req.ip,
                    None,
                    None,
                    Some(retry_after_seconds),
                )
                .await;
        }

        let resolved = match self.resolver.resolve(req.subject).await? {
            Resolution::Resolved(resolved) => resolved,
            Resolution::Denied(reason) => {
                return self.deny(SCOPE_RAW, reason, req.ip, None, None, None).await;
            }
        };
        let share_id = resolved.subject.share().map(|s| s.id);
        let document_id = resolved.document.id;

        // Proofs: a defective proof is simply absent.
        let proof_key = resolved.subject.proof_key();
        let unlock_proven = req
            .unlock_proof
            .map(|proof| self.unlock_proofs.verify(proof, proof_key).is_some())
            .unwrap_or(false);
        let email_claims = req
            .email_proof
            .and_then(|proof| self.email_proofs.verify(proof, proof_key));
        let proven_email = email_claims.as_ref().and_then(|c| c.email.as_deref());

        // Owner quota snapshot; skipped entirely for unlimited plans.
        let plan = self.plans.plan_for_owner(resolved.document.owner_id).await?;
        let quota = match plan.max_views_per_month {
            Some(ceiling) => QuotaSnapshot {
                ceiling: Some(ceiling),
                used: self.plans.monthly_views(resolved.document.owner_id).await?,
            },
            None => QuotaSnapshot::unlimited(),
        };

        let context = AccessContext {
            purpose: req.disposition.purpose(),
            country: req.country,
            unlock_proven,
            proven_email,
            quota,
            now: Utc::now(),
        };
        if let Err(reason) = policy::evaluate(&resolved, &context) {
            return self
                .deny(SCOPE_RAW, reason, req.ip, share_id, Some(document_id), None)
                .await;
        }

        // The ledger runs only for counting fetches on share subjects.
        if let ResolvedSubject::Share(ref share) = resolved.subject {
            if ViewLedger::counts_as_view(req.range_start) {
                match self.ledger.consume(share).await? {
                    Ok(view_count) => {
                        tracing::debug!(share_id = %share.id, view_count, "view consumed");
                        let plans = Arc::clone(&self.plans);
                        let owner_id = resolved.document.owner_id;
                        tokio::spawn(async move {
                            if let Err(error) = plans.increment_monthly_views(owner_id, 1).await {
                                tracing::warn!(%error, "failed to record monthly view");
                            }
                        });
                    }
                    Err(reason) => {
                        return self
                            .deny(SCOPE_RAW, reason, req.ip, share_id, Some(document_id), None)
                            .await;
                    }
                }
            }
        }

        let pointer = resolved.pointer.clone().ok_or_else(|| {
            AppError::internal("document lost servability during authorization")
        })?;
        let ticket = self
            .tickets
            .mint(
                document_id,
                pointer,
                resolved.document.content_type.clone(),
                req.disposition,
            )
            .await?;

        let mut event = SecurityEvent::access_granted(SCOPE_RAW)
            .with_ip_hash(hash_ip(req.ip))
            .with_document(document_id);
        if let Some(share_id) = share_id {
            event = event.with_share(share_id);
        }
        self.telemetry.emit(event);

        Ok(AuthorizeOutcome::Granted {
            location: format!("/t/{}", ticket.id),
        })
    }

    /// Redeem a ticket; shared handle for the API layer.
    pub fn tickets(&self) -> &TicketService {
        &self.tickets
    }

    /// Telemetry handle for the API layer.
    pub fn telemetry(&self) -> &TelemetryService {
        &self.telemetry
    }

    async fn deny(
        &self,
        scope: &str,
        reason: DenyReason,
        ip: &str,
        share_id: Option<Uuid>,
        document_id: Option<Uuid>,
        retry_after: Option<u64>,
    ) -> AppResult<AuthorizeOutcome> {
        self.note_denial(scope, reason, ip, share_id, document_id)
            .await?;
        Ok(AuthorizeOutcome::Denied {
            reason,
            retry_after,
        })
    }

    async fn note_denial(
        &self,
        scope: &str,
        reason: DenyReason,
        ip: &str,
        share_id: Option<Uuid>,
        document_id: Option<Uuid>,
    ) -> AppResult<()> {
        let mut event = SecurityEvent::access_denied(scope, reason).with_ip_hash(hash_ip(ip));
        if let Some(share_id) = share_id {
            event = event.with_share(share_id);
        }
        if let Some(document_id) = document_id {
            event = event.with_document(document_id);
        }
        self.telemetry.emit(event);
        self.abuse.record_denial(ip, reason).await
    }
}
