//! Token and alias resolution.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use docvault_core::deny::DenyReason;
use docvault_core::result::AppResult;
use docvault_core::types::ObjectPointer;
use docvault_database::repositories::{AliasRepository, DocumentRepository, ShareRepository};
use docvault_entity::alias::AliasRecord;
use docvault_entity::document::{Document, LifecycleStatus};
use docvault_entity::share::{ShareRecord, ShareToken};

/// The record an access string resolved to.
#[derive(Debug, Clone)]
pub enum ResolvedSubject {
    Share(ShareRecord),
    Alias(AliasRecord),
}

impl ResolvedSubject {
    /// The share record, when the subject is a share.
    pub fn share(&self) -> Option<&ShareRecord> {
        match self {
            Self::Share(share) => Some(share),
            Self::Alias(_) => None,
        }
    }

    /// The key proofs are bound to: the canonical token form for shares,
    /// the slug for aliases.
    pub fn proof_key(&self) -> &str {
        match self {
            Self::Share(share) => &share.token,
            Self::Alias(alias) => &alias.slug,
        }
    }

    /// Password hash, when the subject is protected.
    pub fn password_hash(&self) -> Option<&str> {
        match self {
            Self::Share(share) => share.password_hash.as_deref(),
            Self::Alias(alias) => alias.password_hash.as_deref(),
        }
    }

    /// Whether the subject is active.
    pub fn is_active(&self) -> bool {
        match self {
            Self::Share(share) => share.is_active,
            Self::Alias(alias) => alias.is_active,
        }
    }

    /// Whether the subject has been revoked.
    pub fn is_revoked(&self) -> bool {
        match self {
            Self::Share(share) => share.is_revoked(),
            Self::Alias(alias) => alias.is_revoked(),
        }
    }

    /// Whether the subject has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Share(share) => share.is_expired(now),
            Self::Alias(alias) => alias.is_expired(now),
        }
    }

    /// Target document id.
    pub fn document_id(&self) -> uuid::Uuid {
        match self {
            Self::Share(share) => share.document_id,
            Self::Alias(alias) => alias.document_id,
        }
    }
}

/// A fully resolved access: the subject record, the document with its
/// safety classification, and the object pointer when the document is
/// structurally servable.
#[derive(Debug, Clone)]
pub struct ResolvedAccess {
    pub subject: ResolvedSubject,
    pub document: Document,
    pub pointer: Option<ObjectPointer>,
}

/// Resolution outcome.
#[derive(Debug)]
pub enum Resolution {
    Resolved(Box<ResolvedAccess>),
    Denied(DenyReason),
}

/// Resolves raw access strings into `ResolvedAccess`.
///
/// Read-only; consuming a view is the ledger's job.
#[derive(Debug, Clone)]
pub struct Resolver {
    shares: Arc<ShareRepository>,
    aliases: Arc<AliasRepository>,
    documents: Arc<DocumentRepository>,
}

impl Resolver {
    /// Create a new resolver.
    pub fn new(
        shares: Arc<ShareRepository>,
        aliases: Arc<AliasRepository>,
        documents: Arc<DocumentRepository>,
    ) -> Self {
        Self {
            shares,
            aliases,
            documents,
        }
    }

    /// Resolve a raw token or alias string.
    ///
    /// Token-shaped input is normalized and tried against shares first
    /// (both textual forms in one query); anything else, or a token with
    /// no share row, falls through to alias lookup. Absence at any step
    /// is a plain not-found: the response never reveals whether a token
    /// was syntactically valid.
    pub async fn resolve(&self, raw: &str) -> AppResult<Resolution> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Resolution::Denied(DenyReason::NotFound));
        }

        if let Some(token) = ShareToken::parse(raw) {
            if let Some(share) = self.shares.find_by_token(&token).await? {
                return self.attach_document(ResolvedSubject::Share(share)).await;
            }
        }

        if let Some(alias) = self.aliases.find_by_slug(raw).await? {
            return self.attach_document(ResolvedSubject::Alias(alias)).await;
        }

        Ok(Resolution::Denied(DenyReason::NotFound))
    }

    async fn attach_document(&self, subject: ResolvedSubject) -> AppResult<Resolution> {
        let Some(document) = self
            .documents
            .find_for_serving(subject.document_id())
            .await?
        else {
            return Ok(Resolution::Denied(DenyReason::NotFound));
        };

        // Structural absence: a deleted document or a disabled tenant is
        // indistinguishable from no document at all.
        if document.lifecycle_status != LifecycleStatus::Ready || document.org_disabled {
            return Ok(Resolution::Denied(DenyReason::NotFound));
        }

        let pointer = document.servable_pointer();
        Ok(Resolution::Resolved(Box::new(ResolvedAccess {
            subject,
            document,
            pointer,
        })))
    }
}
