//! View consumption ledger.
//!
//! Consuming a view is one conditional atomic UPDATE guarded by the same
//! validity predicate the gate checks, so two requests racing for the
//! last remaining view can never both win. Aliases carry no view counts;
//! only share subjects pass through here.

use std::sync::Arc;

use chrono::Utc;

use docvault_core::deny::DenyReason;
use docvault_core::result::AppResult;
use docvault_database::repositories::share::{ShareRepository, ViewConsumption};
use docvault_entity::share::ShareRecord;

/// Consumes views against share records.
#[derive(Debug, Clone)]
pub struct ViewLedger {
    shares: Arc<ShareRepository>,
}

impl ViewLedger {
    /// Create a new ledger.
    pub fn new(shares: Arc<ShareRepository>) -> Self {
        Self { shares }
    }

    /// Whether a request consumes a view.
    ///
    /// Only a full fetch or a range starting at byte zero counts; the
    /// follow-up range requests a PDF viewer issues for the same render
    /// do not multiply the count.
    pub fn counts_as_view(range_start: Option<u64>) -> bool {
        matches!(range_start, None | Some(0))
    }

    /// Atomically consume one view. Returns the post-increment count, or
    /// the deny reason when the share lost its validity since the gate
    /// evaluated it.
    pub async fn consume(&self, share: &ShareRecord) -> AppResult<Result<i32, DenyReason>> {
        match self.shares.consume_view(share.id).await? {
            ViewConsumption::Consumed { view_count } => Ok(Ok(view_count)),
            ViewConsumption::Rejected => {
                // The guarded update matched nothing; reread to classify
                // what changed underneath us.
                let reason = match self.shares.find_by_id(share.id).await? {
                    None => DenyReason::NotFound,
                    Some(current) => {
                        if !current.is_active {
                            DenyReason::NotFound
                        } else if current.is_revoked() {
                            DenyReason::Revoked
                        } else if current.is_expired(Utc::now()) {
                            DenyReason::Expired
                        } else if current.is_maxed() {
                            DenyReason::Maxed
                        } else {
                            DenyReason::NotFound
                        }
                    }
                };
                Ok(Err(reason))
            }
        }
    }
}
