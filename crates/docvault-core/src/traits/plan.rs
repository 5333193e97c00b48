//! Plan and monthly quota collaborator interface.
//!
//! Billing internals live elsewhere; the access pipeline only needs the
//! monthly view ceiling for a document owner and an increment hook.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::result::AppResult;

/// Plan limits relevant to serve-time gating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plan {
    /// Monthly view ceiling across all of an owner's shares.
    /// `None` means unlimited.
    pub max_views_per_month: Option<i64>,
}

impl Plan {
    /// The plan applied when no explicit plan row exists.
    pub fn unlimited() -> Self {
        Self {
            max_views_per_month: None,
        }
    }
}

/// Lookup and mutation of owner plans and monthly usage.
#[async_trait]
pub trait PlanProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Plan for a document owner. Owners without a plan row are unlimited.
    async fn plan_for_owner(&self, owner_id: Uuid) -> AppResult<Plan>;

    /// Views consumed by the owner in the current calendar month.
    async fn monthly_views(&self, owner_id: Uuid) -> AppResult<i64>;

    /// Record `n` consumed views against the owner's current month.
    async fn increment_monthly_views(&self, owner_id: Uuid, n: i64) -> AppResult<()>;
}
