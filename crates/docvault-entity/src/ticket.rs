//! Ephemeral access ticket: a purpose-bound indirection standing in for
//! the object-store location. Cache-resident, never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docvault_core::types::ObjectPointer;

/// What the ticket was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPurpose {
    /// Embedded/inline viewing. Redemption via top-level browser
    /// navigation is rejected.
    Preview,
    /// Explicit download. Top-level navigation is allowed so Save-As
    /// flows work, and a prompt replay is tolerated.
    Download,
}

/// Response disposition bound into the ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    /// Header-value form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }

    /// The purpose implied by this disposition.
    pub fn purpose(&self) -> TicketPurpose {
        match self {
            Self::Inline => TicketPurpose::Preview,
            Self::Attachment => TicketPurpose::Download,
        }
    }
}

/// A minted access ticket.
///
/// Redeemable zero or more times until `expires_at`; the binding is
/// re-validated at redemption and the raw object location is never
/// derivable from the ticket id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTicket {
    /// Opaque ticket id (random hex, not related to any record id).
    pub id: String,
    /// Bound document.
    pub document_id: Uuid,
    /// Bound object location.
    pub pointer: ObjectPointer,
    /// Bound response content type.
    pub content_type: String,
    /// Bound response disposition.
    pub disposition: Disposition,
    /// Purpose tag.
    pub purpose: TicketPurpose,
    /// Issuance time.
    pub issued_at: DateTime<Utc>,
    /// Expiry; redemption after this instant is denied.
    pub expires_at: DateTime<Utc>,
}

impl AccessTicket {
    /// Whether the ticket has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
