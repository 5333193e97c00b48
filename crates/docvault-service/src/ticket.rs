//! Access ticket minting and redemption.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use uuid::Uuid;

use docvault_cache::keys;
use docvault_core::deny::DenyReason;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::cache::CacheProvider;
use docvault_core::types::ObjectPointer;
use docvault_entity::ticket::{AccessTicket, Disposition, TicketPurpose};

/// Fetch-metadata signals extracted from the redemption request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationSignals {
    /// `Sec-Fetch-Dest: document`
    pub dest_document: bool,
    /// `Sec-Fetch-Mode: navigate`
    pub mode_navigate: bool,
    /// `Sec-Fetch-User: ?1`
    pub user_activated: bool,
}

impl NavigationSignals {
    /// Whether the request is a user-initiated top-level navigation.
    ///
    /// All three signals must agree; embedded viewers and subresource
    /// fetches never present this combination.
    pub fn is_top_level_navigation(&self) -> bool {
        self.dest_document && self.mode_navigate && self.user_activated
    }
}

/// Mints and redeems cache-resident access tickets.
#[derive(Debug, Clone)]
pub struct TicketService {
    cache: Arc<dyn CacheProvider>,
    ttl_seconds: u64,
}

impl TicketService {
    /// Create a new ticket service.
    pub fn new(cache: Arc<dyn CacheProvider>, ttl_seconds: u64) -> Self {
        Self { cache, ttl_seconds }
    }

    fn random_id() -> String {
        let mut bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Mint a ticket binding the authorized response together. The id is
    /// random and unrelated to any record id.
    pub async fn mint(
        &self,
        document_id: Uuid,
        pointer: ObjectPointer,
        content_type: String,
        disposition: Disposition,
    ) -> AppResult<AccessTicket> {
        let now = Utc::now();
        let ticket = AccessTicket {
            id: Self::random_id(),
            document_id,
            pointer,
            content_type,
            disposition,
            purpose: disposition.purpose(),
            issued_at: now,
            expires_at: now + Duration::seconds(self.ttl_seconds as i64),
        };

        let payload = serde_json::to_string(&ticket)
            .map_err(|e| AppError::internal(format!("failed to encode ticket: {e}")))?;
        self.cache
            .set(&keys::ticket(&ticket.id), &payload, Some(self.ttl_seconds))
            .await?;

        Ok(ticket)
    }

    /// Redeem a ticket.
    ///
    /// Missing, malformed, and expired tickets are all the same plain
    /// not-found. Preview tickets additionally reject user-initiated
    /// top-level navigation; download tickets permit it and tolerate
    /// replay within the TTL.
    pub async fn redeem(
        &self,
        ticket_id: &str,
        nav: NavigationSignals,
        now: DateTime<Utc>,
    ) -> AppResult<Result<AccessTicket, DenyReason>> {
        if ticket_id.len() != 32 || !ticket_id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Err(DenyReason::NotFound));
        }

        let Some(payload) = self.cache.get(&keys::ticket(ticket_id)).await? else {
            return Ok(Err(DenyReason::NotFound));
        };
        let ticket: AccessTicket = match serde_json::from_str(&payload) {
            Ok(ticket) => ticket,
            Err(error) => {
                tracing::warn!(%error, "undecodable ticket payload");
                return Ok(Err(DenyReason::NotFound));
            }
        };

        // Expiry rides in the ticket itself and is always checked here,
        // independent of whatever TTL the cache backend applied.
        if ticket.is_expired(now) {
            return Ok(Err(DenyReason::NotFound));
        }

        if ticket.purpose == TicketPurpose::Preview && nav.is_top_level_navigation() {
            return Ok(Err(DenyReason::NavigationBlocked));
        }

        Ok(Ok(ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_cache::memory::MemoryCacheProvider;

    fn service() -> TicketService {
        TicketService::new(Arc::new(MemoryCacheProvider::for_tests()), 120)
    }

    fn pointer() -> ObjectPointer {
        ObjectPointer::new("vault".to_string(), "docs/report.pdf".to_string())
    }

    fn navigation() -> NavigationSignals {
        NavigationSignals {
            dest_document: true,
            mode_navigate: true,
            user_activated: true,
        }
    }

    #[tokio::test]
    async fn minted_ticket_redeems_within_ttl() {
        let service = service();
        let ticket = service
            .mint(
                Uuid::new_v4(),
                pointer(),
                "application/pdf".into(),
                Disposition::Inline,
            )
            .await
            .unwrap();

        let redeemed = service
            .redeem(&ticket.id, NavigationSignals::default(), Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(redeemed.document_id, ticket.document_id);
        assert_eq!(redeemed.purpose, TicketPurpose::Preview);
    }

    #[tokio::test]
    async fn preview_ticket_rejects_top_level_navigation() {
        let service = service();
        let ticket = service
            .mint(
                Uuid::new_v4(),
                pointer(),
                "application/pdf".into(),
                Disposition::Inline,
            )
            .await
            .unwrap();

        assert_eq!(
            service
                .redeem(&ticket.id, navigation(), Utc::now())
                .await
                .unwrap(),
            Err(DenyReason::NavigationBlocked)
        );
    }

    #[tokio::test]
    async fn download_ticket_permits_navigation_and_replay() {
        let service = service();
        let ticket = service
            .mint(
                Uuid::new_v4(),
                pointer(),
                "application/pdf".into(),
                Disposition::Attachment,
            )
            .await
            .unwrap();

        for _ in 0..2 {
            assert!(service
                .redeem(&ticket.id, navigation(), Utc::now())
                .await
                .unwrap()
                .is_ok());
        }
    }

    #[tokio::test]
    async fn expired_ticket_is_not_found() {
        let service = service();
        let ticket = service
            .mint(
                Uuid::new_v4(),
                pointer(),
                "application/pdf".into(),
                Disposition::Inline,
            )
            .await
            .unwrap();

        let later = Utc::now() + Duration::seconds(121);
        assert_eq!(
            service
                .redeem(&ticket.id, NavigationSignals::default(), later)
                .await
                .unwrap(),
            Err(DenyReason::NotFound)
        );
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_are_not_found() {
        let service = service();
        assert_eq!(
            service
                .redeem(
                    "00000000000000000000000000000000",
                    NavigationSignals::default(),
                    Utc::now()
                )
                .await
                .unwrap(),
            Err(DenyReason::NotFound)
        );
        assert_eq!(
            service
                .redeem("../etc/passwd", NavigationSignals::default(), Utc::now())
                .await
                .unwrap(),
            Err(DenyReason::NotFound)
        );
    }
}
