//! Cache key builders for all DocVault cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Prefix applied to all DocVault cache keys.
const PREFIX: &str = "docvault";

// ── Ticket keys ────────────────────────────────────────────

/// Cache key for a minted access ticket.
pub fn ticket(ticket_id: &str) -> String {
    format!("{PREFIX}:ticket:{ticket_id}")
}

// ── Rate limiting keys ─────────────────────────────────────

/// Cache key for one rate-limit window bucket.
///
/// `scope` names the counter family (e.g. `ip:share_raw`,
/// `token:share_raw`), `identifier` the subject, `bucket` the window
/// index so counters roll over naturally.
pub fn rate_window(scope: &str, identifier: &str, bucket: u64) -> String {
    format!("{PREFIX}:rate:{scope}:{identifier}:{bucket}")
}

// ── Abuse detection keys ───────────────────────────────────

/// Cache key for the rolling denial counter of an IP.
pub fn deny_counter(ip: &str, bucket: u64) -> String {
    format!("{PREFIX}:abuse:denials:{ip}:{bucket}")
}

/// Cache key for a temporary IP block.
pub fn ip_block(ip: &str) -> String {
    format!("{PREFIX}:abuse:block:{ip}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_key_shape() {
        assert_eq!(ticket("abc123"), "docvault:ticket:abc123");
    }

    #[test]
    fn rate_key_includes_scope_subject_and_bucket() {
        assert_eq!(
            rate_window("ip:share_raw", "203.0.113.9", 42),
            "docvault:rate:ip:share_raw:203.0.113.9:42"
        );
    }

    #[test]
    fn block_key_shape() {
        assert_eq!(ip_block("203.0.113.9"), "docvault:abuse:block:203.0.113.9");
    }
}
