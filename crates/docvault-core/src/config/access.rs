//! Access pipeline configuration: tickets, proofs, timeouts, kill switch.

use serde::{Deserialize, Serialize};

/// Configuration for the access authorization pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Public base URL used when building gate and ticket links.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Access ticket time-to-live in seconds.
    #[serde(default = "default_ticket_ttl")]
    pub ticket_ttl_seconds: u64,
    /// Unlock cookie (password proof) time-to-live in seconds.
    #[serde(default = "default_unlock_ttl")]
    pub unlock_ttl_seconds: u64,
    /// HS256 secret for unlock-cookie proofs.
    #[serde(default = "default_secret")]
    pub unlock_secret: String,
    /// HS256 secret for email-proof tokens.
    #[serde(default = "default_secret")]
    pub email_proof_secret: String,
    /// Header carrying the requester's ISO country code (set by the edge).
    #[serde(default = "default_country_header")]
    pub country_header: String,
    /// Whole-pipeline time budget in seconds; exceeding it returns 504.
    #[serde(default = "default_pipeline_timeout")]
    pub pipeline_timeout_seconds: u64,
    /// Global kill switch: when true every gated fetch returns 503.
    #[serde(default)]
    pub kill_switch: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
            ticket_ttl_seconds: default_ticket_ttl(),
            unlock_ttl_seconds: default_unlock_ttl(),
            unlock_secret: default_secret(),
            email_proof_secret: default_secret(),
            country_header: default_country_header(),
            pipeline_timeout_seconds: default_pipeline_timeout(),
            kill_switch: false,
        }
    }
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_ticket_ttl() -> u64 {
    120
}

fn default_unlock_ttl() -> u64 {
    1800
}

fn default_secret() -> String {
    // Overridden in any real deployment via DOCVAULT__ACCESS__*_SECRET.
    "insecure-dev-secret-change-me".to_string()
}

fn default_country_header() -> String {
    "cf-ipcountry".to_string()
}

fn default_pipeline_timeout() -> u64 {
    10
}
