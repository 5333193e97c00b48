//! Rate limiting and abuse detection configuration.

use serde::{Deserialize, Serialize};

/// Rate limiting and abuse detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Requests allowed per IP per window on the raw endpoint.
    #[serde(default = "default_ip_limit")]
    pub ip_limit: i64,
    /// Requests allowed per token per window on the raw endpoint.
    #[serde(default = "default_token_limit")]
    pub token_limit: i64,
    /// Counter window in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Denials from one IP within the abuse window that trigger a block.
    #[serde(default = "default_abuse_threshold")]
    pub abuse_threshold: i64,
    /// Rolling window for counting denials, in seconds.
    #[serde(default = "default_abuse_window")]
    pub abuse_window_seconds: u64,
    /// Duration of an installed IP block, in seconds.
    #[serde(default = "default_block")]
    pub block_seconds: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            ip_limit: default_ip_limit(),
            token_limit: default_token_limit(),
            window_seconds: default_window(),
            abuse_threshold: default_abuse_threshold(),
            abuse_window_seconds: default_abuse_window(),
            block_seconds: default_block(),
        }
    }
}

fn default_ip_limit() -> i64 {
    30
}

fn default_token_limit() -> i64 {
    60
}

fn default_window() -> u64 {
    60
}

fn default_abuse_threshold() -> i64 {
    25
}

fn default_abuse_window() -> u64 {
    300
}

fn default_block() -> u64 {
    900
}
