//! Fire-and-forget security telemetry.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use docvault_core::events::SecurityEvent;
use docvault_core::traits::telemetry::TelemetrySink;

/// SHA-256 hash of an IP address, hex-encoded. Raw addresses are never
/// written to the event store.
pub fn hash_ip(ip: &str) -> String {
    let digest = Sha256::digest(ip.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Emits security events without ever blocking the caller.
#[derive(Debug, Clone)]
pub struct TelemetryService {
    sink: Arc<dyn TelemetrySink>,
}

impl TelemetryService {
    /// Create a new telemetry service.
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self { sink }
    }

    /// Emit one event. The write runs on a spawned task; a failing sink
    /// is logged and never surfaces to the request that produced the
    /// event.
    pub fn emit(&self, event: SecurityEvent) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(error) = sink.record(event).await {
                tracing::warn!(%error, "failed to record security event");
            }
        });
    }
}
