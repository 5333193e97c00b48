//! Telemetry sink collaborator interface.

use async_trait::async_trait;

use crate::events::SecurityEvent;
use crate::result::AppResult;

/// Accepts structured security events.
///
/// Implementations perform the actual write; callers are expected to
/// spawn emission so a slow or failing sink never blocks a response.
#[async_trait]
pub trait TelemetrySink: Send + Sync + std::fmt::Debug + 'static {
    /// Append one event.
    async fn record(&self, event: SecurityEvent) -> AppResult<()>;
}
