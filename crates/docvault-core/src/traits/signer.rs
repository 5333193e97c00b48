//! Object-store signer collaborator interface.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::ObjectPointer;

/// Produces time-limited URLs for stored objects.
///
/// The returned URL is the only form in which an object location ever
/// leaves the process; ticket redemption redirects to it.
#[async_trait]
pub trait ObjectUrlSigner: Send + Sync + std::fmt::Debug + 'static {
    /// Presign a GET for the given pointer, overriding the response
    /// content type and disposition.
    async fn presign_get(
        &self,
        pointer: &ObjectPointer,
        content_type: &str,
        disposition: &str,
        expires_in: Duration,
    ) -> AppResult<String>;
}
