//! Ticket redemption endpoint.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use docvault_core::error::AppError;
use docvault_core::events::SecurityEvent;
use docvault_core::traits::signer::ObjectUrlSigner;
use docvault_service::telemetry::hash_ip;

use crate::error::{deny_response, ApiError};
use crate::extractors::ClientMeta;
use crate::state::AppState;

/// GET /t/{ticket_id} — redeem a ticket for a presigned object URL.
pub async fn redeem(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    meta: ClientMeta,
) -> Response {
    if state.config.access.kill_switch {
        return ApiError(AppError::service_unavailable("temporarily disabled")).into_response();
    }

    let redeemed = match state
        .access
        .tickets()
        .redeem(&ticket_id, meta.navigation, Utc::now())
        .await
    {
        Ok(redeemed) => redeemed,
        Err(error) => return ApiError(error).into_response(),
    };

    let ticket = match redeemed {
        Ok(ticket) => ticket,
        Err(reason) => {
            state.access.telemetry().emit(
                SecurityEvent::access_denied("ticket_redeem", reason)
                    .with_ip_hash(hash_ip(&meta.ip)),
            );
            return deny_response(reason, None, false, None);
        }
    };

    let url = match state
        .storage
        .presign_get(
            &ticket.pointer,
            &ticket.content_type,
            ticket.disposition.as_str(),
            state.storage.url_ttl(),
        )
        .await
    {
        Ok(url) => url,
        Err(error) => return ApiError(error).into_response(),
    };

    (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
}
