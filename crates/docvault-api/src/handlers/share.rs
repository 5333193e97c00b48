//! Share endpoints: gate metadata, password unlock, and the gated fetch.

use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use docvault_core::error::AppError;
use docvault_entity::ticket::Disposition;
use docvault_service::access::RawRequest;
use docvault_service::AuthorizeOutcome;

use crate::error::{deny_response, ApiError};
use crate::extractors::ClientMeta;
use crate::state::AppState;

/// Cookie carrying the unlock proof.
pub const UNLOCK_COOKIE: &str = "dv_unlock";

#[derive(Debug, Deserialize)]
pub struct UnlockBody {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RawQuery {
    /// `attachment` to request a download; anything else is inline.
    pub disposition: Option<String>,
    /// Signed email proof.
    pub ep: Option<String>,
}

fn kill_switch_engaged(state: &AppState) -> Option<Response> {
    if state.config.access.kill_switch {
        Some(ApiError(AppError::service_unavailable("temporarily disabled")).into_response())
    } else {
        None
    }
}

/// GET /s/{token} — gate metadata for the landing page.
pub async fn gate_info(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    if let Some(response) = kill_switch_engaged(&state) {
        return response;
    }
    match state.access.gate_info(&token).await {
        Ok(Ok(info)) => Json(info).into_response(),
        Ok(Err(reason)) => deny_response(reason, None, false, None),
        Err(error) => ApiError(error).into_response(),
    }
}

/// POST /s/{token}/unlock — verify the share password and set the
/// unlock-proof cookie.
pub async fn unlock(
    State(state): State<AppState>,
    Path(token): Path<String>,
    meta: ClientMeta,
    jar: CookieJar,
    Json(body): Json<UnlockBody>,
) -> Response {
    if let Some(response) = kill_switch_engaged(&state) {
        return response;
    }
    match state.access.unlock(&token, &body.password, &meta.ip).await {
        Ok(Ok(proof)) => {
            // The proof expires on its own; the cookie is a session one.
            let cookie = Cookie::build((UNLOCK_COOKIE, proof))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build();
            (jar.add(cookie), StatusCode::NO_CONTENT).into_response()
        }
        Ok(Err(reason)) => deny_response(reason, None, false, None),
        Err(error) => ApiError(error).into_response(),
    }
}

/// GET /s/{token}/raw — the gated fetch. Grants 302 to `/t/{ticket_id}`.
pub async fn fetch_raw(
    State(state): State<AppState>,
    Path(token): Path<String>,
    meta: ClientMeta,
    jar: CookieJar,
    Query(query): Query<RawQuery>,
) -> Response {
    if let Some(response) = kill_switch_engaged(&state) {
        return response;
    }

    let disposition = match query.disposition.as_deref() {
        Some("attachment") => Disposition::Attachment,
        _ => Disposition::Inline,
    };
    let unlock_proof = jar.get(UNLOCK_COOKIE).map(|c| c.value().to_string());

    let request = RawRequest {
        subject: &token,
        ip: &meta.ip,
        country: meta.country.as_deref(),
        disposition,
        unlock_proof: unlock_proof.as_deref(),
        email_proof: query.ep.as_deref(),
        range_start: meta.range_start,
    };

    let budget = Duration::from_secs(state.config.access.pipeline_timeout_seconds);
    let outcome = match tokio::time::timeout(budget, state.access.authorize_raw(request)).await {
        Ok(outcome) => outcome,
        Err(_) => return ApiError(AppError::timeout("authorization pipeline timed out")).into_response(),
    };

    match outcome {
        Ok(AuthorizeOutcome::Granted { location }) => {
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        Ok(AuthorizeOutcome::Denied {
            reason,
            retry_after,
        }) => deny_response(
            reason,
            retry_after,
            meta.accepts_html,
            Some(&format!("/s/{token}")),
        ),
        Err(error) => ApiError(error).into_response(),
    }
}
