//! Maps domain errors and deny reasons to HTTP responses.
//!
//! This is the only place either taxonomy touches HTTP status codes.
//! Deny bodies are deliberately uninformative: the precise reason lives
//! in telemetry, the client sees the collapsed status.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use docvault_core::deny::DenyReason;
use docvault_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable message; never more specific than the status.
    pub message: String,
}

/// Local wrapper so `AppError` can be turned into a response without
/// violating the orphan rule.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let Self(err) = self;
        let status = match &err.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Database
            | ErrorKind::Cache
            | ErrorKind::Storage
            | ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Configuration | ErrorKind::Serialization | ErrorKind::Internal => {
                tracing::error!(error = %err.message, "internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Dependency failures are all the same outage to the client.
        let message = match status {
            StatusCode::SERVICE_UNAVAILABLE => "service unavailable".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => "internal error".to_string(),
            StatusCode::GATEWAY_TIMEOUT => "timed out".to_string(),
            _ => err.message.clone(),
        };

        (status, Json(ApiErrorResponse { message })).into_response()
    }
}

/// The collapsed status for a deny reason.
pub fn deny_status(reason: DenyReason) -> StatusCode {
    match reason {
        // Pre-scan, quarantined, disabled, and wrong-binding denials are
        // indistinguishable from absence on purpose.
        DenyReason::NotFound | DenyReason::ModerationBlocked | DenyReason::ScanBlocked => {
            StatusCode::NOT_FOUND
        }
        DenyReason::RiskBlocked
        | DenyReason::GeoBlocked
        | DenyReason::DownloadDisabled
        | DenyReason::QuotaExceeded
        | DenyReason::AbuseBlocked
        | DenyReason::NavigationBlocked => StatusCode::FORBIDDEN,
        DenyReason::Revoked | DenyReason::Expired | DenyReason::Maxed => StatusCode::GONE,
        DenyReason::PasswordRequired | DenyReason::EmailRequired => StatusCode::UNAUTHORIZED,
        DenyReason::RateLimited => StatusCode::TOO_MANY_REQUESTS,
    }
}

/// Build the response for a denied request.
///
/// HTML clients hitting the password gate are redirected to the landing
/// page instead of receiving a bare 401; rate-limit denials carry a
/// `Retry-After` hint.
pub fn deny_response(
    reason: DenyReason,
    retry_after: Option<u64>,
    accepts_html: bool,
    gate_path: Option<&str>,
) -> Response {
    if reason == DenyReason::PasswordRequired && accepts_html {
        if let Some(path) = gate_path {
            return (StatusCode::FOUND, [(header::LOCATION, path.to_string())]).into_response();
        }
    }

    let status = deny_status(reason);
    let message = match reason {
        DenyReason::NavigationBlocked => "direct open disabled".to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("denied")
            .to_ascii_lowercase(),
    };
    let body = Json(ApiErrorResponse { message });

    match retry_after {
        Some(seconds) => (
            status,
            [(header::RETRY_AFTER, seconds.to_string())],
            body,
        )
            .into_response(),
        None => (status, body).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absence_class_collapses_to_404() {
        for reason in [
            DenyReason::NotFound,
            DenyReason::ModerationBlocked,
            DenyReason::ScanBlocked,
        ] {
            assert_eq!(deny_status(reason), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn terminal_share_states_are_410() {
        for reason in [DenyReason::Revoked, DenyReason::Expired, DenyReason::Maxed] {
            assert_eq!(deny_status(reason), StatusCode::GONE);
        }
    }

    #[test]
    fn quota_and_blocks_are_403() {
        for reason in [
            DenyReason::QuotaExceeded,
            DenyReason::AbuseBlocked,
            DenyReason::GeoBlocked,
            DenyReason::NavigationBlocked,
        ] {
            assert_eq!(deny_status(reason), StatusCode::FORBIDDEN);
        }
    }
}
