//! Client metadata extraction: IP, country, content negotiation, fetch
//! metadata, and range offset.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use docvault_service::NavigationSignals;

use crate::state::AppState;

/// Per-request client metadata used by the pipeline.
#[derive(Debug, Clone)]
pub struct ClientMeta {
    /// Requesting IP. `X-Forwarded-For` wins (first hop), falling back
    /// to the socket peer address.
    pub ip: String,
    /// ISO country code from the configured edge header.
    pub country: Option<String>,
    /// Whether the client prefers HTML (password gate redirects).
    pub accepts_html: bool,
    /// Fetch-metadata navigation signals.
    pub navigation: NavigationSignals,
    /// Start offset of a `Range: bytes=` request, if present and sane.
    pub range_start: Option<u64>,
}

impl FromRequestParts<AppState> for ClientMeta {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        let ip = forwarded_ip(headers)
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|info| info.0.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        let country = header_str(headers, &state.config.access.country_header)
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty() && c != "XX");

        let accepts_html = header_str(headers, "accept")
            .map(|accept| accept.contains("text/html"))
            .unwrap_or(false);

        let navigation = NavigationSignals {
            dest_document: header_eq(headers, "sec-fetch-dest", "document"),
            mode_navigate: header_eq(headers, "sec-fetch-mode", "navigate"),
            user_activated: header_eq(headers, "sec-fetch-user", "?1"),
        };

        let range_start = header_str(headers, "range").and_then(parse_range_start);

        Ok(Self {
            ip,
            country,
            accepts_html,
            navigation,
            range_start,
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn header_eq(headers: &HeaderMap, name: &str, expected: &str) -> bool {
    header_str(headers, name)
        .map(|v| v.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let raw = header_str(headers, "x-forwarded-for")?;
    let first = raw.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

/// Parse the start offset of a `Range` header. Only the first range of a
/// `bytes=` spec is considered; suffix ranges (`bytes=-500`) and other
/// units yield `None`, which the ledger treats as a counting fetch.
fn parse_range_start(value: &str) -> Option<u64> {
    let spec = value.trim().strip_prefix("bytes=")?;
    let first = spec.split(',').next()?.trim();
    let (start, _) = first.split_once('-')?;
    start.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_start_parses_open_and_bounded_ranges() {
        assert_eq!(parse_range_start("bytes=0-"), Some(0));
        assert_eq!(parse_range_start("bytes=0-1023"), Some(0));
        assert_eq!(parse_range_start("bytes=65536-"), Some(65536));
        assert_eq!(parse_range_start("bytes=100-200,300-400"), Some(100));
    }

    #[test]
    fn suffix_and_malformed_ranges_yield_none() {
        assert_eq!(parse_range_start("bytes=-500"), None);
        assert_eq!(parse_range_start("items=0-10"), None);
        assert_eq!(parse_range_start("garbage"), None);
    }

    #[test]
    fn forwarded_ip_takes_the_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.9, 10.0.0.1".parse().unwrap(),
        );
        assert_eq!(forwarded_ip(&headers), Some("203.0.113.9".to_string()));
    }
}
