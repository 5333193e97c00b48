//! Gated fetch pipeline tests: fail-closed behavior, rate limiting,
//! abuse blocks, and the kill switch.

use http::StatusCode;

use docvault_cache::keys;

use crate::helpers::{test_config, TestApp};

const IP: &str = "203.0.113.9";

#[tokio::test]
async fn database_outage_fails_closed() {
    let app = TestApp::new(test_config());

    let response = app
        .get("/s/report-q3/raw", &[("x-forwarded-for", IP)])
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn gate_info_fails_closed_without_database() {
    let app = TestApp::new(test_config());

    let response = app.get("/s/report-q3", &[("x-forwarded-for", IP)]).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn ip_rate_limit_fires_before_resolution() {
    let app = TestApp::new(test_config());

    // ip_limit is 2; the first two attempts get as far as the database.
    for _ in 0..2 {
        let response = app
            .get("/s/report-q3/raw", &[("x-forwarded-for", IP)])
            .await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    let response = app
        .get("/s/report-q3/raw", &[("x-forwarded-for", IP)])
        .await;

    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .expect("429 must carry Retry-After");
    assert!(retry_after > 0 && retry_after <= 60);
}

#[tokio::test]
async fn rate_limits_are_isolated_per_ip() {
    let app = TestApp::new(test_config());

    for _ in 0..3 {
        app.get("/s/report-q3/raw", &[("x-forwarded-for", IP)])
            .await;
    }

    // A different IP still has its full budget; it reaches the
    // database instead of the throttle.
    let response = app
        .get("/s/report-q3/raw", &[("x-forwarded-for", "203.0.113.10")])
        .await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn installed_ip_block_short_circuits_the_pipeline() {
    let app = TestApp::new(test_config());

    app.cache
        .set(&keys::ip_block(IP), "1", Some(900))
        .await
        .unwrap();

    let response = app
        .get("/s/report-q3/raw", &[("x-forwarded-for", IP)])
        .await;

    // Forbidden, not throttled: a blocked IP never reaches the limiter
    // or the database.
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unlock_respects_an_installed_ip_block() {
    let app = TestApp::new(test_config());

    app.cache
        .set(&keys::ip_block(IP), "1", Some(900))
        .await
        .unwrap();

    let response = app
        .request(
            "POST",
            "/s/report-q3/unlock",
            &[("x-forwarded-for", IP)],
            Some(serde_json::json!({ "password": "guess" })),
        )
        .await;

    // The block fires before resolution and before any password
    // verification work.
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unlock_attempts_are_rate_limited_per_ip() {
    let app = TestApp::new(test_config());
    let body = serde_json::json!({ "password": "guess" });

    // ip_limit is 2; the first two attempts get as far as the database.
    for _ in 0..2 {
        let response = app
            .request(
                "POST",
                "/s/report-q3/unlock",
                &[("x-forwarded-for", IP)],
                Some(body.clone()),
            )
            .await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    let response = app
        .request(
            "POST",
            "/s/report-q3/unlock",
            &[("x-forwarded-for", IP)],
            Some(body),
        )
        .await;

    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn kill_switch_disables_gated_endpoints() {
    let mut config = test_config();
    config.access.kill_switch = true;
    let app = TestApp::new(config);

    let raw = app
        .get("/s/report-q3/raw", &[("x-forwarded-for", IP)])
        .await;
    assert_eq!(raw.status, StatusCode::SERVICE_UNAVAILABLE);

    let gate = app.get("/s/report-q3", &[]).await;
    assert_eq!(gate.status, StatusCode::SERVICE_UNAVAILABLE);

    let ticket = app
        .get("/t/00000000000000000000000000000000", &[])
        .await;
    assert_eq!(ticket.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn healthz_reports_degraded_when_database_is_down() {
    let app = TestApp::new(test_config());

    let response = app.get("/healthz", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "degraded");
    assert_eq!(response.body["database"], "down");
    assert_eq!(response.body["cache"], "up");
}
