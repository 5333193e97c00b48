//! Ticket redemption tests against the HTTP surface.

use http::StatusCode;
use uuid::Uuid;

use docvault_core::types::ObjectPointer;
use docvault_entity::ticket::Disposition;

use crate::helpers::{test_config, TestApp};

fn pointer() -> ObjectPointer {
    ObjectPointer::new("vault".to_string(), "docs/report.pdf".to_string())
}

const NAVIGATION: &[(&str, &str)] = &[
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-user", "?1"),
];

#[tokio::test]
async fn download_ticket_redeems_to_a_presigned_url() {
    let app = TestApp::new(test_config());
    let ticket = app
        .tickets
        .mint(
            Uuid::new_v4(),
            pointer(),
            "application/pdf".to_string(),
            Disposition::Attachment,
        )
        .await
        .unwrap();

    let response = app.get(&format!("/t/{}", ticket.id), &[]).await;

    assert_eq!(response.status, StatusCode::FOUND);
    let location = response.location().expect("302 must carry Location");
    assert!(location.starts_with("http://localhost:9000/objects/"));
    assert!(location.contains("sig="));
}

#[tokio::test]
async fn download_ticket_tolerates_replay_within_ttl() {
    let app = TestApp::new(test_config());
    let ticket = app
        .tickets
        .mint(
            Uuid::new_v4(),
            pointer(),
            "application/pdf".to_string(),
            Disposition::Attachment,
        )
        .await
        .unwrap();

    for _ in 0..2 {
        let response = app.get(&format!("/t/{}", ticket.id), NAVIGATION).await;
        assert_eq!(response.status, StatusCode::FOUND);
    }
}

#[tokio::test]
async fn preview_ticket_blocks_top_level_navigation() {
    let app = TestApp::new(test_config());
    let ticket = app
        .tickets
        .mint(
            Uuid::new_v4(),
            pointer(),
            "application/pdf".to_string(),
            Disposition::Inline,
        )
        .await
        .unwrap();

    let direct = app.get(&format!("/t/{}", ticket.id), NAVIGATION).await;
    assert_eq!(direct.status, StatusCode::FORBIDDEN);

    // The same ticket still works for an embedded viewer fetch.
    let embedded = app.get(&format!("/t/{}", ticket.id), &[]).await;
    assert_eq!(embedded.status, StatusCode::FOUND);
}

#[tokio::test]
async fn unknown_ticket_is_not_found() {
    let app = TestApp::new(test_config());

    let unknown = app
        .get("/t/00000000000000000000000000000000", &[])
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let malformed = app.get("/t/not-a-ticket", &[]).await;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
}
