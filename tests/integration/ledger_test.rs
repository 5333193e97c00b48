//! Database-backed view ledger tests.
//!
//! These run against a real PostgreSQL instance and are skipped unless
//! `DOCVAULT_TEST_DATABASE_URL` is set. Each test creates its own
//! document and share fixtures under fresh UUIDs, so a shared database
//! is fine.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::config::DatabaseConfig;
use docvault_core::deny::DenyReason;
use docvault_database::migration::run_migrations;
use docvault_database::repositories::share::{ShareRepository, ViewConsumption};
use docvault_database::{DatabasePool, SchemaCapabilities};
use docvault_service::access::ViewLedger;

async fn test_pool() -> Option<DatabasePool> {
    let url = match std::env::var("DOCVAULT_TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DOCVAULT_TEST_DATABASE_URL not set; skipping database-backed test");
            return None;
        }
    };
    let config = DatabaseConfig {
        url,
        max_connections: 16,
        min_connections: 0,
        connect_timeout_seconds: 5,
    };
    let db = DatabasePool::connect(&config)
        .await
        .expect("Failed to connect to test database");
    run_migrations(db.pool())
        .await
        .expect("Failed to run migrations");
    Some(db)
}

fn share_repo(db: &DatabasePool) -> Arc<ShareRepository> {
    Arc::new(ShareRepository::new(
        db.pool().clone(),
        SchemaCapabilities::default(),
    ))
}

async fn insert_share(pool: &PgPool, max_views: Option<i32>) -> Uuid {
    let document_id: Uuid = sqlx::query_scalar(
        "INSERT INTO documents (owner_id, bucket, object_key, content_type, size_bytes, scan_status) \
         VALUES ($1, 'vault', $2, 'application/pdf', 1024, 'clean') RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(format!("docs/{}.pdf", Uuid::new_v4()))
    .fetch_one(pool)
    .await
    .expect("Failed to insert document");

    sqlx::query_scalar(
        "INSERT INTO shares (token, document_id, max_views) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(Uuid::new_v4().simple().to_string())
    .bind(document_id)
    .bind(max_views)
    .fetch_one(pool)
    .await
    .expect("Failed to insert share")
}

async fn consumed_count(repo: &Arc<ShareRepository>, share_id: Uuid, attempts: usize) -> usize {
    let mut handles = Vec::with_capacity(attempts);
    for _ in 0..attempts {
        let repo = Arc::clone(repo);
        handles.push(tokio::spawn(
            async move { repo.consume_view(share_id).await },
        ));
    }

    let mut consumed = 0;
    for handle in handles {
        let outcome = handle.await.expect("task panicked").expect("consume failed");
        if matches!(outcome, ViewConsumption::Consumed { .. }) {
            consumed += 1;
        }
    }
    consumed
}

#[tokio::test]
async fn concurrent_views_never_exceed_a_cap_of_one() {
    let Some(db) = test_pool().await else { return };
    let repo = share_repo(&db);
    let share_id = insert_share(db.pool(), Some(1)).await;

    assert_eq!(consumed_count(&repo, share_id, 8).await, 1);

    let share = repo.find_by_id(share_id).await.unwrap().unwrap();
    assert_eq!(share.view_count, 1);
}

#[tokio::test]
async fn concurrent_views_stop_exactly_at_the_cap() {
    let Some(db) = test_pool().await else { return };
    let repo = share_repo(&db);
    let share_id = insert_share(db.pool(), Some(3)).await;

    assert_eq!(consumed_count(&repo, share_id, 16).await, 3);

    let share = repo.find_by_id(share_id).await.unwrap().unwrap();
    assert_eq!(share.view_count, 3);
}

#[tokio::test]
async fn a_maxed_share_is_classified_as_maxed() {
    let Some(db) = test_pool().await else { return };
    let repo = share_repo(&db);
    let ledger = ViewLedger::new(Arc::clone(&repo));
    let share_id = insert_share(db.pool(), Some(1)).await;

    let share = repo.find_by_id(share_id).await.unwrap().unwrap();
    assert_eq!(ledger.consume(&share).await.unwrap(), Ok(1));
    assert_eq!(
        ledger.consume(&share).await.unwrap(),
        Err(DenyReason::Maxed)
    );
}

#[tokio::test]
async fn revocation_denies_the_very_next_view() {
    let Some(db) = test_pool().await else { return };
    let repo = share_repo(&db);
    let ledger = ViewLedger::new(Arc::clone(&repo));
    let share_id = insert_share(db.pool(), None).await;

    // Snapshot the record the way the gate would have, before the
    // revocation lands underneath it.
    let share = repo.find_by_id(share_id).await.unwrap().unwrap();
    assert_eq!(ledger.consume(&share).await.unwrap(), Ok(1));

    sqlx::query("UPDATE shares SET revoked_at = NOW() WHERE id = $1")
        .bind(share_id)
        .execute(db.pool())
        .await
        .unwrap();

    assert_eq!(
        repo.consume_view(share_id).await.unwrap(),
        ViewConsumption::Rejected
    );
    assert_eq!(
        ledger.consume(&share).await.unwrap(),
        Err(DenyReason::Revoked)
    );
}
