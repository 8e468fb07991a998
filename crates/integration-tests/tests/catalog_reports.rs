//! Integration tests for visitor sessions and daily reporting.
//!
//! Run with `cargo test -p mossberry-integration-tests -- --ignored`
//! against a migrated catalog database.

use rust_decimal::Decimal;

use mossberry_catalog::db::{ReportingRepository, VisitorRepository};
use mossberry_core::VisitorSessionId;
use mossberry_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_session_lifecycle() {
    let ctx = TestContext::new().await;
    let visitors = VisitorRepository::new(&ctx.catalog_pool);

    let session = visitors.start_session().await.unwrap();
    assert!(session.ended_at > session.started_at);

    // A freshly started session is valid and findable.
    let found = visitors.find_valid(session.id).await.unwrap();
    assert!(found.is_some());

    // An unknown id is absence, not an error.
    let missing = visitors
        .find_valid(VisitorSessionId::generate())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_page_views_accumulate_per_session() {
    let ctx = TestContext::new().await;
    let visitors = VisitorRepository::new(&ctx.catalog_pool);

    let session = visitors.start_session().await.unwrap();
    let before = visitors.page_view_count(session.id).await.unwrap();

    visitors
        .record_page_view(session.id, "/products/1")
        .await
        .unwrap();
    visitors
        .record_page_view(session.id, "/products/2")
        .await
        .unwrap();

    let after = visitors.page_view_count(session.id).await.unwrap();
    assert_eq!(after, before + 2);
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_daily_series_have_one_value_per_day() {
    let ctx = TestContext::new().await;
    let reports = ReportingRepository::new(&ctx.catalog_pool);

    let sales = reports.daily_sales(7).await.unwrap();
    assert_eq!(sales.len(), 7);
    assert!(sales.iter().all(|total| *total >= Decimal::ZERO));

    let visitors = reports.daily_visitors(7).await.unwrap();
    assert_eq!(visitors.len(), 7);
    assert!(visitors.iter().all(|count| *count >= 0));
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_non_positive_report_windows_are_empty() {
    let ctx = TestContext::new().await;
    let reports = ReportingRepository::new(&ctx.catalog_pool);

    assert!(reports.daily_sales(0).await.unwrap().is_empty());
    assert!(reports.daily_sales(-3).await.unwrap().is_empty());
    assert!(reports.daily_visitors(0).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_todays_visitors_reflect_new_sessions() {
    let ctx = TestContext::new().await;
    let visitors = VisitorRepository::new(&ctx.catalog_pool);
    let reports = ReportingRepository::new(&ctx.catalog_pool);

    let before = *reports.daily_visitors(1).await.unwrap().first().unwrap();
    visitors.start_session().await.unwrap();
    let after = *reports.daily_visitors(1).await.unwrap().first().unwrap();

    assert_eq!(after, before + 1);
}
