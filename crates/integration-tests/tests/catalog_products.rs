//! Integration tests for the product query engine.
//!
//! These tests require a migrated catalog database; run them with
//! `cargo test -p mossberry-integration-tests -- --ignored`.

use rust_decimal::Decimal;
use uuid::Uuid;

use mossberry_catalog::db::ProductRepository;
use mossberry_catalog::models::{ImageCompromise, NewProduct, ProductCriteria, ProductSort};
use mossberry_integration_tests::TestContext;

/// Build a product with a unique SKU so runs don't collide.
fn test_product(name: &str, price: Decimal) -> NewProduct {
    NewProduct {
        name: name.to_owned(),
        description: "integration test product".to_owned(),
        sku: format!("it-{}", Uuid::new_v4()),
        price,
        image_url: String::new(),
        image_compromise: ImageCompromise::Auto,
        category_id: None,
        inventory_id: None,
        discount_id: None,
    }
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_price_bounds_are_inclusive() {
    let ctx = TestContext::new().await;
    let repo = ProductRepository::new(&ctx.catalog_pool);

    let marker = format!("price-bounds-{}", Uuid::new_v4());
    let product = repo
        .create(&test_product(&marker, Decimal::new(1999, 2)))
        .await
        .unwrap();

    let criteria = ProductCriteria {
        keyword: Some(marker.clone()),
        min_price: Decimal::new(1999, 2),
        max_price: Decimal::new(1999, 2),
        ..Default::default()
    };
    let page = repo
        .query(&criteria, ProductSort::Newest, 0, 10)
        .await
        .unwrap();
    assert!(page.iter().any(|p| p.id == product.id));

    // A bound just below the price excludes it.
    let criteria = ProductCriteria {
        keyword: Some(marker),
        max_price: Decimal::new(1998, 2),
        ..Default::default()
    };
    let page = repo
        .query(&criteria, ProductSort::Newest, 0, 10)
        .await
        .unwrap();
    assert!(page.is_empty());

    repo.delete(product.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_count_matches_query_predicate() {
    let ctx = TestContext::new().await;
    let repo = ProductRepository::new(&ctx.catalog_pool);

    let marker = format!("count-match-{}", Uuid::new_v4());
    let mut created = Vec::new();
    for i in 0..3 {
        created.push(
            repo.create(&test_product(
                &format!("{marker}-{i}"),
                Decimal::new(500 + i, 2),
            ))
            .await
            .unwrap(),
        );
    }

    let criteria = ProductCriteria {
        keyword: Some(marker),
        ..Default::default()
    };
    let total = repo.count(&criteria).await.unwrap();
    let all = repo
        .query(&criteria, ProductSort::Newest, 0, 100)
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(all.len(), 3);

    for product in created {
        repo.delete(product.id).await.unwrap();
    }
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_pages_concatenate_without_gaps() {
    let ctx = TestContext::new().await;
    let repo = ProductRepository::new(&ctx.catalog_pool);

    let marker = format!("paging-{}", Uuid::new_v4());
    let mut created = Vec::new();
    for i in 0..5 {
        created.push(
            repo.create(&test_product(
                &format!("{marker}-{i}"),
                Decimal::new(100 + i, 2),
            ))
            .await
            .unwrap(),
        );
    }

    let criteria = ProductCriteria {
        keyword: Some(marker),
        ..Default::default()
    };
    let whole = repo
        .query(&criteria, ProductSort::Cheapest, 0, 5)
        .await
        .unwrap();
    let first = repo
        .query(&criteria, ProductSort::Cheapest, 0, 2)
        .await
        .unwrap();
    let second = repo
        .query(&criteria, ProductSort::Cheapest, 2, 3)
        .await
        .unwrap();

    let stitched: Vec<_> = first.iter().chain(second.iter()).map(|p| p.id).collect();
    let expected: Vec<_> = whole.iter().map(|p| p.id).collect();
    assert_eq!(stitched, expected);

    for product in created {
        repo.delete(product.id).await.unwrap();
    }
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_degenerate_windows_return_empty_pages() {
    let ctx = TestContext::new().await;
    let repo = ProductRepository::new(&ctx.catalog_pool);

    let criteria = ProductCriteria::default();
    assert!(repo
        .query(&criteria, ProductSort::Newest, 0, 0)
        .await
        .unwrap()
        .is_empty());
    assert!(repo
        .query(&criteria, ProductSort::Newest, 5, -1)
        .await
        .unwrap()
        .is_empty());

    // A negative start clamps to the first page rather than erroring.
    let clamped = repo.query(&criteria, ProductSort::Newest, -3, 1).await;
    assert!(clamped.is_ok());
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_keyword_wildcards_match_literally() {
    let ctx = TestContext::new().await;
    let repo = ProductRepository::new(&ctx.catalog_pool);

    let marker = format!("100%-wool-{}", Uuid::new_v4());
    let product = repo
        .create(&test_product(&marker, Decimal::new(4200, 2)))
        .await
        .unwrap();

    // `%` in the keyword must not act as a wildcard.
    let criteria = ProductCriteria {
        keyword: Some("100%-wool".to_owned()),
        ..Default::default()
    };
    let page = repo
        .query(&criteria, ProductSort::Newest, 0, 50)
        .await
        .unwrap();
    assert!(page.iter().any(|p| p.id == product.id));

    let criteria = ProductCriteria {
        keyword: Some("100_-wool".to_owned()),
        ..Default::default()
    };
    let page = repo
        .query(&criteria, ProductSort::Newest, 0, 50)
        .await
        .unwrap();
    assert!(!page.iter().any(|p| p.id == product.id));

    repo.delete(product.id).await.unwrap();
}
