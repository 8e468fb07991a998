//! Integration tests for the highlight slot manager.
//!
//! Run with `cargo test -p mossberry-integration-tests -- --ignored`
//! against a migrated catalog database.

use rust_decimal::Decimal;
use uuid::Uuid;

use mossberry_catalog::db::{
    HighlightRepository, HighlightUpdate, ProductRepository, RepositoryError,
};
use mossberry_catalog::models::{ImageCompromise, NewProduct};
use mossberry_core::ProductId;
use mossberry_integration_tests::TestContext;

fn test_product(name: &str) -> NewProduct {
    NewProduct {
        name: name.to_owned(),
        description: "highlight test product".to_owned(),
        sku: format!("it-{}", Uuid::new_v4()),
        price: Decimal::new(999, 2),
        image_url: String::new(),
        image_compromise: ImageCompromise::Never,
        category_id: None,
        inventory_id: None,
        discount_id: None,
    }
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_set_read_and_clear_a_slot() {
    let ctx = TestContext::new().await;
    let products = ProductRepository::new(&ctx.catalog_pool);
    let highlights = HighlightRepository::new(&ctx.catalog_pool);

    let product = products.create(&test_product("slot occupant")).await.unwrap();

    let update = highlights.set_highlight(product.id, 2).await.unwrap();
    assert!(matches!(update, HighlightUpdate::Applied));

    let slots = highlights.get_highlights().await.unwrap();
    assert_eq!(
        slots.get(1).and_then(|s| s.as_ref()).map(|p| p.id),
        Some(product.id)
    );

    highlights.clear_highlight(2).await.unwrap();
    let slots = highlights.get_highlights().await.unwrap();
    assert!(slots.get(1).is_some_and(Option::is_none));

    // Clearing again is a no-op, not an error.
    highlights.clear_highlight(2).await.unwrap();

    products.delete(product.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_replacing_a_slot_overwrites_in_place() {
    let ctx = TestContext::new().await;
    let products = ProductRepository::new(&ctx.catalog_pool);
    let highlights = HighlightRepository::new(&ctx.catalog_pool);

    let first = products.create(&test_product("first pick")).await.unwrap();
    let second = products.create(&test_product("second pick")).await.unwrap();

    highlights.set_highlight(first.id, 3).await.unwrap();
    highlights.set_highlight(second.id, 3).await.unwrap();

    let slots = highlights.get_highlights().await.unwrap();
    assert_eq!(
        slots.get(2).and_then(|s| s.as_ref()).map(|p| p.id),
        Some(second.id)
    );

    highlights.clear_highlight(3).await.unwrap();
    products.delete(first.id).await.unwrap();
    products.delete(second.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_positions_outside_one_to_three_are_rejected() {
    let ctx = TestContext::new().await;
    let highlights = HighlightRepository::new(&ctx.catalog_pool);

    for position in [0, 4, -1] {
        let err = highlights
            .set_highlight(ProductId::new(1), position)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidPosition(p) if p == position));

        let err = highlights.clear_highlight(position).await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidPosition(p) if p == position));
    }
}

#[tokio::test]
#[ignore = "Requires a migrated catalog database"]
async fn test_unknown_product_leaves_the_slot_untouched() {
    let ctx = TestContext::new().await;
    let products = ProductRepository::new(&ctx.catalog_pool);
    let highlights = HighlightRepository::new(&ctx.catalog_pool);

    let product = products.create(&test_product("keeper")).await.unwrap();
    highlights.set_highlight(product.id, 1).await.unwrap();

    let update = highlights
        .set_highlight(ProductId::new(i32::MAX), 1)
        .await
        .unwrap();
    assert!(matches!(update, HighlightUpdate::ProductNotFound));

    // The previous occupant survives the failed update.
    let slots = highlights.get_highlights().await.unwrap();
    assert_eq!(
        slots.first().and_then(|s| s.as_ref()).map(|p| p.id),
        Some(product.id)
    );

    highlights.clear_highlight(1).await.unwrap();
    products.delete(product.id).await.unwrap();
}
