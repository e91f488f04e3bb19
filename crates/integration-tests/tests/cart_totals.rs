//! Integration tests for cart mutations and total recompute.
//!
//! These tests require:
//! - A reachable `PostgreSQL` database (`DATABASE_URL`)
//!
//! Run with: cargo test -p cartload-integration-tests -- --ignored

use cartload_core::{Money, ProductId};
use cartload_integration_tests::TestContext;
use cartload_server::error::AppError;

fn dollars(s: &str) -> Money {
    Money::new(s.parse().expect("test amount must parse"))
}

// ============================================================================
// Aggregate Recompute Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn new_cart_starts_at_zero() {
    let ctx = TestContext::new().await;
    let user = TestContext::unique_user();

    let cart = ctx
        .carts
        .create_cart(user)
        .await
        .expect("Failed to create cart");

    assert_eq!(cart.user_id, user);
    assert!(cart.total.is_zero());
    assert_eq!(cart.total_items, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn totals_track_line_items() {
    let ctx = TestContext::new().await;
    let user = TestContext::unique_user();

    let water = ctx.seed_product("Sparkling Water 12-pack", "18.00").await;
    let coffee = ctx.seed_product("Cold Brew Coffee 6-pack", "27.50").await;

    ctx.carts
        .create_cart(user)
        .await
        .expect("Failed to create cart");
    ctx.carts
        .add_item(user, water.id, 2)
        .await
        .expect("Failed to add water");
    let (_, cart) = ctx
        .carts
        .add_item(user, coffee.id, 3)
        .await
        .expect("Failed to add coffee");

    // 2 * 18.00 + 3 * 27.50
    assert_eq!(cart.total, dollars("118.50"));
    assert_eq!(cart.total_items, 5);

    let fetched = ctx
        .carts
        .cart_for_user(user)
        .await
        .expect("Failed to fetch cart");
    assert_eq!(fetched.cart.total, dollars("118.50"));
    assert_eq!(fetched.items.len(), 2);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn adding_same_product_accumulates_quantity() {
    let ctx = TestContext::new().await;
    let user = TestContext::unique_user();

    let water = ctx.seed_product("Sparkling Water 12-pack", "18.00").await;

    ctx.carts
        .create_cart(user)
        .await
        .expect("Failed to create cart");
    ctx.carts
        .add_item(user, water.id, 2)
        .await
        .expect("Failed to add first batch");
    let (item, cart) = ctx
        .carts
        .add_item(user, water.id, 3)
        .await
        .expect("Failed to add second batch");

    assert_eq!(item.qty, 5);
    assert_eq!(cart.total, dollars("90.00"));
    assert_eq!(cart.total_items, 5);

    let fetched = ctx
        .carts
        .cart_for_user(user)
        .await
        .expect("Failed to fetch cart");
    assert_eq!(fetched.items.len(), 1, "accumulation must not add a row");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn update_sets_quantity_and_recomputes() {
    let ctx = TestContext::new().await;
    let user = TestContext::unique_user();

    let water = ctx.seed_product("Sparkling Water 12-pack", "18.00").await;

    ctx.carts
        .create_cart(user)
        .await
        .expect("Failed to create cart");
    ctx.carts
        .add_item(user, water.id, 4)
        .await
        .expect("Failed to add item");
    let (item, cart) = ctx
        .carts
        .update_item(user, water.id, 1)
        .await
        .expect("Failed to update item");

    assert_eq!(item.qty, 1);
    assert_eq!(cart.total, dollars("18.00"));
    assert_eq!(cart.total_items, 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn removing_last_item_zeroes_totals() {
    let ctx = TestContext::new().await;
    let user = TestContext::unique_user();

    let water = ctx.seed_product("Sparkling Water 12-pack", "18.00").await;

    ctx.carts
        .create_cart(user)
        .await
        .expect("Failed to create cart");
    ctx.carts
        .add_item(user, water.id, 2)
        .await
        .expect("Failed to add item");
    let cart = ctx
        .carts
        .remove_item(user, water.id)
        .await
        .expect("Failed to remove item");

    assert!(cart.total.is_zero());
    assert_eq!(cart.total_items, 0);

    let fetched = ctx
        .carts
        .cart_for_user(user)
        .await
        .expect("Cart row must survive emptying");
    assert!(fetched.items.is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn removing_items_steps_totals_down() {
    let ctx = TestContext::new().await;
    let user = TestContext::unique_user();

    let water = ctx.seed_product("Sparkling Water 12-pack", "10.00").await;
    let juice = ctx.seed_product("Coconut Juice 24-pack", "15.00").await;

    ctx.carts
        .create_cart(user)
        .await
        .expect("Failed to create cart");
    ctx.carts
        .add_item(user, water.id, 2)
        .await
        .expect("Failed to add water");
    let (_, cart) = ctx
        .carts
        .add_item(user, juice.id, 1)
        .await
        .expect("Failed to add juice");

    assert_eq!(cart.total, dollars("35.00"));
    assert_eq!(cart.total_items, 3);

    let cart = ctx
        .carts
        .remove_item(user, juice.id)
        .await
        .expect("Failed to remove juice");
    assert_eq!(cart.total, dollars("20.00"));
    assert_eq!(cart.total_items, 2);

    let cart = ctx
        .carts
        .remove_item(user, water.id)
        .await
        .expect("Failed to remove water");
    assert!(cart.total.is_zero());
    assert_eq!(cart.total_items, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn emptying_cart_is_idempotent() {
    let ctx = TestContext::new().await;
    let user = TestContext::unique_user();

    let water = ctx.seed_product("Sparkling Water 12-pack", "18.00").await;
    let coffee = ctx.seed_product("Cold Brew Coffee 6-pack", "27.50").await;

    ctx.carts
        .create_cart(user)
        .await
        .expect("Failed to create cart");
    ctx.carts
        .add_item(user, water.id, 2)
        .await
        .expect("Failed to add water");
    ctx.carts
        .add_item(user, coffee.id, 1)
        .await
        .expect("Failed to add coffee");

    let cart = ctx
        .carts
        .empty_cart(user)
        .await
        .expect("Failed to empty cart");
    assert!(cart.total.is_zero());
    assert_eq!(cart.total_items, 0);

    // Emptying an already-empty cart succeeds.
    let cart = ctx
        .carts
        .empty_cart(user)
        .await
        .expect("Second empty must succeed");
    assert!(cart.total.is_zero());
}

// ============================================================================
// Validation Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn unknown_product_is_rejected() {
    let ctx = TestContext::new().await;
    let user = TestContext::unique_user();

    ctx.carts
        .create_cart(user)
        .await
        .expect("Failed to create cart");

    let result = ctx.carts.add_item(user, ProductId::new(i32::MAX), 1).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn updating_absent_line_item_is_not_found() {
    let ctx = TestContext::new().await;
    let user = TestContext::unique_user();

    let water = ctx.seed_product("Sparkling Water 12-pack", "18.00").await;

    ctx.carts
        .create_cart(user)
        .await
        .expect("Failed to create cart");

    let update = ctx.carts.update_item(user, water.id, 2).await;
    assert!(matches!(update, Err(AppError::NotFound(_))));

    let removal = ctx.carts.remove_item(user, water.id).await;
    assert!(matches!(removal, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn second_cart_for_same_user_conflicts() {
    let ctx = TestContext::new().await;
    let user = TestContext::unique_user();

    ctx.carts
        .create_cart(user)
        .await
        .expect("Failed to create cart");

    let second = ctx.carts.create_cart(user).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn quantities_below_one_are_rejected() {
    let ctx = TestContext::new().await;
    let user = TestContext::unique_user();

    let water = ctx.seed_product("Sparkling Water 12-pack", "18.00").await;

    ctx.carts
        .create_cart(user)
        .await
        .expect("Failed to create cart");

    let zero = ctx.carts.add_item(user, water.id, 0).await;
    assert!(matches!(zero, Err(AppError::InvalidQuantity(0))));

    let negative = ctx.carts.update_item(user, water.id, -2).await;
    assert!(matches!(negative, Err(AppError::InvalidQuantity(-2))));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn user_without_cart_is_not_found() {
    let ctx = TestContext::new().await;
    let user = TestContext::unique_user();

    let fetch = ctx.carts.cart_for_user(user).await;
    assert!(matches!(fetch, Err(AppError::NotFound(_))));

    let water = ctx.seed_product("Sparkling Water 12-pack", "18.00").await;
    let add = ctx.carts.add_item(user, water.id, 1).await;
    assert!(matches!(add, Err(AppError::NotFound(_))));
}
