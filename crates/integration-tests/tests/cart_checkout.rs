//! Cart persistence and the two-step checkout across a client restart.
//!
//! Run with: cargo test -p cartwheel-integration-tests

#![allow(clippy::unwrap_used)]

use cartwheel_client::storage::keys;
use cartwheel_client::{CheckoutOutcome, Error, NotSavedReason};
use cartwheel_core::{OrderStatus, Price, ProductId};
use cartwheel_integration_tests::{CUSTOMER_EMAIL, CUSTOMER_PASSWORD, FakeBackend, Shop};
use secrecy::SecretString;

async fn add_product(shop: &Shop, id: i64, times: usize) {
    let product = shop.api.get_product(ProductId::new(id)).await.unwrap();
    for _ in 0..times {
        shop.cart.add_to_cart(&product).await;
    }
}

async fn sign_in(shop: &Shop) {
    shop.session
        .login(
            CUSTOMER_EMAIL,
            &SecretString::from(CUSTOMER_PASSWORD.to_string()),
        )
        .await
        .unwrap();
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_cart_survives_restart() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    let first = Shop::open(&backend.config(dir.path())).await;
    add_product(&first, 1, 2).await;
    add_product(&first, 2, 1).await;
    drop(first);

    let second = Shop::open(&backend.config(dir.path())).await;
    assert_eq!(second.cart.lines().len(), 2);
    assert_eq!(second.cart.item_count(), 3);
    assert_eq!(second.cart.total(), Price::from_cents(3900).unwrap());
}

#[tokio::test]
async fn test_quantity_edits_persist() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    let shop = Shop::open(&backend.config(dir.path())).await;
    add_product(&shop, 5, 1).await;
    shop.cart
        .update_quantity(ProductId::new(5), 4)
        .await
        .unwrap();
    let err = shop
        .cart
        .update_quantity(ProductId::new(5), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let reopened = Shop::open(&backend.config(dir.path())).await;
    assert_eq!(reopened.cart.item_count(), 4);

    reopened.cart.remove_from_cart(ProductId::new(5)).await;
    let emptied = Shop::open(&backend.config(dir.path())).await;
    assert!(emptied.cart.is_empty());
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let shop = Shop::open(&backend.config(dir.path())).await;
    add_product(&shop, 1, 1).await;

    let err = shop.checkout().begin().await.unwrap_err();

    assert!(matches!(err, Error::NotAuthenticated));
    assert!(!backend.was_called("POST /api/payments/create-checkout-session"));
}

#[tokio::test]
async fn test_checkout_with_empty_cart_is_refused() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let shop = Shop::open(&backend.config(dir.path())).await;
    sign_in(&shop).await;

    assert!(shop.checkout().begin().await.is_err());
    assert!(!backend.was_called("POST /api/payments/create-checkout-session"));
}

#[tokio::test]
async fn test_full_checkout_across_restart() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    let before = Shop::open(&backend.config(dir.path())).await;
    sign_in(&before).await;
    add_product(&before, 1, 2).await;
    add_product(&before, 4, 1).await;

    let redirect = before.checkout().begin().await.unwrap();
    assert_eq!(redirect.url, "https://pay.test/c/cs_test_a1");
    assert!(before.storage.read(keys::CHECKOUT).await.is_some());
    assert!(backend.orders_for(CUSTOMER_EMAIL).is_empty());
    drop(before);

    // Payment happens in the browser; the client comes back fresh.
    let after = Shop::open(&backend.config(dir.path())).await;
    let outcome = after.checkout().complete().await;

    let order = match outcome {
        CheckoutOutcome::OrderSaved(order) => order,
        CheckoutOutcome::NotSaved(reason) => panic!("expected a saved order, got {reason:?}"),
    };
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.total(), Price::from_cents(3125).unwrap());
    assert_eq!(order.order_items.len(), 2);

    assert!(after.cart.is_empty());
    assert!(after.storage.read(keys::CART).await.is_none());
    assert!(after.storage.read(keys::CHECKOUT).await.is_none());

    let stored = backend.orders_for(CUSTOMER_EMAIL);
    assert_eq!(stored.len(), 1);

    let history = after
        .api
        .my_orders(&after.session.token().unwrap())
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.first().map(|o| o.id), Some(order.id));
}

#[tokio::test]
async fn test_completion_without_session_saves_nothing() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    let before = Shop::open(&backend.config(dir.path())).await;
    sign_in(&before).await;
    add_product(&before, 2, 1).await;
    before.checkout().begin().await.unwrap();
    drop(before);

    backend.revoke_tokens();
    let after = Shop::open(&backend.config(dir.path())).await;
    let outcome = after.checkout().complete().await;

    assert!(matches!(
        outcome,
        CheckoutOutcome::NotSaved(NotSavedReason::NoSession)
    ));
    assert!(!backend.was_called("POST /api/orders/create"));
    assert!(backend.orders_for(CUSTOMER_EMAIL).is_empty());
    assert_eq!(after.cart.item_count(), 1);
}

#[tokio::test]
async fn test_completion_falls_back_to_pending_record() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    let before = Shop::open(&backend.config(dir.path())).await;
    sign_in(&before).await;
    add_product(&before, 5, 3).await;
    before.checkout().begin().await.unwrap();
    before.storage.remove(&[keys::CART]).await;
    drop(before);

    let after = Shop::open(&backend.config(dir.path())).await;
    let outcome = after.checkout().complete().await;

    let order = match outcome {
        CheckoutOutcome::OrderSaved(order) => order,
        CheckoutOutcome::NotSaved(reason) => panic!("expected a saved order, got {reason:?}"),
    };
    assert_eq!(order.total(), Price::from_cents(1800).unwrap());
}

#[tokio::test]
async fn test_order_matches_cart_at_redirect() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    let before = Shop::open(&backend.config(dir.path())).await;
    sign_in(&before).await;
    add_product(&before, 1, 2).await;
    before.checkout().begin().await.unwrap();
    add_product(&before, 2, 1).await;
    drop(before);

    let after = Shop::open(&backend.config(dir.path())).await;
    let outcome = after.checkout().complete().await;

    let order = match outcome {
        CheckoutOutcome::OrderSaved(order) => order,
        CheckoutOutcome::NotSaved(reason) => panic!("expected a saved order, got {reason:?}"),
    };
    assert_eq!(order.total(), Price::from_cents(1900).unwrap());
    assert_eq!(order.order_items.len(), 1);
}

#[tokio::test]
async fn test_cleared_cart_abandons_checkout() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    let before = Shop::open(&backend.config(dir.path())).await;
    sign_in(&before).await;
    add_product(&before, 4, 1).await;
    before.checkout().begin().await.unwrap();
    before.cart.clear_cart().await;
    drop(before);

    let after = Shop::open(&backend.config(dir.path())).await;
    let outcome = after.checkout().complete().await;

    assert_eq!(outcome, CheckoutOutcome::NotSaved(NotSavedReason::NoItems));
    assert!(!backend.was_called("POST /api/orders/create"));
}
