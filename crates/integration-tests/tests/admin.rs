//! Admin console operations over HTTP.
//!
//! Run with: cargo test -p cartwheel-integration-tests

#![allow(clippy::unwrap_used)]

use cartwheel_client::models::{BearerToken, ProductInput, Registration};
use cartwheel_client::{ApiError, CheckoutOutcome};
use cartwheel_core::{OrderStatus, Price, ProductId, ReviewId, UserId};
use cartwheel_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, CUSTOMER_EMAIL, CUSTOMER_PASSWORD, FakeBackend, Shop,
};
use secrecy::SecretString;

async fn login_as(
    backend: &FakeBackend,
    dir: &std::path::Path,
    email: &str,
    password: &str,
) -> (Shop, BearerToken) {
    let shop = Shop::open(&backend.config(dir)).await;
    let session = shop
        .session
        .login(email, &SecretString::from(password.to_string()))
        .await
        .unwrap();
    (shop, session.token)
}

fn lamp_input() -> ProductInput {
    ProductInput {
        name: "Floor Lamp".to_string(),
        price: Price::from_cents(4500).unwrap(),
        description: Some("Tall".to_string()),
        category: Some("Home & Garden".to_string()),
        image_url: None,
        stock: Some(2),
    }
}

#[tokio::test]
async fn test_admin_flag_follows_role() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    let (admin, _) = login_as(&backend, dir.path(), ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert!(admin.session.is_admin());

    let other = tempfile::tempdir().unwrap();
    let (customer, _) =
        login_as(&backend, other.path(), CUSTOMER_EMAIL, CUSTOMER_PASSWORD).await;
    assert!(!customer.session.is_admin());
}

#[tokio::test]
async fn test_product_lifecycle() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (shop, token) = login_as(&backend, dir.path(), ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let created = shop.api.create_product(&token, &lamp_input()).await.unwrap();
    assert_eq!(created.name, "Floor Lamp");
    assert_eq!(created.price, Price::from_cents(4500).unwrap());

    let mut changes = lamp_input();
    changes.price = Price::from_cents(3999).unwrap();
    let updated = shop
        .api
        .update_product(&token, created.id, &changes)
        .await
        .unwrap();
    assert_eq!(updated.price, Price::from_cents(3999).unwrap());

    shop.api.delete_product(&token, created.id).await.unwrap();
    let err = shop.api.get_product(created.id).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 404, .. }));
}

#[tokio::test]
async fn test_customer_cannot_create_products() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (shop, token) = login_as(&backend, dir.path(), CUSTOMER_EMAIL, CUSTOMER_PASSWORD).await;

    let err = shop.api.create_product(&token, &lamp_input()).await.unwrap_err();

    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn test_admin_accounts() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (shop, token) = login_as(&backend, dir.path(), ADMIN_EMAIL, ADMIN_PASSWORD).await;

    assert_eq!(shop.api.list_admins(&token).await.unwrap().len(), 1);

    let created = shop
        .api
        .create_admin(
            &token,
            &Registration {
                name: "Ops".to_string(),
                email: "ops@shop.test".to_string(),
                password: SecretString::from("ops pass".to_string()),
            },
        )
        .await
        .unwrap();
    assert!(created.is_admin());
    assert_eq!(shop.api.list_admins(&token).await.unwrap().len(), 2);

    let err = shop.api.delete_admin(&token, UserId::new(2)).await.unwrap_err();
    assert!(err.to_string().contains("You cannot delete yourself."));

    shop.api.delete_admin(&token, created.id).await.unwrap();
    assert_eq!(shop.api.list_admins(&token).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_order_status_update() {
    let backend = FakeBackend::start().await;

    let customer_dir = tempfile::tempdir().unwrap();
    let (customer, _) =
        login_as(&backend, customer_dir.path(), CUSTOMER_EMAIL, CUSTOMER_PASSWORD).await;
    let mug = customer.api.get_product(ProductId::new(1)).await.unwrap();
    customer.cart.add_to_cart(&mug).await;
    customer.checkout().begin().await.unwrap();
    let CheckoutOutcome::OrderSaved(order) = customer.checkout().complete().await else {
        panic!("order was not saved");
    };

    let admin_dir = tempfile::tempdir().unwrap();
    let (admin, token) = login_as(&backend, admin_dir.path(), ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(admin.api.all_orders(&token).await.unwrap().len(), 1);

    let updated = admin
        .api
        .update_order_status(&token, order.id, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Processing);
}

#[tokio::test]
async fn test_review_moderation() {
    let backend = FakeBackend::start().await;

    let customer_dir = tempfile::tempdir().unwrap();
    let (customer, customer_token) =
        login_as(&backend, customer_dir.path(), CUSTOMER_EMAIL, CUSTOMER_PASSWORD).await;
    let review = customer
        .api
        .add_review(&customer_token, ProductId::new(3), 1, "Leaks")
        .await
        .unwrap();

    let err = customer
        .api
        .delete_review(&customer_token, review.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let admin_dir = tempfile::tempdir().unwrap();
    let (admin, token) = login_as(&backend, admin_dir.path(), ADMIN_EMAIL, ADMIN_PASSWORD).await;
    admin.api.delete_review(&token, review.id).await.unwrap();
    admin
        .api
        .delete_review(&token, ReviewId::new(9999))
        .await
        .unwrap();

    assert!(admin.api.reviews(ProductId::new(3)).await.unwrap().is_empty());
}
