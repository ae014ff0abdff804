//! Admin console endpoints.
//!
//! The backend enforces the ADMIN role on every call here and answers 403
//! otherwise. Callers gate the console on `User::is_admin` before offering it.

use cartwheel_core::{OrderId, OrderStatus, ProductId, ReviewId, Role, UserId};
use reqwest::Method;
use secrecy::ExposeSecret;
use tracing::{info, instrument};

use super::{ApiError, HttpApiClient};
use crate::models::{BearerToken, Order, Product, ProductInput, Registration, User};

type ApiResult<T> = Result<T, ApiError>;

impl HttpApiClient {
    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_product(&self, token: &BearerToken, input: &ProductInput) -> ApiResult<Product> {
        let product: Product = self
            .send_json(
                self.request(Method::POST, "/api/products", Some(token))
                    .json(input),
            )
            .await?;
        info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    /// Replace a product's details.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self, token, input))]
    pub async fn update_product(
        &self,
        token: &BearerToken,
        id: ProductId,
        input: &ProductInput,
    ) -> ApiResult<Product> {
        self.send_json(
            self.request(Method::PUT, &format!("/api/products/{id}"), Some(token))
                .json(input),
        )
        .await
    }

    /// Remove a product from the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_product(&self, token: &BearerToken, id: ProductId) -> ApiResult<String> {
        self.send_text(self.request(Method::DELETE, &format!("/api/products/{id}"), Some(token)))
            .await
    }

    /// Accounts holding the ADMIN role.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip_all)]
    pub async fn list_admins(&self, token: &BearerToken) -> ApiResult<Vec<User>> {
        let users: Vec<User> = self
            .send_json(self.request(Method::GET, "/api/admin/users", Some(token)))
            .await?;
        Ok(users.into_iter().filter(User::is_admin).collect())
    }

    /// Create another admin account. The role is always ADMIN.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken, the caller is not an admin, or
    /// the request fails.
    #[instrument(skip(self, token, registration), fields(email = %registration.email))]
    pub async fn create_admin(
        &self,
        token: &BearerToken,
        registration: &Registration,
    ) -> ApiResult<User> {
        let body = serde_json::json!({
            "name": registration.name,
            "email": registration.email,
            "password": registration.password.expose_secret(),
            "role": Role::Admin,
        });
        self.send_json(
            self.request(Method::POST, "/api/admin/admins", Some(token))
                .json(&body),
        )
        .await
    }

    /// Delete an admin account. The backend refuses self-deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is not an admin, is the caller, or the
    /// request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_admin(&self, token: &BearerToken, id: UserId) -> ApiResult<String> {
        self.send_text(self.request(
            Method::DELETE,
            &format!("/api/admin/admins/{id}"),
            Some(token),
        ))
        .await
    }

    /// Every order in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip_all)]
    pub async fn all_orders(&self, token: &BearerToken) -> ApiResult<Vec<Order>> {
        self.send_json(self.request(Method::GET, "/api/orders/admin/all", Some(token)))
            .await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist, the caller is not an
    /// admin, or the request fails.
    #[instrument(skip(self, token))]
    pub async fn update_order_status(
        &self,
        token: &BearerToken,
        id: OrderId,
        status: OrderStatus,
    ) -> ApiResult<Order> {
        let path = format!("/api/orders/admin/{id}/status?status={status}");
        self.send_json(self.request(Method::PATCH, &path, Some(token)))
            .await
    }

    /// Remove a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_review(&self, token: &BearerToken, id: ReviewId) -> ApiResult<()> {
        self.send_text(self.request(Method::DELETE, &format!("/api/reviews/{id}"), Some(token)))
            .await?;
        Ok(())
    }
}
