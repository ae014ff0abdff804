//! Storefront backend API client.
//!
//! # Architecture
//!
//! - [`StoreApi`] is the narrow seam the stores depend on: authentication,
//!   profile, account, checkout session, and order creation. Tests swap in a
//!   scripted implementation.
//! - [`HttpApiClient`] implements it over `reqwest`, and also exposes the
//!   rest of the backend surface used directly by presentation code: the
//!   catalog, orders, wishlist, reviews, and the admin console.
//!
//! The backend is the source of truth. Nothing here caches responses.
//!
//! # Errors
//!
//! Non-success responses carry the backend's body text verbatim, which is
//! how the backend reports messages like "Invalid email or password".

mod admin;
mod catalog;
mod http;

pub use http::HttpApiClient;

use async_trait::async_trait;
use cartwheel_core::Email;
use secrecy::SecretString;
use thiserror::Error;

use crate::models::{
    AuthSession, BearerToken, CheckoutItem, CheckoutRedirect, Order, ProfileUpdate, Registration,
    User,
};

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: no valid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403: credentials rejected or not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Any other non-success status.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection or transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the backend explicitly rejected the caller's credentials.
    #[must_use]
    pub const fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Forbidden(_))
    }

    /// Map a status code and body to an error.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            _ => Self::Rejected { status, message },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Backend operations the session, cart, and checkout flows rely on.
#[async_trait]
pub trait StoreApi: Send + Sync {
    /// Exchange credentials for a profile and bearer token.
    async fn authenticate(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, ApiError>;

    /// Fetch the profile the token belongs to.
    async fn fetch_profile(&self, token: &BearerToken) -> Result<User, ApiError>;

    /// Create a new customer account.
    async fn register(&self, registration: &Registration) -> Result<User, ApiError>;

    /// Change the signed-in account's name, email, or password.
    async fn update_profile(
        &self,
        token: &BearerToken,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError>;

    /// Delete the signed-in account. Returns the backend's confirmation text.
    async fn delete_account(&self, token: &BearerToken) -> Result<String, ApiError>;

    /// Start a payment-provider checkout for these lines.
    async fn create_checkout_session(
        &self,
        token: &BearerToken,
        items: &[CheckoutItem],
    ) -> Result<CheckoutRedirect, ApiError>;

    /// Record a paid order.
    async fn create_order(
        &self,
        token: &BearerToken,
        items: &[CheckoutItem],
    ) -> Result<Order, ApiError>;
}
