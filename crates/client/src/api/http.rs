//! HTTP implementation of the backend API.

use std::sync::Arc;

use async_trait::async_trait;
use cartwheel_core::{Email, Role, UserId};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, StoreApi};
use crate::config::ClientConfig;
use crate::models::{
    AuthSession, BearerToken, CheckoutItem, CheckoutRedirect, Order, ProfileUpdate, Registration,
    User,
};

/// Maximum characters of a response body kept in debug logs.
const LOG_BODY_LIMIT: usize = 300;

/// Client for the storefront backend's REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpApiClient {
    inner: Arc<HttpApiClientInner>,
}

struct HttpApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpApiClient {
    /// Create a client for the configured backend.
    ///
    /// Every request is bounded by `config.request_timeout`; exceeding it
    /// surfaces as [`ApiError::Timeout`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
            }),
        })
    }

    /// Backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build a request for an API path such as `/api/users/me`.
    pub(super) fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&BearerToken>,
    ) -> RequestBuilder {
        let url = format!(
            "{}{path}",
            self.inner.base_url.as_str().trim_end_matches('/')
        );
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Send a request and return the body text of a successful response.
    pub(super) async fn send_text(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::from_status(status.as_u16(), body));
        }

        Ok(body)
    }

    /// Send a request and decode a successful JSON response.
    pub(super) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send_text(builder).await?;
        serde_json::from_str(&body).map_err(|e| {
            debug!(
                error = %e,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Failed to decode backend response"
            );
            ApiError::Decode(e.to_string())
        })
    }
}

// =============================================================================
// Session-facing operations
// =============================================================================

/// Login response: the backend has returned both a nested and a flat shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum LoginResponse {
    Nested {
        user: User,
        token: String,
    },
    Flat {
        id: UserId,
        name: String,
        email: Email,
        role: Role,
        token: String,
    },
}

impl LoginResponse {
    fn into_session(self) -> Result<AuthSession, ApiError> {
        let (user, raw_token) = match self {
            Self::Nested { user, token } => (user, token),
            Self::Flat {
                id,
                name,
                email,
                role,
                token,
            } => (
                User {
                    id,
                    name,
                    email,
                    role,
                },
                token,
            ),
        };
        let token = BearerToken::parse(&raw_token)
            .ok_or_else(|| ApiError::Decode("login response has no usable token".to_string()))?;
        Ok(AuthSession { user, token })
    }
}

#[async_trait]
impl StoreApi for HttpApiClient {
    #[instrument(skip(self, password))]
    async fn authenticate(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, ApiError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });
        let response: LoginResponse = self
            .send_json(self.request(Method::POST, "/api/auth/login", None).json(&body))
            .await?;
        response.into_session()
    }

    #[instrument(skip_all)]
    async fn fetch_profile(&self, token: &BearerToken) -> Result<User, ApiError> {
        self.send_json(self.request(Method::GET, "/api/users/me", Some(token)))
            .await
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    async fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        let body = serde_json::json!({
            "name": registration.name,
            "email": registration.email,
            "password": registration.password.expose_secret(),
            "role": Role::Customer,
        });
        self.send_json(
            self.request(Method::POST, "/api/users/register", None)
                .json(&body),
        )
        .await
    }

    #[instrument(skip_all)]
    async fn update_profile(
        &self,
        token: &BearerToken,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        let mut body = serde_json::json!({
            "name": update.name,
            "email": update.email,
        });
        if let Some(password) = &update.password {
            body["password"] = serde_json::Value::String(password.expose_secret().to_string());
        }
        self.send_json(
            self.request(Method::PUT, "/api/users/me", Some(token))
                .json(&body),
        )
        .await
    }

    #[instrument(skip_all)]
    async fn delete_account(&self, token: &BearerToken) -> Result<String, ApiError> {
        self.send_text(self.request(Method::DELETE, "/api/users/delete", Some(token)))
            .await
    }

    #[instrument(skip_all, fields(lines = items.len()))]
    async fn create_checkout_session(
        &self,
        token: &BearerToken,
        items: &[CheckoutItem],
    ) -> Result<CheckoutRedirect, ApiError> {
        let body = serde_json::json!({ "items": items });
        self.send_json(
            self.request(
                Method::POST,
                "/api/payments/create-checkout-session",
                Some(token),
            )
            .json(&body),
        )
        .await
    }

    #[instrument(skip_all, fields(lines = items.len()))]
    async fn create_order(
        &self,
        token: &BearerToken,
        items: &[CheckoutItem],
    ) -> Result<Order, ApiError> {
        self.send_json(
            self.request(Method::POST, "/api/orders/create", Some(token))
                .json(items),
        )
        .await
    }
}
