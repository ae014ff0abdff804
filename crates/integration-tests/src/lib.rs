//! End-to-end tests for the Cartwheel client.
//!
//! [`FakeBackend`] serves the storefront REST API from memory on an
//! ephemeral local port, so the tests drive the real `HttpApiClient` and
//! stores over real HTTP without any external services.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartwheel-integration-tests
//! ```
//!
//! # Seed Data
//!
//! - Customer `ada@shop.test` / [`CUSTOMER_PASSWORD`] (id 1)
//! - Admin `root@shop.test` / [`ADMIN_PASSWORD`] (id 2)
//! - Five products (ids 1-5) across the `Kitchen` and `Home & Garden`
//!   categories

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use cartwheel_client::{
    CartStore, Checkout, ClientConfig, HttpApiClient, MirroredStore, SessionStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

pub const CUSTOMER_EMAIL: &str = "ada@shop.test";
pub const CUSTOMER_PASSWORD: &str = "correct horse";
pub const ADMIN_EMAIL: &str = "root@shop.test";
pub const ADMIN_PASSWORD: &str = "admin pass";

const CHECKOUT_SESSION_ID: &str = "cs_test_a1";
const ORDER_TIMESTAMP: &str = "2025-12-01T10:00:00";

// =============================================================================
// Backend State
// =============================================================================

#[derive(Debug, Clone)]
struct Account {
    id: i64,
    name: String,
    email: String,
    password: String,
    role: &'static str,
    token: String,
    wishlist: Vec<i64>,
}

impl Account {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role,
        })
    }
}

#[derive(Debug, Clone)]
struct StoredOrder {
    owner: i64,
    body: Value,
}

#[derive(Debug, Default)]
struct BackendState {
    accounts: Vec<Account>,
    products: Vec<Value>,
    orders: Vec<StoredOrder>,
    reviews: Vec<(i64, Value)>,
    requests: Vec<String>,
    next_id: i64,
    profile_failure: Option<StatusCode>,
    profile_delay: Option<Duration>,
    token_generation: u32,
}

impl BackendState {
    fn seeded() -> Self {
        let mut state = Self {
            next_id: 100,
            ..Self::default()
        };
        state.accounts = vec![
            Account {
                id: 1,
                name: "Ada".to_string(),
                email: CUSTOMER_EMAIL.to_string(),
                password: CUSTOMER_PASSWORD.to_string(),
                role: "CUSTOMER",
                token: "tok-ada-0".to_string(),
                wishlist: Vec::new(),
            },
            Account {
                id: 2,
                name: "Root".to_string(),
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
                role: "ADMIN",
                token: "tok-root-0".to_string(),
                wishlist: Vec::new(),
            },
        ];
        state.products = vec![
            product(1, "Enamel Mug", 9.5, "Kitchen", 10),
            product(2, "Desk Lamp", 20.0, "Home & Garden", 3),
            product(3, "Trail Mug", 14.5, "Kitchen", 0),
            product(4, "Planter", 12.25, "Home & Garden", 8),
            product(5, "Tea Towel", 6.0, "Kitchen", 25),
        ];
        state
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn account_for(&self, headers: &HeaderMap) -> Option<&Account> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        self.accounts.iter().find(|a| a.token == token)
    }

    fn product(&self, id: i64) -> Option<&Value> {
        self.products.iter().find(|p| p["id"] == id)
    }
}

fn product(id: i64, name: &str, price: f64, category: &str, stock: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} from the seed catalog"),
        "price": price,
        "category": category,
        "imageUrl": format!("http://localhost:8080/uploads/{id}.png"),
        "stock": stock,
    })
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    // A panicking handler poisons the lock; the data is still usable for tests.
    state
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn text(status: StatusCode, body: &str) -> Response {
    (status, body.to_string()).into_response()
}

fn unauthorized() -> Response {
    text(StatusCode::UNAUTHORIZED, "Unauthorized")
}

fn forbidden() -> Response {
    text(StatusCode::FORBIDDEN, "Forbidden")
}

// =============================================================================
// Fake Backend
// =============================================================================

/// In-process storefront backend bound to `127.0.0.1` on an ephemeral port.
///
/// The server task stops when this value is dropped.
pub struct FakeBackend {
    base_url: Url,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a backend with the seed accounts and catalog.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState::seeded()));
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind fake backend");
        let addr = listener
            .local_addr()
            .expect("Fake backend has no local address");

        let app = router(state.clone());
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fake backend stopped");
            }
        });

        let base_url =
            Url::parse(&format!("http://{addr}")).expect("Fake backend address is a valid URL");
        Self {
            base_url,
            state,
            server,
        }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Client configuration pointing at this backend, with device and
    /// browser mirrors under `state_dir`.
    #[must_use]
    pub fn config(&self, state_dir: &Path) -> ClientConfig {
        let mut config = ClientConfig::for_base_url(self.base_url.clone());
        config.device_state_dir = state_dir.join("device");
        config.browser_state_dir = Some(state_dir.join("browser"));
        config.request_timeout = Duration::from_secs(2);
        config
    }

    /// Issue new tokens to every account, invalidating the old ones.
    pub fn revoke_tokens(&self) {
        let mut state = lock(&self.state);
        state.token_generation += 1;
        let generation = state.token_generation;
        for account in &mut state.accounts {
            account.token = format!("tok-{}-{generation}", account.id);
        }
    }

    /// Make `GET /api/users/me` answer with this status.
    pub fn fail_profile(&self, status: Option<StatusCode>) {
        lock(&self.state).profile_failure = status;
    }

    /// Delay `GET /api/users/me` responses.
    pub fn delay_profile(&self, delay: Option<Duration>) {
        lock(&self.state).profile_delay = delay;
    }

    /// Orders recorded for an account, as stored.
    #[must_use]
    pub fn orders_for(&self, email: &str) -> Vec<Value> {
        let state = lock(&self.state);
        let Some(owner) = state.accounts.iter().find(|a| a.email == email) else {
            return Vec::new();
        };
        state
            .orders
            .iter()
            .filter(|o| o.owner == owner.id)
            .map(|o| o.body.clone())
            .collect()
    }

    /// Every request received, as `METHOD /path`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.state).requests.clone()
    }

    /// Whether any request went to this path (query excluded).
    #[must_use]
    pub fn was_called(&self, method_and_path: &str) -> bool {
        self.requests().iter().any(|r| r == method_and_path)
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Client Harness
// =============================================================================

/// A client process: HTTP client plus hydrated session and cart stores.
///
/// Opening a second `Shop` on the same config simulates a restart.
pub struct Shop {
    pub api: Arc<HttpApiClient>,
    pub storage: MirroredStore,
    pub session: SessionStore,
    pub cart: CartStore,
}

impl Shop {
    /// Build the stores from `config` and restore persisted state.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub async fn open(config: &ClientConfig) -> Self {
        let api = Arc::new(HttpApiClient::new(config).expect("Failed to build HTTP client"));
        let storage = MirroredStore::from_config(config);
        let session = SessionStore::new(api.clone(), storage.clone(), config.refresh_policy);
        let cart = CartStore::new(storage.clone());
        tokio::join!(session.hydrate(), cart.hydrate());
        Self {
            api,
            storage,
            session,
            cart,
        }
    }

    #[must_use]
    pub fn checkout(&self) -> Checkout<'_> {
        Checkout::new(self.api.as_ref(), &self.session, &self.cart, &self.storage)
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/users/register", post(register))
        .route("/api/users/me", get(me).put(update_me))
        .route("/api/users/delete", delete(delete_me))
        .route(
            "/api/payments/create-checkout-session",
            post(create_checkout_session),
        )
        .route("/api/orders/create", post(create_order))
        .route("/api/orders/my", get(my_orders))
        .route("/api/orders/admin/all", get(all_orders))
        .route("/api/orders/admin/{id}/status", patch(update_order_status))
        .route("/api/orders/{id}", get(order_by_id))
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(product_by_id).put(update_product).delete(delete_product),
        )
        .route("/api/products/category/{category}", get(products_in_category))
        .route("/api/wishlist", get(wishlist))
        .route("/api/wishlist/add/{id}", post(wishlist_add))
        .route("/api/wishlist/remove/{id}", delete(wishlist_remove))
        .route(
            "/api/reviews/{id}",
            get(reviews_for).post(add_review).delete(delete_review),
        )
        .route("/api/admin/users", get(admin_users))
        .route("/api/admin/admins", post(create_admin))
        .route("/api/admin/admins/{id}", delete(delete_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            record_request,
        ))
        .with_state(state)
}

async fn record_request(
    State(state): State<Shared>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let entry = format!("{} {}", request.method(), request.uri().path());
    lock(&state).requests.push(entry);
    next.run(request).await
}

// =============================================================================
// Account Handlers
// =============================================================================

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<Credentials>) -> Response {
    let state = lock(&state);
    match state
        .accounts
        .iter()
        .find(|a| a.email == body.email && a.password == body.password)
    {
        Some(account) => {
            let mut response = account.to_json();
            response["token"] = json!(account.token);
            Json(response).into_response()
        }
        None => text(StatusCode::FORBIDDEN, "Invalid email or password"),
    }
}

#[derive(Deserialize)]
struct NewAccount {
    name: String,
    email: String,
    password: String,
}

async fn register(State(state): State<Shared>, Json(body): Json<NewAccount>) -> Response {
    let mut state = lock(&state);
    create_account(&mut state, body, "CUSTOMER", "Email is already in use.")
}

fn create_account(
    state: &mut BackendState,
    body: NewAccount,
    role: &'static str,
    duplicate_message: &str,
) -> Response {
    if state.accounts.iter().any(|a| a.email == body.email) {
        return text(StatusCode::BAD_REQUEST, duplicate_message);
    }
    let id = state.next_id();
    let account = Account {
        id,
        name: body.name,
        email: body.email,
        password: body.password,
        role,
        token: format!("tok-{id}-0"),
        wishlist: Vec::new(),
    };
    let response = account.to_json();
    state.accounts.push(account);
    Json(response).into_response()
}

async fn me(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let (delay, failure) = {
        let state = lock(&shared);
        (state.profile_delay, state.profile_failure)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(status) = failure {
        return text(status, "Profile service unavailable");
    }
    let state = lock(&shared);
    state
        .account_for(&headers)
        .map_or_else(unauthorized, |a| Json(a.to_json()).into_response())
}

#[derive(Deserialize)]
struct ProfileChanges {
    name: String,
    email: String,
    password: Option<String>,
}

async fn update_me(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ProfileChanges>,
) -> Response {
    let mut state = lock(&state);
    let Some(id) = state.account_for(&headers).map(|a| a.id) else {
        return unauthorized();
    };
    let Some(account) = state.accounts.iter_mut().find(|a| a.id == id) else {
        return unauthorized();
    };
    account.name = body.name;
    account.email = body.email;
    if let Some(password) = body.password {
        account.password = password;
    }
    Json(account.to_json()).into_response()
}

async fn delete_me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    let Some(account) = state.account_for(&headers).cloned() else {
        return unauthorized();
    };
    if account.role != "CUSTOMER" {
        return text(
            StatusCode::FORBIDDEN,
            "Only customers can delete their accounts.",
        );
    }
    state.accounts.retain(|a| a.id != account.id);
    text(StatusCode::OK, "User deleted successfully")
}

// =============================================================================
// Checkout and Order Handlers
// =============================================================================

#[derive(Deserialize)]
struct CheckoutRequest {
    items: Vec<Value>,
}

async fn create_checkout_session(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CheckoutRequest>,
) -> Response {
    let state = lock(&state);
    if state.account_for(&headers).is_none() {
        return unauthorized();
    }
    if body.items.is_empty() {
        return text(StatusCode::BAD_REQUEST, "No items");
    }
    Json(json!({
        "url": format!("https://pay.test/c/{CHECKOUT_SESSION_ID}"),
        "sessionID": CHECKOUT_SESSION_ID,
    }))
    .into_response()
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(items): Json<Vec<Value>>,
) -> Response {
    let mut state = lock(&state);
    let Some(owner) = state.account_for(&headers).map(|a| a.id) else {
        return unauthorized();
    };
    let mut total = 0.0;
    let mut order_items = Vec::with_capacity(items.len());
    for item in &items {
        let price = item["price"].as_f64().unwrap_or_default();
        let quantity = item["quantity"].as_i64().unwrap_or_default();
        if quantity < 1 {
            return text(StatusCode::BAD_REQUEST, "Invalid quantity");
        }
        #[allow(clippy::cast_precision_loss)]
        let line_total = price * quantity as f64;
        total += line_total;
        let product = state
            .product(item["productId"].as_i64().unwrap_or_default())
            .cloned();
        order_items.push(json!({
            "product": product,
            "quantity": quantity,
            "price": price,
        }));
    }
    let id = state.next_id();
    let body = json!({
        "id": id,
        "status": "COMPLETED",
        "totalPrice": total,
        "createdAt": ORDER_TIMESTAMP,
        "orderItems": order_items,
    });
    state.orders.push(StoredOrder {
        owner,
        body: body.clone(),
    });
    Json(body).into_response()
}

async fn my_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let Some(owner) = state.account_for(&headers).map(|a| a.id) else {
        return unauthorized();
    };
    let orders: Vec<Value> = state
        .orders
        .iter()
        .filter(|o| o.owner == owner)
        .map(|o| o.body.clone())
        .collect();
    Json(orders).into_response()
}

async fn order_by_id(
    State(state): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
) -> Response {
    let state = lock(&state);
    let Some(account) = state.account_for(&headers) else {
        return unauthorized();
    };
    state
        .orders
        .iter()
        .find(|o| o.body["id"] == id && (o.owner == account.id || account.role == "ADMIN"))
        .map_or_else(
            || text(StatusCode::NOT_FOUND, "Order not found"),
            |o| Json(o.body.clone()).into_response(),
        )
}

async fn all_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    match state.account_for(&headers) {
        Some(a) if a.role == "ADMIN" => {
            let orders: Vec<Value> = state.orders.iter().map(|o| o.body.clone()).collect();
            Json(orders).into_response()
        }
        Some(_) => forbidden(),
        None => unauthorized(),
    }
}

#[derive(Deserialize)]
struct StatusQuery {
    status: String,
}

async fn update_order_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
    Query(query): Query<StatusQuery>,
) -> Response {
    let mut state = lock(&state);
    match state.account_for(&headers) {
        Some(a) if a.role == "ADMIN" => {}
        Some(_) => return forbidden(),
        None => return unauthorized(),
    }
    let status = query.status.to_ascii_uppercase();
    if !["PENDING", "PROCESSING", "COMPLETED", "CANCELLED"].contains(&status.as_str()) {
        return text(StatusCode::BAD_REQUEST, "Invalid status value.");
    }
    match state.orders.iter_mut().find(|o| o.body["id"] == id) {
        Some(order) => {
            order.body["status"] = json!(status);
            Json(order.body.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// =============================================================================
// Catalog Handlers
// =============================================================================

#[derive(Deserialize)]
struct ListingQuery {
    page: Option<usize>,
    size: Option<usize>,
    category: Option<String>,
    search: Option<String>,
}

async fn list_products(
    State(state): State<Shared>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let state = lock(&state);
    let search = query.search.map(|s| s.to_lowercase());
    let matching: Vec<Value> = state
        .products
        .iter()
        .filter(|p| query.category.as_ref().is_none_or(|c| p["category"] == c.as_str()))
        .filter(|p| {
            search.as_ref().is_none_or(|s| {
                p["name"]
                    .as_str()
                    .is_some_and(|n| n.to_lowercase().contains(s))
            })
        })
        .cloned()
        .collect();

    let size = query.size.unwrap_or(20).max(1);
    let page = query.page.unwrap_or(0);
    let content: Vec<Value> = matching.iter().skip(page * size).take(size).cloned().collect();
    Json(json!({
        "content": content,
        "totalPages": matching.len().div_ceil(size),
        "totalElements": matching.len(),
        "number": page,
    }))
    .into_response()
}

async fn product_by_id(State(state): State<Shared>, UrlPath(id): UrlPath<i64>) -> Response {
    let state = lock(&state);
    state.product(id).map_or_else(
        || text(StatusCode::NOT_FOUND, "Product not found"),
        |p| Json(p.clone()).into_response(),
    )
}

async fn products_in_category(
    State(state): State<Shared>,
    UrlPath(category): UrlPath<String>,
) -> Response {
    let state = lock(&state);
    let products: Vec<Value> = state
        .products
        .iter()
        .filter(|p| p["category"] == category.as_str())
        .cloned()
        .collect();
    Json(products).into_response()
}

fn require_admin(state: &BackendState, headers: &HeaderMap) -> Option<Response> {
    match state.account_for(headers) {
        Some(a) if a.role == "ADMIN" => None,
        Some(_) => Some(forbidden()),
        None => Some(unauthorized()),
    }
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Some(denied) = require_admin(&state, &headers) {
        return denied;
    }
    body["id"] = json!(state.next_id());
    state.products.push(body.clone());
    Json(body).into_response()
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Some(denied) = require_admin(&state, &headers) {
        return denied;
    }
    body["id"] = json!(id);
    match state.products.iter_mut().find(|p| p["id"] == id) {
        Some(product) => {
            *product = body.clone();
            Json(body).into_response()
        }
        None => text(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
) -> Response {
    let mut state = lock(&state);
    if let Some(denied) = require_admin(&state, &headers) {
        return denied;
    }
    state.products.retain(|p| p["id"] != id);
    text(StatusCode::OK, "Deleted successfully")
}

// =============================================================================
// Wishlist and Review Handlers
// =============================================================================

async fn wishlist(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let Some(account) = state.account_for(&headers) else {
        return unauthorized();
    };
    let products: Vec<Value> = account
        .wishlist
        .iter()
        .filter_map(|id| state.product(*id).cloned())
        .collect();
    Json(products).into_response()
}

async fn wishlist_add(
    State(state): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
) -> Response {
    let mut state = lock(&state);
    let Some(owner) = state.account_for(&headers).map(|a| a.id) else {
        return unauthorized();
    };
    if state.product(id).is_none() {
        return text(StatusCode::NOT_FOUND, "Product not found");
    }
    if let Some(account) = state.accounts.iter_mut().find(|a| a.id == owner) {
        if !account.wishlist.contains(&id) {
            account.wishlist.push(id);
        }
    }
    text(StatusCode::OK, "Added to wishlist")
}

async fn wishlist_remove(
    State(state): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
) -> Response {
    let mut state = lock(&state);
    let Some(owner) = state.account_for(&headers).map(|a| a.id) else {
        return unauthorized();
    };
    if let Some(account) = state.accounts.iter_mut().find(|a| a.id == owner) {
        account.wishlist.retain(|p| *p != id);
    }
    text(StatusCode::OK, "Removed from wishlist")
}

async fn reviews_for(State(state): State<Shared>, UrlPath(product_id): UrlPath<i64>) -> Response {
    let state = lock(&state);
    let reviews: Vec<Value> = state
        .reviews
        .iter()
        .filter(|(p, _)| *p == product_id)
        .map(|(_, r)| r.clone())
        .collect();
    Json(reviews).into_response()
}

#[derive(Deserialize)]
struct NewReview {
    rating: i64,
    comment: String,
}

async fn add_review(
    State(state): State<Shared>,
    headers: HeaderMap,
    UrlPath(product_id): UrlPath<i64>,
    Json(body): Json<NewReview>,
) -> Response {
    let mut state = lock(&state);
    let Some(author) = state
        .account_for(&headers)
        .map(|a| json!({ "id": a.id, "name": a.name }))
    else {
        return unauthorized();
    };
    if !(1..=5).contains(&body.rating) {
        return text(StatusCode::BAD_REQUEST, "Rating must be between 1 and 5");
    }
    let id = state.next_id();
    let review = json!({
        "id": id,
        "rating": body.rating,
        "comment": body.comment,
        "createdAt": ORDER_TIMESTAMP,
        "user": author,
    });
    state.reviews.push((product_id, review.clone()));
    Json(review).into_response()
}

async fn delete_review(
    State(state): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
) -> Response {
    let mut state = lock(&state);
    if let Some(denied) = require_admin(&state, &headers) {
        return denied;
    }
    state.reviews.retain(|(_, r)| r["id"] != id);
    StatusCode::OK.into_response()
}

// =============================================================================
// Admin Handlers
// =============================================================================

async fn admin_users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Some(denied) = require_admin(&state, &headers) {
        return denied;
    }
    let users: Vec<Value> = state.accounts.iter().map(Account::to_json).collect();
    Json(users).into_response()
}

async fn create_admin(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewAccount>,
) -> Response {
    let mut state = lock(&state);
    if let Some(denied) = require_admin(&state, &headers) {
        return denied;
    }
    create_account(&mut state, body, "ADMIN", "Email already exists")
}

async fn delete_admin(
    State(state): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
) -> Response {
    let mut state = lock(&state);
    let Some(current) = state.account_for(&headers).cloned() else {
        return unauthorized();
    };
    if current.role != "ADMIN" {
        return forbidden();
    }
    if current.id == id {
        return text(StatusCode::BAD_REQUEST, "You cannot delete yourself.");
    }
    if !state.accounts.iter().any(|a| a.id == id && a.role == "ADMIN") {
        return text(StatusCode::BAD_REQUEST, "Admin not found.");
    }
    state.accounts.retain(|a| a.id != id);
    text(StatusCode::OK, "Admin deleted successfully")
}
