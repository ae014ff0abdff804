//! Scripted backend and in-memory mirrors for unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cartwheel_core::{Email, OrderId, OrderStatus, Price, Role, UserId};
use secrecy::{ExposeSecret, SecretString};

use crate::api::{ApiError, StoreApi};
use crate::models::{
    AuthSession, BearerToken, CheckoutItem, CheckoutRedirect, Order, ProfileUpdate, Registration,
    User,
};
use crate::storage::{MemoryMirror, MirroredStore};

pub const PASSWORD: &str = "correct horse";
pub const TOKEN: &str = "token-ada-1";

type ErrorFactory = fn() -> ApiError;

/// Device and browser memory mirrors plus the store over them.
pub fn mirrors() -> (MemoryMirror, MemoryMirror, MirroredStore) {
    let device = MemoryMirror::new("device");
    let browser = MemoryMirror::new("browser");
    let store = MirroredStore::new(vec![Arc::new(device.clone()), Arc::new(browser.clone())]);
    (device, browser, store)
}

/// In-process stand-in for the backend with one known account.
pub struct FakeApi {
    account: AuthSession,
    profile_error: Mutex<Option<ErrorFactory>>,
    order_error: Mutex<Option<ErrorFactory>>,
    calls: Mutex<Vec<&'static str>>,
    orders: Mutex<Vec<Vec<CheckoutItem>>>,
}

impl FakeApi {
    pub fn new(role: Role) -> Self {
        Self {
            account: AuthSession {
                user: User {
                    id: UserId::new(1),
                    name: "Ada".to_string(),
                    email: Email::parse("ada@shop.test").unwrap(),
                    role,
                },
                token: BearerToken::parse(TOKEN).unwrap(),
            },
            profile_error: Mutex::new(None),
            order_error: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            orders: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_profile_with(&self, error: ErrorFactory) {
        *self.profile_error.lock().unwrap() = Some(error);
    }

    pub fn fail_orders_with(&self, error: ErrorFactory) {
        *self.order_error.lock().unwrap() = Some(error);
    }

    /// Operations called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Line items of every order created so far.
    pub fn orders(&self) -> Vec<Vec<CheckoutItem>> {
        self.orders.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_token(&self, token: &BearerToken) -> Result<(), ApiError> {
        if *token == self.account.token {
            Ok(())
        } else {
            Err(ApiError::Unauthorized("Unauthorized".to_string()))
        }
    }
}

#[async_trait]
impl StoreApi for FakeApi {
    async fn authenticate(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, ApiError> {
        self.record("authenticate");
        if *email == self.account.user.email && password.expose_secret() == PASSWORD {
            Ok(self.account.clone())
        } else {
            Err(ApiError::Forbidden("Invalid email or password".to_string()))
        }
    }

    async fn fetch_profile(&self, token: &BearerToken) -> Result<User, ApiError> {
        self.record("fetch_profile");
        if let Some(error) = *self.profile_error.lock().unwrap() {
            return Err(error());
        }
        self.check_token(token)?;
        Ok(self.account.user.clone())
    }

    async fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        self.record("register");
        let email = Email::parse(&registration.email).unwrap();
        if email == self.account.user.email {
            return Err(ApiError::from_status(
                400,
                "Email is already in use.".to_string(),
            ));
        }
        Ok(User {
            id: UserId::new(2),
            name: registration.name.clone(),
            email,
            role: Role::Customer,
        })
    }

    async fn update_profile(
        &self,
        token: &BearerToken,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        self.record("update_profile");
        self.check_token(token)?;
        Ok(User {
            name: update.name.clone(),
            email: Email::parse(&update.email).unwrap(),
            ..self.account.user.clone()
        })
    }

    async fn delete_account(&self, token: &BearerToken) -> Result<String, ApiError> {
        self.record("delete_account");
        self.check_token(token)?;
        if self.account.user.is_admin() {
            return Err(ApiError::Forbidden(
                "Only customers can delete their accounts.".to_string(),
            ));
        }
        Ok("Account deleted".to_string())
    }

    async fn create_checkout_session(
        &self,
        token: &BearerToken,
        _items: &[CheckoutItem],
    ) -> Result<CheckoutRedirect, ApiError> {
        self.record("create_checkout_session");
        self.check_token(token)?;
        Ok(CheckoutRedirect {
            url: "https://pay.test/c/cs_test_1".to_string(),
            session_id: Some("cs_test_1".to_string()),
        })
    }

    async fn create_order(
        &self,
        token: &BearerToken,
        items: &[CheckoutItem],
    ) -> Result<Order, ApiError> {
        self.record("create_order");
        self.check_token(token)?;
        if let Some(error) = *self.order_error.lock().unwrap() {
            return Err(error());
        }
        let mut orders = self.orders.lock().unwrap();
        orders.push(items.to_vec());
        Ok(Order {
            id: OrderId::new(i64::try_from(orders.len()).unwrap()),
            status: OrderStatus::Completed,
            total_price: Some(items.iter().map(|i| i.price.times(i.quantity)).sum::<Price>()),
            created_at: None,
            order_items: Vec::new(),
        })
    }
}
