//! Cartwheel Client - Session and cart state for the storefront.
//!
//! This crate is the client-state layer between the presentation code (the
//! `cw` CLI, or any other front end) and the storefront backend:
//!
//! - [`session::SessionStore`] - the signed-in identity (profile + bearer
//!   token), re-validated against the backend and torn down when the backend
//!   rejects the token
//! - [`cart::CartStore`] - the device cart, usable while signed out
//! - [`checkout::Checkout`] - the payment-provider handoff and order creation
//!   on return
//! - [`storage`] - durable key-value mirrors with read precedence and
//!   write-to-all semantics
//! - [`api`] - the HTTP client for the backend
//!
//! # Architecture
//!
//! The backend is the system of record. Persisted state is a best-effort
//! mirror: once a store has hydrated, its in-memory value is authoritative
//! and storage failures are logged, never returned. Stores are plain values
//! that callers construct and pass around; there are no globals.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ClientConfig::from_env()?;
//! let api = Arc::new(HttpApiClient::new(&config)?);
//! let storage = MirroredStore::from_config(&config);
//!
//! let session = SessionStore::new(api.clone(), storage.clone(), config.refresh_policy);
//! let cart = CartStore::new(storage.clone());
//! tokio::join!(session.hydrate(), cart.hydrate());
//!
//! cart.add_to_cart(&product).await;
//! session.login("shopper@example.com", &password).await?;
//! let redirect = Checkout::new(api.as_ref(), &session, &cart, &storage).begin().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, HttpApiClient, StoreApi};
pub use cart::{Cart, CartLine, CartStore};
pub use checkout::{Checkout, CheckoutOutcome, NotSavedReason};
pub use config::{ClientConfig, ConfigError, Platform, RefreshPolicy};
pub use error::{Error, Result, ValidationError};
pub use session::{SessionState, SessionStore};
pub use storage::{FileMirror, KeyValueMirror, MemoryMirror, MirroredStore, StorageError};
