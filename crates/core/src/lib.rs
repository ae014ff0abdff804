//! Cartwheel Core - Shared domain types.
//!
//! This crate provides the types shared by every Cartwheel component:
//! - `client` - Session and cart state stores plus the backend API client
//! - `cli` - Command-line storefront built on the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. Everything here mirrors the backend's wire shapes so it can be
//! used from any runtime target.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, roles, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
