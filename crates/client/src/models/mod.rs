//! Wire and persisted data shapes.
//!
//! These mirror what the backend sends and what the stores persist. Unknown
//! fields from the backend are ignored.

pub mod catalog;
pub mod order;
pub mod user;

pub use catalog::{Product, ProductFilter, ProductInput, Review, ReviewAuthor};
pub use order::{CheckoutItem, CheckoutRedirect, Order, OrderItem, PendingCheckout};
pub use user::{AuthSession, BearerToken, ProfileUpdate, Registration, User};
