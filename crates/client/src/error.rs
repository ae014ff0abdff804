//! Unified error handling for store operations.
//!
//! Every fallible store operation returns [`Result<T>`]. Storage failures
//! never appear here: mirrors are best-effort and the stores log and swallow
//! them.

use cartwheel_core::EmailError;
use thiserror::Error;

use crate::api::ApiError;

/// Error returned by session, cart, and checkout operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Client-side precondition failed; nothing was sent to the backend.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The backend rejected the credentials or the bearer token.
    ///
    /// Carries the backend's response body verbatim.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The operation needs a signed-in session and there is none.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Transport failure, timeout, or any other backend rejection.
    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(message) | ApiError::Forbidden(message) => Self::Auth(message),
            other => Self::Api(other),
        }
    }
}

/// Client-side precondition failures, detected before any I/O.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("{0} is required")]
    Required(&'static str),

    /// The email address is malformed.
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),

    /// Cart quantities start at 1; removal goes through `remove_from_cart`.
    #[error("quantity must be at least 1 (got {0})")]
    NonPositiveQuantity(i64),

    /// Quantity does not fit a cart line.
    #[error("quantity {0} is too large")]
    QuantityTooLarge(i64),

    /// Checkout needs at least one cart line.
    #[error("cart is empty")]
    EmptyCart,

    /// Review ratings are whole stars.
    #[error("rating must be between 1 and 5 (got {0})")]
    Rating(u8),
}

/// Result type alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Reject empty or whitespace-only required fields.
pub(crate) fn require(field: &'static str, value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}
