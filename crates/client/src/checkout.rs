//! Payment-provider handoff and order creation on return.
//!
//! Checkout leaves the app: [`Checkout::begin`] creates a provider session and
//! hands back its URL, and the process may be gone by the time the shopper
//! comes back. [`Checkout::complete`] therefore rebuilds everything it needs
//! from storage (the session, then the cart lines, then the pending checkout
//! record written by `begin`) before recording the order.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, StoreApi};
use crate::cart::CartStore;
use crate::error::{Error, Result, ValidationError};
use crate::models::{CheckoutItem, CheckoutRedirect, Order, PendingCheckout};
use crate::session::SessionStore;
use crate::storage::{MirroredStore, keys};

/// Result of returning from the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The order was recorded and the cart cleared.
    OrderSaved(Order),
    /// Payment went through but no order was recorded. Not retried.
    NotSaved(NotSavedReason),
}

impl CheckoutOutcome {
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::OrderSaved(_))
    }
}

/// Why an order was not recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotSavedReason {
    /// No usable session survived the redirect.
    NoSession,
    /// No cart lines survived the redirect.
    NoItems,
    /// The backend refused the order; carries its message.
    OrderRejected(String),
}

/// One checkout attempt over the session and cart stores.
pub struct Checkout<'a> {
    api: &'a dyn StoreApi,
    session: &'a SessionStore,
    cart: &'a CartStore,
    storage: &'a MirroredStore,
}

impl<'a> Checkout<'a> {
    #[must_use]
    pub fn new(
        api: &'a dyn StoreApi,
        session: &'a SessionStore,
        cart: &'a CartStore,
        storage: &'a MirroredStore,
    ) -> Self {
        Self {
            api,
            session,
            cart,
            storage,
        }
    }

    /// Start a provider checkout for the current cart.
    ///
    /// Re-validates the session first, then records a pending checkout so the
    /// return path can recover the line items.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCart`] or [`Error::NotAuthenticated`]
    /// without touching any state, otherwise the backend's error.
    #[instrument(skip(self))]
    pub async fn begin(&self) -> Result<CheckoutRedirect> {
        let items = self.cart.checkout_items();
        if items.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }
        if !self.session.is_authenticated() {
            return Err(Error::NotAuthenticated);
        }

        self.session.refresh_profile(None).await;
        let token = self.session.token().ok_or(Error::NotAuthenticated)?;

        let redirect = self.api.create_checkout_session(&token, &items).await?;
        if redirect.url.trim().is_empty() {
            return Err(Error::Api(ApiError::Decode(
                "checkout session has no redirect URL".to_string(),
            )));
        }

        let pending = PendingCheckout {
            session_id: redirect.session_id.clone(),
            items,
            created_at: Utc::now(),
        };
        self.storage.write_json(keys::CHECKOUT, &pending).await;

        info!(
            session_id = ?redirect.session_id,
            lines = pending.items.len(),
            "Started checkout"
        );
        Ok(redirect)
    }

    /// Record the order after the provider reports a successful payment.
    ///
    /// The order holds the lines captured by [`Checkout::begin`]; the stored
    /// cart is used only when no pending record exists. The cart is cleared
    /// only when the order is saved.
    #[instrument(skip(self))]
    pub async fn complete(&self) -> CheckoutOutcome {
        if !self.session.is_authenticated() {
            self.session.hydrate().await;
        }
        let Some(token) = self.session.token() else {
            warn!("Payment confirmed but no session survived, order not saved");
            return CheckoutOutcome::NotSaved(NotSavedReason::NoSession);
        };

        let items = self.recover_items().await;
        if items.is_empty() {
            warn!("Payment confirmed but no cart lines survived, order not saved");
            return CheckoutOutcome::NotSaved(NotSavedReason::NoItems);
        }

        match self.api.create_order(&token, &items).await {
            Ok(order) => {
                self.cart.clear_cart().await;
                info!(order_id = %order.id, "Order recorded");
                CheckoutOutcome::OrderSaved(order)
            }
            Err(e) => {
                warn!(error = %e, "Payment confirmed but order creation failed");
                CheckoutOutcome::NotSaved(NotSavedReason::OrderRejected(e.to_string()))
            }
        }
    }

    async fn recover_items(&self) -> Vec<CheckoutItem> {
        if let Some(pending) = self.pending().await {
            debug!(lines = pending.items.len(), "Using lines from pending checkout");
            return pending.items;
        }

        self.cart
            .stored_lines()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|line| CheckoutItem {
                product_id: line.product_id,
                name: line.name,
                price: line.price,
                quantity: line.quantity,
            })
            .collect()
    }

    async fn pending(&self) -> Option<PendingCheckout> {
        let raw = self.storage.read(keys::CHECKOUT).await?;
        match serde_json::from_str::<PendingCheckout>(&raw) {
            Ok(pending) if !pending.items.is_empty() => Some(pending),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Pending checkout record is malformed");
                None
            }
        }
    }
}

impl std::fmt::Debug for Checkout<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout")
            .field("session", self.session)
            .field("cart", self.cart)
            .finish_non_exhaustive()
    }
}
