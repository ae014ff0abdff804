//! Cart store: the device cart.
//!
//! The cart works signed out and lives only on the device until checkout.
//! Lines keep insertion order, hold at most one entry per product, and always
//! have a quantity of at least 1. Totals are computed on read.

use std::collections::HashSet;

use cartwheel_core::{Price, ProductId};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

use crate::error::{Result, ValidationError};
use crate::models::{CheckoutItem, Product};
use crate::storage::{MirroredStore, keys};

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// One product in the cart.
///
/// Name, price, and image are captured when the product is first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(rename = "id", alias = "productId")]
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    /// Price of the line: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Ordered cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Build a cart from lines, rejecting duplicates and quantities outside
    /// `1..=MAX_LINE_QUANTITY`.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Option<Self> {
        let mut seen = HashSet::with_capacity(lines.len());
        let valid = lines.iter().all(|line| {
            (1..=MAX_LINE_QUANTITY).contains(&line.quantity) && seen.insert(line.product_id)
        });
        valid.then_some(Self { lines })
    }

    /// Parse persisted cart JSON.
    fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Vec<CartLine>>(raw) {
            Ok(lines) => {
                let cart = Self::from_lines(lines);
                if cart.is_none() {
                    warn!("Stored cart has duplicate or out-of-range lines, ignoring it");
                }
                cart
            }
            Err(e) => {
                warn!(error = %e, "Stored cart is malformed, ignoring it");
                None
            }
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of price times quantity over every line.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in the shape the checkout and order endpoints take.
    #[must_use]
    pub fn checkout_items(&self) -> Vec<CheckoutItem> {
        self.lines
            .iter()
            .map(|line| CheckoutItem {
                product_id: line.product_id,
                name: line.name.clone(),
                price: line.price,
                quantity: line.quantity,
            })
            .collect()
    }

    fn add(&mut self, product: &Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = line.quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
        } else {
            self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                image_url: product.image_url.clone(),
                quantity: 1,
            });
        }
    }

    fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }
}

/// Owner of the device cart.
///
/// Every mutation runs under a single write lock and is persisted to every
/// storage mirror before it returns. Storage failures are logged only.
pub struct CartStore {
    storage: MirroredStore,
    state: watch::Sender<Cart>,
    write_lock: Mutex<()>,
}

impl CartStore {
    /// Create a store holding an empty cart.
    #[must_use]
    pub fn new(storage: MirroredStore) -> Self {
        let (state, _) = watch::channel(Cart::default());
        Self {
            storage,
            state,
            write_lock: Mutex::new(()),
        }
    }

    /// Load the persisted cart. Anything unreadable yields an empty cart.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) {
        let _guard = self.write_lock.lock().await;
        let cart = self.load().await.unwrap_or_default();
        debug!(lines = cart.lines().len(), "Hydrated cart");
        self.state.send_replace(cart);
    }

    /// Add one unit of a product.
    #[instrument(skip_all, fields(product_id = %product.id))]
    pub async fn add_to_cart(&self, product: &Product) {
        let _guard = self.write_lock.lock().await;
        self.state.send_modify(|cart| cart.add(product));
        self.persist().await;
    }

    /// Drop a product's line. Missing products are ignored.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, product_id: ProductId) {
        let _guard = self.write_lock.lock().await;
        if self.state.send_if_modified(|cart| cart.remove(product_id)) {
            self.persist().await;
        }
    }

    /// Set a line's quantity.
    ///
    /// Quantities below 1 are rejected and leave the cart unchanged; use
    /// [`CartStore::remove_from_cart`] to drop a line. Missing products are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a quantity below 1 or above
    /// [`MAX_LINE_QUANTITY`].
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, product_id: ProductId, quantity: i64) -> Result<()> {
        if quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity(quantity).into());
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_LINE_QUANTITY)
            .ok_or(ValidationError::QuantityTooLarge(quantity))?;

        let _guard = self.write_lock.lock().await;
        if self
            .state
            .send_if_modified(|cart| cart.set_quantity(product_id, quantity))
        {
            self.persist().await;
        }
        Ok(())
    }

    /// Empty the cart and drop it from storage, abandoning any pending
    /// checkout along with it.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) {
        let _guard = self.write_lock.lock().await;
        self.state.send_replace(Cart::default());
        self.storage.remove(&[keys::CART, keys::CHECKOUT]).await;
    }

    /// Current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.state.borrow().clone()
    }

    /// Watch for cart changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.state.borrow().lines().to_vec()
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.state.borrow().total()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.state.borrow().item_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    #[must_use]
    pub fn checkout_items(&self) -> Vec<CheckoutItem> {
        self.state.borrow().checkout_items()
    }

    /// Re-read the persisted cart, ignoring the in-memory one.
    pub async fn stored_lines(&self) -> Option<Vec<CartLine>> {
        self.load().await.map(|cart| cart.lines)
    }

    async fn load(&self) -> Option<Cart> {
        Cart::parse(&self.storage.read(keys::CART).await?)
    }

    async fn persist(&self) {
        let lines = self.state.borrow().lines.clone();
        self.storage.write_json(keys::CART, &lines).await;
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &*self.state.borrow())
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}
