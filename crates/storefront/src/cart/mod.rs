//! Client-side cart store.
//!
//! Holds the ordered cart lines, enforces the per-line stock ceiling, and
//! mirrors every mutation into durable storage under [`CART_STORAGE_KEY`].
//! The cart never talks to the network.
//!
//! # Example
//!
//! ```rust
//! use krisha_core::{CartItemInput, Price, ProductId};
//! use krisha_storefront::cart::{AddOutcome, CartStore};
//! use krisha_storefront::storage::MemoryStore;
//!
//! let mut cart = CartStore::hydrate(MemoryStore::new());
//! let input = CartItemInput {
//!     product_id: ProductId::new("p1"),
//!     name: "Brass Diya".to_string(),
//!     price: Price::from_minor(1250).unwrap(),
//!     image: None,
//!     stock: 1,
//! };
//!
//! assert_eq!(cart.add_item(input.clone()), AddOutcome::Inserted);
//! assert_eq!(cart.add_item(input), AddOutcome::AtStockLimit);
//! assert_eq!(cart.total_items(), 1);
//! ```

mod view;

pub use view::{CartLineView, CartSummary};

use std::collections::HashSet;

use krisha_core::{CartItem, CartItemInput, Price, ProductId};
use serde_json::Value;
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageError};

/// Durable storage key holding the serialized cart lines.
pub const CART_STORAGE_KEY: &str = "krisha-cart";

/// Result of [`CartStore::add_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created with quantity 1.
    Inserted,
    /// An existing line gained one unit.
    Incremented,
    /// The line was already at its stock ceiling; nothing changed.
    AtStockLimit,
    /// The product has no stock; no line was created.
    OutOfStock,
}

impl AddOutcome {
    /// Whether the cart contents changed.
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::Inserted | Self::Incremented)
    }
}

/// Result of [`CartStore::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityOutcome {
    /// The line quantity was set. `clamped` is true when the request
    /// exceeded stock and was capped.
    Set { quantity: u32, clamped: bool },
    /// The requested quantity was zero or below and the line was removed.
    Removed,
    /// No line exists for the product.
    NotInCart,
}

/// The cart.
///
/// Constructed once per browsing context via [`CartStore::hydrate`] and owned
/// by the application; there is no global instance.
#[derive(Debug)]
pub struct CartStore<S: KeyValueStore> {
    items: Vec<CartItem>,
    open: bool,
    storage: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Build a cart from whatever is persisted in `storage`.
    ///
    /// A missing or unreadable value yields an empty cart. Persisted lines
    /// that break the cart invariants are repaired and written back.
    pub fn hydrate(storage: S) -> Self {
        let raw = match storage.get(CART_STORAGE_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart, starting empty");
                None
            }
        };

        let (items, repaired) = raw.as_deref().map_or_else(|| (Vec::new(), false), decode_lines);
        debug!(lines = items.len(), repaired, "Hydrated cart");

        let cart = Self {
            items,
            open: false,
            storage,
        };
        if repaired {
            cart.persist();
        }
        cart
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Whether the cart has a line for `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of a product.
    ///
    /// Inserts a new line at quantity 1, or increments an existing line if it
    /// is below its stock ceiling. At the ceiling the call changes nothing.
    pub fn add_item(&mut self, input: CartItemInput) -> AddOutcome {
        let outcome = match self.position(&input.product_id) {
            Some(index) => match self.items.get_mut(index) {
                Some(item) if item.can_increment() => {
                    item.quantity += 1;
                    AddOutcome::Incremented
                }
                _ => AddOutcome::AtStockLimit,
            },
            None if input.stock == 0 => AddOutcome::OutOfStock,
            None => {
                self.items.push(CartItem::from_input(input));
                AddOutcome::Inserted
            }
        };

        debug!(?outcome, "Cart add");
        self.persist();
        outcome
    }

    /// Remove the line for `product_id`.
    ///
    /// Returns whether a line was removed; removing an absent product is a
    /// no-op.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        let removed = self.items.len() != before;

        debug!(%product_id, removed, "Cart remove");
        self.persist();
        removed
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero or below removes the line. A quantity above stock
    /// is clamped to stock.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> QuantityOutcome {
        if quantity <= 0 {
            return if self.remove_item(product_id) {
                QuantityOutcome::Removed
            } else {
                QuantityOutcome::NotInCart
            };
        }

        let outcome = match self
            .items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
        {
            Some(item) => {
                let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
                let clamped = requested > item.stock;
                item.quantity = requested.min(item.stock);
                QuantityOutcome::Set {
                    quantity: item.quantity,
                    clamped,
                }
            }
            None => QuantityOutcome::NotInCart,
        };

        debug!(%product_id, ?outcome, "Cart update quantity");
        self.persist();
        outcome
    }

    /// Remove every line.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        debug!("Cart cleared");
        self.persist();
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price * quantity` over all lines, saturating rather than
    /// overflowing.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Whether the cart panel is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Open or close the cart panel. Does not touch cart contents.
    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Write the current lines to storage, reporting any failure.
    ///
    /// Mutations already persist on their own; call this at teardown when the
    /// caller needs to know the final write landed.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines cannot be serialized or written.
    pub fn flush(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.items)?;
        self.storage.set(CART_STORAGE_KEY, &json)
    }

    /// The underlying storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| &item.product_id == product_id)
    }

    // Fire-and-forget: a failed write leaves memory ahead of storage.
    fn persist(&self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

/// Decode persisted lines, returning the lines and whether any repair was
/// needed.
fn decode_lines(raw: &str) -> (Vec<CartItem>, bool) {
    let values = match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(error = %e, "Persisted cart is corrupt, starting empty");
            return (Vec::new(), true);
        }
    };

    let total = values.len();
    let mut seen = HashSet::new();
    let mut repaired = false;
    let mut items = Vec::with_capacity(total);

    for value in values {
        let Ok(mut item) = serde_json::from_value::<CartItem>(value) else {
            repaired = true;
            continue;
        };
        if item.stock == 0 || item.quantity == 0 || !seen.insert(item.product_id.clone()) {
            repaired = true;
            continue;
        }
        if item.quantity > item.stock {
            item.quantity = item.stock;
            repaired = true;
        }
        items.push(item);
    }

    if repaired {
        warn!(kept = items.len(), total, "Repaired persisted cart lines");
    }
    (items, repaired)
}
