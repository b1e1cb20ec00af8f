//! Cart line types.
//!
//! These are the records persisted under the cart's durable storage key, so
//! field names follow the stored camelCase JSON shape.

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::price::Price;

/// A product as presented to the cart by the catalog UI.
///
/// Carries everything a [`CartItem`] needs except the quantity, which the
/// cart owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    /// Catalog product ID.
    pub product_id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Primary image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Units currently available; the ceiling for the line quantity.
    pub stock: u32,
}

/// A single line in the cart.
///
/// Invariant (maintained by the cart store): `1 <= quantity <= stock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Catalog product ID, unique within a cart.
    pub product_id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Primary image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Units available when the line was last touched.
    pub stock: u32,
    /// Units in the cart.
    pub quantity: u32,
}

impl CartItem {
    /// Start a new line with a single unit.
    #[must_use]
    pub fn from_input(input: CartItemInput) -> Self {
        Self {
            product_id: input.product_id,
            name: input.name,
            price: input.price,
            image: input.image,
            stock: input.stock,
            quantity: 1,
        }
    }

    /// Whether another unit may be added without exceeding stock.
    #[must_use]
    pub const fn can_increment(&self) -> bool {
        self.quantity < self.stock
    }

    /// `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}
