//! Display-ready cart summaries.

use krisha_core::CartItem;

use super::CartStore;
use crate::storage::KeyValueStore;

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub stock: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub items: Vec<CartLineView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartSummary {
    /// Summary of an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "0.00".to_string(),
            item_count: 0,
        }
    }
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            quantity: item.quantity,
            stock: item.stock,
            price: item.price.to_string(),
            line_price: item.line_total().to_string(),
            image: item.image.clone(),
        }
    }
}

impl<S: KeyValueStore> From<&CartStore<S>> for CartSummary {
    fn from(cart: &CartStore<S>) -> Self {
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            subtotal: cart.total_price().to_string(),
            item_count: cart.total_items(),
        }
    }
}
