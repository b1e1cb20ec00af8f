//! Cart commands.
//!
//! Every command reports the outcome and the resulting totals. Stock limits
//! and unknown products are reported, not treated as failures.

use krisha_core::{CartItemInput, ProductId};
use krisha_storefront::cart::{AddOutcome, CartStore, CartSummary, QuantityOutcome};
use krisha_storefront::storage::KeyValueStore;

/// Print every line and the totals.
pub fn show<S: KeyValueStore>(cart: &CartStore<S>) {
    let summary = CartSummary::from(cart);
    if summary.items.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    for line in &summary.items {
        tracing::info!(
            "{}  {} x{} @ {} = {} (stock {})",
            line.product_id,
            line.name,
            line.quantity,
            line.price,
            line.line_price,
            line.stock
        );
    }
    tracing::info!("{} items, subtotal {}", summary.item_count, summary.subtotal);
}

/// Add one unit of a product.
pub fn add<S: KeyValueStore>(cart: &mut CartStore<S>, input: CartItemInput) {
    let product_id = input.product_id.clone();
    match cart.add_item(input) {
        AddOutcome::Inserted => tracing::info!("Added {product_id} to cart"),
        AddOutcome::Incremented => tracing::info!("Added another {product_id}"),
        AddOutcome::AtStockLimit => {
            tracing::warn!("{product_id} is already at its stock limit");
        }
        AddOutcome::OutOfStock => tracing::warn!("{product_id} is out of stock"),
    }
    show(cart);
}

/// Set a line quantity.
pub fn set<S: KeyValueStore>(cart: &mut CartStore<S>, product_id: &ProductId, quantity: i64) {
    match cart.update_quantity(product_id, quantity) {
        QuantityOutcome::Set {
            quantity,
            clamped: true,
        } => tracing::warn!("{product_id} limited to {quantity} by stock"),
        QuantityOutcome::Set { quantity, .. } => {
            tracing::info!("{product_id} quantity set to {quantity}");
        }
        QuantityOutcome::Removed => tracing::info!("Removed {product_id} from cart"),
        QuantityOutcome::NotInCart => tracing::warn!("{product_id} is not in the cart"),
    }
    show(cart);
}

/// Remove a line.
pub fn remove<S: KeyValueStore>(cart: &mut CartStore<S>, product_id: &ProductId) {
    if cart.remove_item(product_id) {
        tracing::info!("Removed {product_id} from cart");
    } else {
        tracing::info!("{product_id} was not in the cart");
    }
    show(cart);
}

/// Remove every line.
pub fn clear<S: KeyValueStore>(cart: &mut CartStore<S>) {
    cart.clear_cart();
    tracing::info!("Cart cleared");
}
