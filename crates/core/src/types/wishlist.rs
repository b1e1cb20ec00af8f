//! Wishlist entry types as returned by the wishlist service.

use serde::{Deserialize, Serialize};

use crate::types::id::{ProductId, UserId, WishlistEntryId};
use crate::types::price::Price;

/// Catalog data denormalized into a wishlist entry at sync time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price at sync time.
    pub price: Price,
    /// Primary image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Units available at sync time.
    #[serde(default)]
    pub stock: u32,
}

/// One product on a user's wishlist.
///
/// The service guarantees at most one entry per `(user_id, product_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    /// Service-assigned entry ID.
    pub id: WishlistEntryId,
    /// Owner of the entry.
    pub user_id: UserId,
    /// Wishlisted product.
    pub product_id: ProductId,
    /// Product data captured by the service.
    pub product: ProductSnapshot,
}
