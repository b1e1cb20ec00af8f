//! Wishlist commands.
//!
//! # Environment Variables
//!
//! - `KRISHA_SESSION_TOKEN` - required; without it every command reports
//!   that nobody is signed in
//! - `KRISHA_API_BASE_URL` - wishlist service location

use krisha_core::ProductId;
use krisha_storefront::storage::KeyValueStore;
use krisha_storefront::wishlist::{
    HttpWishlistClient, LoadOutcome, WishlistError, WishlistOutcome, WishlistStore,
};
use krisha_storefront::Storefront;

/// Load the wishlist for the configured session.
pub async fn sign_in<S: KeyValueStore>(
    storefront: &Storefront<S, HttpWishlistClient>,
) -> Result<(), WishlistError> {
    let token = storefront.session().token();
    match storefront.wishlist().sync_session(token).await? {
        LoadOutcome::Applied(count) => tracing::debug!(count, "Wishlist loaded"),
        LoadOutcome::Cleared => {
            tracing::warn!("Not signed in; set KRISHA_SESSION_TOKEN to use the wishlist");
        }
        LoadOutcome::Stale => {}
    }
    Ok(())
}

/// Print the wishlist.
pub fn list(wishlist: &WishlistStore<HttpWishlistClient>) {
    let entries = wishlist.entries();
    if entries.is_empty() {
        tracing::info!("Wishlist is empty");
        return;
    }

    for entry in &entries {
        tracing::info!(
            "{}  {} @ {}",
            entry.product_id,
            entry.product.name,
            entry.product.price
        );
    }
    tracing::info!("{} products", entries.len());
}

/// Add a product.
pub async fn add(
    wishlist: &WishlistStore<HttpWishlistClient>,
    product_id: &ProductId,
) -> Result<(), WishlistError> {
    report(product_id, "added", wishlist.add(product_id).await?);
    Ok(())
}

/// Remove a product.
pub async fn remove(
    wishlist: &WishlistStore<HttpWishlistClient>,
    product_id: &ProductId,
) -> Result<(), WishlistError> {
    report(product_id, "removed", wishlist.remove(product_id).await?);
    Ok(())
}

fn report(product_id: &ProductId, verb: &str, outcome: WishlistOutcome) {
    match outcome {
        WishlistOutcome::Applied => tracing::info!("{product_id} {verb}"),
        WishlistOutcome::Unchanged => tracing::info!("{product_id} already {verb}"),
        WishlistOutcome::NoSession => tracing::warn!("Not signed in; nothing {verb}"),
        WishlistOutcome::Superseded => {
            tracing::warn!("Session changed before {product_id} was {verb}");
        }
    }
}
