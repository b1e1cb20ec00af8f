//! Application state: the cart and wishlist stores, built once at start-up.
//!
//! Whatever drives the UI owns a single [`Storefront`] and hands out
//! references to its stores; there is no ambient global to look up.

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cart::CartStore;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::session::AuthSession;
use crate::storage::{FileStore, KeyValueStore, StorageError};
use crate::wishlist::{HttpWishlistClient, WishlistApi, WishlistStore};

/// The client-side stores of one browsing context.
pub struct Storefront<S: KeyValueStore, A: WishlistApi> {
    cart: CartStore<S>,
    wishlist: WishlistStore<A>,
    session: AuthSession,
    watcher: Option<JoinHandle<()>>,
}

impl<S: KeyValueStore, A: WishlistApi + 'static> Storefront<S, A> {
    /// Hydrate the cart and build a wishlist store that is not yet following
    /// the session.
    ///
    /// Use [`Storefront::start`] inside a Tokio runtime to also follow
    /// session changes.
    #[must_use]
    pub fn new(storage: S, session: AuthSession, api: A) -> Self {
        Self {
            cart: CartStore::hydrate(storage),
            wishlist: WishlistStore::new(api),
            session,
            watcher: None,
        }
    }

    /// Build the stores and start following `session`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(storage: S, session: AuthSession, api: A) -> Self {
        let mut storefront = Self::new(storage, session, api);
        storefront.watcher = Some(
            storefront
                .wishlist
                .spawn_session_watcher(&storefront.session),
        );
        info!(
            cart_lines = storefront.cart.len(),
            signed_in = storefront.session.is_active(),
            "Storefront started"
        );
        storefront
    }

    /// The cart.
    #[must_use]
    pub const fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    /// The cart, for mutation.
    pub const fn cart_mut(&mut self) -> &mut CartStore<S> {
        &mut self.cart
    }

    /// The wishlist.
    #[must_use]
    pub const fn wishlist(&self) -> &WishlistStore<A> {
        &self.wishlist
    }

    /// The authentication session.
    #[must_use]
    pub const fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Whether the wishlist is following the session.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.watcher.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop following the session and flush the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the final cart write fails.
    pub fn shutdown(mut self) -> Result<(), StorageError> {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        self.cart.flush()?;
        debug!("Storefront shut down");
        Ok(())
    }
}

impl Storefront<FileStore, HttpWishlistClient> {
    /// Build the stores from configuration: a file store under the data
    /// directory and the HTTP wishlist client. Does not follow the session;
    /// call [`WishlistStore::sync_session`] or use [`Storefront::start`].
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be opened or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let storage = FileStore::open(&config.data_dir)?;
        let api = HttpWishlistClient::new(&config.wishlist)?;
        let session = AuthSession::new(config.session());
        Ok(Self::new(storage, session, api))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use krisha_core::{CartItemInput, Price, ProductId, WishlistEntry};

    use super::*;
    use crate::cart::CART_STORAGE_KEY;
    use crate::session::SessionToken;
    use crate::storage::MemoryStore;
    use crate::wishlist::WishlistError;

    struct EmptyApi;

    impl WishlistApi for EmptyApi {
        async fn list(&self, _token: &SessionToken) -> Result<Vec<WishlistEntry>, WishlistError> {
            Ok(Vec::new())
        }

        async fn add(&self, _token: &SessionToken, _id: &ProductId) -> Result<(), WishlistError> {
            Ok(())
        }

        async fn remove(
            &self,
            _token: &SessionToken,
            _id: &ProductId,
        ) -> Result<(), WishlistError> {
            Ok(())
        }
    }

    #[test]
    fn test_new_hydrates_cart() {
        let storage = MemoryStore::new();
        storage
            .set(
                CART_STORAGE_KEY,
                r#"[{"productId":"p1","name":"A","price":3,"stock":4,"quantity":2}]"#,
            )
            .unwrap();

        let storefront = Storefront::new(storage, AuthSession::signed_out(), EmptyApi);
        assert_eq!(storefront.cart().total_items(), 2);
        assert!(!storefront.is_watching());
    }

    #[tokio::test]
    async fn test_shutdown_flushes_and_stops_watcher() {
        let storage = MemoryStore::new();
        let mut storefront =
            Storefront::start(storage.clone(), AuthSession::signed_out(), EmptyApi);
        assert!(storefront.is_watching());

        storefront.cart_mut().add_item(CartItemInput {
            product_id: ProductId::new("p1"),
            name: "A".to_string(),
            price: Price::from_minor(300).unwrap(),
            image: None,
            stock: 4,
        });
        storage.remove(CART_STORAGE_KEY).unwrap();

        storefront.shutdown().unwrap();
        assert!(storage.get(CART_STORAGE_KEY).unwrap().is_some());
    }
}
