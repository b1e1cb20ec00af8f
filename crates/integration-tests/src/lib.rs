//! Integration tests for Krisha.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p krisha-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - cart behavior across reloads of durable storage
//! - `wishlist_session` - wishlist reconciliation across session changes
//!
//! This library holds the shared fixtures: catalog builders and
//! [`ScriptedWishlist`], an in-process stand-in for the wishlist service.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use krisha_core::{
    CartItemInput, Price, ProductId, ProductSnapshot, UserId, WishlistEntry, WishlistEntryId,
};
use krisha_storefront::session::SessionToken;
use krisha_storefront::wishlist::{WishlistApi, WishlistError};
use tokio::sync::{mpsc, oneshot};

/// A catalog product offered to the cart.
#[must_use]
pub fn product(id: &str, minor: i64, stock: u32) -> CartItemInput {
    CartItemInput {
        product_id: ProductId::new(id),
        name: format!("Product {id}"),
        price: Price::from_minor(minor).unwrap(),
        image: Some(format!("/images/{id}.jpg")),
        stock,
    }
}

/// A wishlist entry owned by `user`.
#[must_use]
pub fn entry(user: &str, product: &str) -> WishlistEntry {
    WishlistEntry {
        id: WishlistEntryId::new(format!("{user}:{product}")),
        user_id: UserId::new(user),
        product_id: ProductId::new(product),
        product: ProductSnapshot {
            id: ProductId::new(product),
            name: format!("Product {product}"),
            price: Price::from_minor(2500).unwrap(),
            image: None,
            stock: 10,
        },
    }
}

/// A call observed by [`ScriptedWishlist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Add(String, ProductId),
    Remove(String, ProductId),
}

/// In-process wishlist service keyed by session token.
///
/// Each token is its own user. `list` for a token can be held back with
/// [`ScriptedWishlist::hold_list`] so tests can interleave responses.
pub struct ScriptedWishlist {
    users: Mutex<HashMap<String, Vec<WishlistEntry>>>,
    holds: Mutex<HashMap<String, VecDeque<oneshot::Receiver<()>>>>,
    calls: mpsc::UnboundedSender<Call>,
    failing: AtomicBool,
}

impl ScriptedWishlist {
    /// A service with no users, plus the receiver of its call log.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Call>) {
        let (calls, rx) = mpsc::unbounded_channel();
        let service = Self {
            users: Mutex::new(HashMap::new()),
            holds: Mutex::new(HashMap::new()),
            calls,
            failing: AtomicBool::new(false),
        };
        (service, rx)
    }

    /// Seed the wishlist of the user behind `token`.
    #[must_use]
    pub fn with_user(self, token: &str, products: &[&str]) -> Self {
        let entries = products.iter().map(|p| entry(token, p)).collect();
        self.users.lock().unwrap().insert(token.to_string(), entries);
        self
    }

    /// Hold the next `list` for `token` until the returned sender fires.
    pub fn hold_list(&self, token: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds
            .lock()
            .unwrap()
            .entry(token.to_string())
            .or_default()
            .push_back(rx);
        tx
    }

    /// Make every following call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Server-side product IDs for `token`.
    #[must_use]
    pub fn server_products(&self, token: &str) -> Vec<ProductId> {
        self.users
            .lock()
            .unwrap()
            .get(token)
            .map(|entries| entries.iter().map(|e| e.product_id.clone()).collect())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), WishlistError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(WishlistError::Status {
                status: 503,
                body: "scripted outage".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl WishlistApi for ScriptedWishlist {
    async fn list(&self, token: &SessionToken) -> Result<Vec<WishlistEntry>, WishlistError> {
        let token = token.expose().to_string();
        let _ = self.calls.send(Call::List(token.clone()));

        let hold = self
            .holds
            .lock()
            .unwrap()
            .get_mut(&token)
            .and_then(VecDeque::pop_front);
        if let Some(hold) = hold {
            let _ = hold.await;
        }

        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&token)
            .cloned()
            .unwrap_or_default())
    }

    async fn add(&self, token: &SessionToken, product_id: &ProductId) -> Result<(), WishlistError> {
        let token = token.expose().to_string();
        let _ = self.calls.send(Call::Add(token.clone(), product_id.clone()));
        self.check()?;

        let mut users = self.users.lock().unwrap();
        let entries = users.entry(token.clone()).or_default();
        if !entries.iter().any(|e| &e.product_id == product_id) {
            entries.push(entry(&token, product_id.as_str()));
        }
        Ok(())
    }

    async fn remove(
        &self,
        token: &SessionToken,
        product_id: &ProductId,
    ) -> Result<(), WishlistError> {
        let token = token.expose().to_string();
        let _ = self
            .calls
            .send(Call::Remove(token.clone(), product_id.clone()));
        self.check()?;

        if let Some(entries) = self.users.lock().unwrap().get_mut(&token) {
            entries.retain(|e| &e.product_id != product_id);
        }
        Ok(())
    }
}

/// Poll `condition` until it holds, panicking after two seconds.
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    let deadline = tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    });
    assert!(deadline.await.is_ok(), "condition not reached in time");
}

/// Run `future` with a two-second ceiling.
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .unwrap()
}
