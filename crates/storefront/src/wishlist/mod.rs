//! Wishlist store mirrored from the remote wishlist authority.
//!
//! # Consistency
//!
//! The service is the source of truth; the local entry set is a best-effort
//! mirror that is replaced wholesale by every applied load.
//!
//! Loads are asynchronous and the session can change while one is in flight.
//! Each load captures a [`Generation`] when it starts and is applied only if
//! that generation is still current when the response arrives. Stale
//! responses are dropped, never aborted: the request runs to completion and
//! its result is discarded.
//!
//! Mutations capture the session epoch instead. A mutation whose session
//! ended while its remote call was in flight leaves local state alone; the
//! new session's load is authoritative.

mod api;
mod http;

pub use api::{WishlistApi, WishlistError};
pub use http::HttpWishlistClient;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use krisha_core::{ProductId, WishlistEntry};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::session::{AuthSession, Generation, SessionToken};

/// Result of applying a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response replaced the local set; carries the new entry count.
    Applied(usize),
    /// There is no session, so the set was emptied without a request.
    Cleared,
    /// A newer load started before this one finished; the response was
    /// discarded.
    Stale,
}

/// Result of a wishlist mutation that reached no error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistOutcome {
    /// Nobody is signed in; no request was made.
    NoSession,
    /// The service accepted the change and the local set reflects it.
    Applied,
    /// The service accepted the call but the local set already matched.
    Unchanged,
    /// The session changed while the call was in flight; local state was
    /// left to the new session's load.
    Superseded,
}

/// A load that has been started and not yet applied.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: Generation,
    token: SessionToken,
}

impl LoadTicket {
    /// Generation captured when the load started.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }
}

#[derive(Debug, Default)]
struct WishlistState {
    entries: Vec<WishlistEntry>,
    loading: bool,
    token: Option<SessionToken>,
    /// Bumped by every load start and session change.
    generation: Generation,
    /// Bumped by session changes only.
    epoch: Generation,
}

/// The wishlist store.
///
/// Cheaply cloneable; clones share state. Construct once at start-up and
/// pass it to whatever needs it.
pub struct WishlistStore<A> {
    inner: Arc<Shared<A>>,
}

struct Shared<A> {
    api: A,
    state: RwLock<WishlistState>,
}

impl<A> Clone for WishlistStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: WishlistApi> WishlistStore<A> {
    /// Create an empty, signed-out store.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            inner: Arc::new(Shared {
                api,
                state: RwLock::new(WishlistState::default()),
            }),
        }
    }

    /// The remote API this store talks to.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    /// Whether `product_id` is in the local mirror.
    #[must_use]
    pub fn is_in_wishlist(&self, product_id: &ProductId) -> bool {
        self.read()
            .entries
            .iter()
            .any(|entry| &entry.product_id == product_id)
    }

    /// Snapshot of the local entries.
    #[must_use]
    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.read().entries.clone()
    }

    /// Product IDs in the local mirror, in service order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.read()
            .entries
            .iter()
            .map(|entry| entry.product_id.clone())
            .collect()
    }

    /// Number of local entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Whether the local mirror is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Whether the current-generation load is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    /// Whether the store currently has a session.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.read().token.is_some()
    }

    /// Generation of the most recently started load.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.read().generation
    }

    /// Record a session change and start the matching load.
    ///
    /// Any load still in flight becomes stale. Without a token the set is
    /// emptied and no load is needed.
    pub fn begin_session(&self, token: Option<SessionToken>) -> Option<LoadTicket> {
        let mut state = self.write();
        state.epoch = state.epoch.next();
        state.generation = state.generation.next();
        state.entries.clear();
        state.token.clone_from(&token);

        let Some(token) = token else {
            state.loading = false;
            debug!(generation = %state.generation, "Wishlist cleared, no session");
            return None;
        };

        state.loading = true;
        debug!(generation = %state.generation, "Wishlist session load started");
        Some(LoadTicket {
            generation: state.generation,
            token,
        })
    }

    /// Start a reload for the current session, keeping the current entries
    /// visible until it lands.
    pub fn begin_reload(&self) -> Option<LoadTicket> {
        let mut state = self.write();
        let token = state.token.clone()?;
        state.generation = state.generation.next();
        state.loading = true;
        debug!(generation = %state.generation, "Wishlist reload started");
        Some(LoadTicket {
            generation: state.generation,
            token,
        })
    }

    /// Fetch the entries for a started load and apply them if still current.
    ///
    /// # Errors
    ///
    /// Returns the remote error if the current-generation load failed. A
    /// failed stale load reports [`LoadOutcome::Stale`].
    #[instrument(skip_all, fields(generation = %ticket.generation))]
    pub async fn run_load(&self, ticket: LoadTicket) -> Result<LoadOutcome, WishlistError> {
        let result = self.inner.api.list(&ticket.token).await;
        self.finish_load(ticket.generation, result)
    }

    /// Apply a session change and wait for its load.
    ///
    /// # Errors
    ///
    /// Returns the remote error if the load failed and is still current.
    pub async fn sync_session(
        &self,
        token: Option<SessionToken>,
    ) -> Result<LoadOutcome, WishlistError> {
        match self.begin_session(token) {
            Some(ticket) => self.run_load(ticket).await,
            None => Ok(LoadOutcome::Cleared),
        }
    }

    /// Reload the entries for the current session.
    ///
    /// # Errors
    ///
    /// Returns the remote error if the load failed and is still current.
    pub async fn reload(&self) -> Result<LoadOutcome, WishlistError> {
        match self.begin_reload() {
            Some(ticket) => self.run_load(ticket).await,
            None => Ok(LoadOutcome::Cleared),
        }
    }

    /// Add a product to the wishlist.
    ///
    /// After the service accepts the add, the set is reloaded unless the
    /// product was already present locally. On failure local state is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns the remote error if the add or the follow-up reload failed.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: &ProductId) -> Result<WishlistOutcome, WishlistError> {
        let Some((token, epoch)) = self.session() else {
            return Ok(WishlistOutcome::NoSession);
        };

        if let Err(e) = self.inner.api.add(&token, product_id).await {
            warn!(error = %e, "Failed to add to wishlist");
            return Err(e);
        }

        let ticket = {
            let mut state = self.write();
            if state.epoch != epoch {
                return Ok(WishlistOutcome::Superseded);
            }
            if state.entries.iter().any(|e| &e.product_id == product_id) {
                return Ok(WishlistOutcome::Unchanged);
            }
            state.generation = state.generation.next();
            state.loading = true;
            LoadTicket {
                generation: state.generation,
                token,
            }
        };

        match self.run_load(ticket).await {
            Ok(LoadOutcome::Applied(_)) => Ok(WishlistOutcome::Applied),
            Ok(LoadOutcome::Stale | LoadOutcome::Cleared) => Ok(WishlistOutcome::Superseded),
            Err(e) => {
                warn!(error = %e, "Wishlist reload after add failed");
                Err(e)
            }
        }
    }

    /// Remove a product from the wishlist.
    ///
    /// The local entry is dropped only after the service confirms, and only
    /// that entry; no reload follows.
    ///
    /// # Errors
    ///
    /// Returns the remote error if the remove failed.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) -> Result<WishlistOutcome, WishlistError> {
        let Some((token, epoch)) = self.session() else {
            return Ok(WishlistOutcome::NoSession);
        };

        if let Err(e) = self.inner.api.remove(&token, product_id).await {
            warn!(error = %e, "Failed to remove from wishlist");
            return Err(e);
        }

        let mut state = self.write();
        if state.epoch != epoch {
            return Ok(WishlistOutcome::Superseded);
        }
        let before = state.entries.len();
        state.entries.retain(|entry| &entry.product_id != product_id);
        if state.entries.len() == before {
            Ok(WishlistOutcome::Unchanged)
        } else {
            Ok(WishlistOutcome::Applied)
        }
    }

    fn finish_load(
        &self,
        generation: Generation,
        result: Result<Vec<WishlistEntry>, WishlistError>,
    ) -> Result<LoadOutcome, WishlistError> {
        let mut state = self.write();
        if state.generation != generation {
            debug!(
                %generation,
                current = %state.generation,
                "Discarding stale wishlist load"
            );
            return Ok(LoadOutcome::Stale);
        }

        state.loading = false;
        match result {
            Ok(entries) => {
                let count = entries.len();
                state.entries = entries;
                debug!(%generation, entries = count, "Wishlist load applied");
                Ok(LoadOutcome::Applied(count))
            }
            Err(e) => {
                warn!(%generation, error = %e, "Wishlist load failed");
                Err(e)
            }
        }
    }

    fn session(&self) -> Option<(SessionToken, Generation)> {
        let state = self.read();
        state.token.clone().map(|token| (token, state.epoch))
    }

    fn read(&self) -> RwLockReadGuard<'_, WishlistState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, WishlistState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: WishlistApi + 'static> WishlistStore<A> {
    /// Follow `session` on the Tokio runtime.
    ///
    /// The current token is synced immediately, then every change starts a
    /// fresh load. Each load runs on its own task so a slow response never
    /// delays the next session change. Abort the returned handle to stop
    /// following.
    pub fn spawn_session_watcher(&self, session: &AuthSession) -> JoinHandle<()> {
        let store = self.clone();
        let mut rx = session.subscribe();

        tokio::spawn(async move {
            let token = rx.borrow_and_update().clone();
            store.spawn_session_load(token);

            while rx.changed().await.is_ok() {
                let token = rx.borrow_and_update().clone();
                store.spawn_session_load(token);
            }
            debug!("Session closed, wishlist watcher exiting");
        })
    }

    fn spawn_session_load(&self, token: Option<SessionToken>) {
        // Bump the generation before spawning so loads are ordered by session
        // change, not by task scheduling.
        if let Some(ticket) = self.begin_session(token) {
            let store = self.clone();
            tokio::spawn(async move {
                // Outcome is logged by `finish_load`.
                let _ = store.run_load(ticket).await;
            });
        }
    }
}
