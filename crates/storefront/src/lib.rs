//! Krisha Storefront library - client-side cart and wishlist engine.
//!
//! # Architecture
//!
//! - [`cart::CartStore`] - ordered cart lines with stock ceilings, persisted
//!   to a [`storage::KeyValueStore`] on every mutation; never touches the
//!   network
//! - [`wishlist::WishlistStore`] - mirror of the remote wishlist, reloaded on
//!   every [`session::AuthSession`] change; stale loads are discarded by
//!   generation
//! - [`state::Storefront`] - owns both stores for one browsing context
//!
//! Failures degrade to no-ops or empty state; nothing here is fatal to the
//! host application.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod storage;
pub mod wishlist;

pub use cart::{AddOutcome, CartStore, QuantityOutcome};
pub use config::EngineConfig;
pub use error::EngineError;
pub use session::{AuthSession, SessionToken};
pub use state::Storefront;
pub use wishlist::{LoadOutcome, WishlistOutcome, WishlistStore};
