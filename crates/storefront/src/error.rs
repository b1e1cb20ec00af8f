//! Unified error handling for the engine.
//!
//! Each seam has its own error type ([`StorageError`], [`WishlistError`],
//! [`ConfigError`]); `EngineError` wraps them for callers that drive the
//! whole engine, such as the CLI. Stock limits, non-positive quantities, and
//! missing sessions are not errors and never show up here.

use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::wishlist::WishlistError;

/// Engine-level error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Durable storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Wishlist service operation failed.
    #[error("Wishlist error: {0}")]
    Wishlist(#[from] WishlistError),
}

impl EngineError {
    /// Whether retrying the same call later might succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Wishlist(err) => matches!(
                err,
                WishlistError::Http(_)
                    | WishlistError::RateLimited(_)
                    | WishlistError::Status { status: 500.., .. }
            ),
            Self::Storage(StorageError::Io(_)) => true,
            _ => false,
        }
    }
}
