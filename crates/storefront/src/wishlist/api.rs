//! Remote wishlist authority interface.

use std::future::Future;

use krisha_core::{ProductId, WishlistEntry};
use thiserror::Error;

use crate::session::SessionToken;

/// Errors that can occur when talking to the wishlist service.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The session token was rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Operations offered by the remote wishlist authority.
///
/// Every call carries the session token it was issued under, so a response
/// is always tied to one session. `add` and `remove` are idempotent on the
/// service side: adding a present product or removing an absent one succeeds.
pub trait WishlistApi: Send + Sync {
    /// The authority's current entries for the session.
    fn list(
        &self,
        token: &SessionToken,
    ) -> impl Future<Output = Result<Vec<WishlistEntry>, WishlistError>> + Send;

    /// Add a product to the session's wishlist.
    fn add(
        &self,
        token: &SessionToken,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), WishlistError>> + Send;

    /// Remove a product from the session's wishlist.
    fn remove(
        &self,
        token: &SessionToken,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), WishlistError>> + Send;
}
