//! HTTP client for the wishlist service.
//!
//! Uses `reqwest` with bearer-token auth. Routes:
//!
//! - `GET    {base}/api/wishlist` - list entries
//! - `POST   {base}/api/wishlist` - add, body `{"productId": "..."}`
//! - `DELETE {base}/api/wishlist/{productId}` - remove

use std::sync::Arc;
use std::time::Duration;

use krisha_core::{ProductId, WishlistEntry};
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use super::api::{WishlistApi, WishlistError};
use crate::config::WishlistApiConfig;
use crate::session::SessionToken;

/// How much of an error body to keep for diagnostics.
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddRequest<'a> {
    product_id: &'a ProductId,
}

/// Client for the wishlist service.
#[derive(Clone)]
pub struct HttpWishlistClient {
    inner: Arc<HttpWishlistClientInner>,
}

struct HttpWishlistClientInner {
    client: reqwest::Client,
    collection_url: Url,
}

impl HttpWishlistClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &WishlistApiConfig) -> Result<Self, WishlistError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpWishlistClientInner {
                client,
                collection_url: config.collection_url(),
            }),
        })
    }

    /// URL of the wishlist collection.
    #[must_use]
    pub fn collection_url(&self) -> &Url {
        &self.inner.collection_url
    }

    /// URL of a single wishlist entry, keyed by product.
    #[must_use]
    pub fn entry_url(&self, product_id: &ProductId) -> Url {
        let mut url = self.inner.collection_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(product_id.as_str());
        }
        url
    }

    /// Send a request and return the body of a successful response.
    async fn send(
        &self,
        request: RequestBuilder,
        token: &SessionToken,
    ) -> Result<String, WishlistError> {
        let response = request.bearer_auth(token.expose()).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(WishlistError::RateLimited(retry_after));
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(WishlistError::Unauthorized);
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Wishlist service returned non-success status"
            );
            return Err(WishlistError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        Ok(body)
    }
}

impl WishlistApi for HttpWishlistClient {
    #[instrument(skip_all)]
    async fn list(&self, token: &SessionToken) -> Result<Vec<WishlistEntry>, WishlistError> {
        let request = self.inner.client.get(self.inner.collection_url.clone());
        let body = self.send(request, token).await?;

        let entries: Vec<WishlistEntry> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse wishlist response"
            );
            WishlistError::Parse(e)
        })?;

        debug!(entries = entries.len(), "Fetched wishlist");
        Ok(entries)
    }

    #[instrument(skip(self, token), fields(product_id = %product_id))]
    async fn add(&self, token: &SessionToken, product_id: &ProductId) -> Result<(), WishlistError> {
        let request = self
            .inner
            .client
            .post(self.inner.collection_url.clone())
            .json(&AddRequest { product_id });
        self.send(request, token).await?;
        Ok(())
    }

    #[instrument(skip(self, token), fields(product_id = %product_id))]
    async fn remove(
        &self,
        token: &SessionToken,
        product_id: &ProductId,
    ) -> Result<(), WishlistError> {
        let request = self.inner.client.delete(self.entry_url(product_id));
        self.send(request, token).await?;
        Ok(())
    }
}
