//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `KRISHA_API_BASE_URL` - Wishlist service base URL (default: `http://127.0.0.1:3000`)
//! - `KRISHA_DATA_DIR` - Directory for durable client state (default: `.krisha`)
//! - `KRISHA_SESSION_TOKEN` - Bearer token of the signed-in user
//! - `KRISHA_HTTP_TIMEOUT_SECS` - Wishlist request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::session::SessionToken;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_DATA_DIR: &str = ".krisha";
const DEFAULT_TIMEOUT_SECS: &str = "10";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory backing the file key-value store
    pub data_dir: PathBuf,
    /// Session token of the signed-in user, if any
    pub session_token: Option<SecretString>,
    /// Wishlist service configuration
    pub wishlist: WishlistApiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Wishlist service configuration.
#[derive(Debug, Clone)]
pub struct WishlistApiConfig {
    /// Base URL; the wishlist lives at `{base_url}/api/wishlist`
    pub base_url: Url,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl WishlistApiConfig {
    /// URL of the wishlist collection.
    #[must_use]
    pub fn collection_url(&self) -> Url {
        let mut base = self.base_url.clone();
        // Treat the base as a directory so `join` appends instead of replacing
        // its last segment.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join("api/wishlist").unwrap_or(base)
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or the session token
    /// looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default("KRISHA_DATA_DIR", DEFAULT_DATA_DIR));
        let session_token = get_optional_env("KRISHA_SESSION_TOKEN")
            .map(|token| {
                validate_secret_strength(&token, "KRISHA_SESSION_TOKEN")?;
                Ok(SecretString::from(token))
            })
            .transpose()?;
        let wishlist = WishlistApiConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            data_dir,
            session_token,
            wishlist,
            sentry_dsn,
        })
    }

    /// The configured session token, ready for an [`AuthSession`](crate::session::AuthSession).
    #[must_use]
    pub fn session(&self) -> Option<SessionToken> {
        self.session_token.clone().map(SessionToken::from)
    }
}

impl WishlistApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            "KRISHA_API_BASE_URL",
            &get_env_or_default("KRISHA_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let timeout_secs = get_env_or_default("KRISHA_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("KRISHA_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            timeout_secs,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an http(s) base URL.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected an http(s) URL, got {value}"),
        ));
    }
    Ok(url)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // Token length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
