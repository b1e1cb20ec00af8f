//! Authentication session and load-generation plumbing.
//!
//! [`AuthSession`] publishes the current session token over a
//! `tokio::sync::watch` channel; every login, logout, and token refresh is a
//! change notification. [`Generation`] stamps let async work detect that the
//! session moved on while it was in flight.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::debug;

/// Bearer token identifying the signed-in user.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for placing in an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SessionToken {}

impl From<SecretString> for SessionToken {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}

/// Source of truth for the current session token.
///
/// Cheaply cloneable; clones publish to the same channel.
#[derive(Debug, Clone)]
pub struct AuthSession {
    tx: watch::Sender<Option<SessionToken>>,
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::signed_out()
    }
}

impl AuthSession {
    /// A session with no signed-in user.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::new(None)
    }

    /// A session starting with `token`.
    #[must_use]
    pub fn new(token: Option<SessionToken>) -> Self {
        let (tx, _rx) = watch::channel(token);
        Self { tx }
    }

    /// The current token, if signed in.
    #[must_use]
    pub fn token(&self) -> Option<SessionToken> {
        self.tx.borrow().clone()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Replace the token (login or refresh).
    ///
    /// Setting the token it already holds does not notify subscribers.
    pub fn set_token(&self, token: SessionToken) {
        self.replace(Some(token));
    }

    /// Sign out.
    pub fn clear(&self) {
        self.replace(None);
    }

    /// Subscribe to token changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionToken>> {
        self.tx.subscribe()
    }

    fn replace(&self, token: Option<SessionToken>) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == token {
                false
            } else {
                *current = token;
                true
            }
        });
        if changed {
            debug!(signed_in = self.is_active(), "Session token changed");
        }
    }
}

/// Monotonic stamp of the session a piece of async work belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    /// The next generation.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = SessionToken::new("tok_super_secret");
        let debug = format!("{token:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("tok_super_secret"));
    }

    #[test]
    fn test_set_and_clear() {
        let session = AuthSession::signed_out();
        assert!(!session.is_active());

        session.set_token(SessionToken::new("t1"));
        assert_eq!(session.token(), Some(SessionToken::new("t1")));

        session.clear();
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn test_same_token_does_not_notify() {
        let session = AuthSession::new(Some(SessionToken::new("t1")));
        let mut rx = session.subscribe();

        session.set_token(SessionToken::new("t1"));
        assert!(!rx.has_changed().unwrap_or(true));

        session.set_token(SessionToken::new("t2"));
        assert!(rx.has_changed().unwrap_or(false));
        rx.borrow_and_update();
        assert!(!rx.has_changed().unwrap_or(true));
    }

    #[test]
    fn test_generation_is_monotonic() {
        let g = Generation::default();
        assert!(g.next() > g);
        assert_eq!(g.next().next().get(), 2);
    }
}
