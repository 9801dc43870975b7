//! Shared session state.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::client::AuthResponse;

use super::tokens::{MainToken, RefreshToken};

/// A read-only snapshot of the session credentials.
///
/// Both tokens are empty until a login succeeds, and become empty again
/// whenever the session is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    main_token: MainToken,
    refresh_token: RefreshToken,
}

impl Session {
    /// Returns the main credential.
    pub fn main_token(&self) -> &MainToken {
        &self.main_token
    }

    /// Returns the refresh credential.
    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }

    /// Returns true when a main credential is held.
    pub fn is_authenticated(&self) -> bool {
        !self.main_token.is_empty()
    }
}

/// Holder of the current main and refresh credentials.
///
/// The store is cheap to clone; clones share the same session. Both fields
/// are always written together under one lock, so readers never observe a
/// main token from one login paired with a refresh token from another.
///
/// # Example
///
/// ```
/// use autorefresh::{MainToken, RefreshToken, SessionStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = SessionStore::new();
/// assert!(!store.is_authenticated().await);
///
/// store.update(MainToken::new("main"), RefreshToken::new("refresh")).await;
/// assert_eq!(store.snapshot().await.main_token().as_str(), "main");
///
/// store.clear().await;
/// assert!(store.snapshot().await.refresh_token().is_empty());
/// # }
/// ```
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Session>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current credentials.
    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    /// Returns the current main credential.
    pub async fn main_token(&self) -> MainToken {
        self.inner.read().await.main_token.clone()
    }

    /// Returns the current refresh credential.
    pub async fn refresh_token(&self) -> RefreshToken {
        self.inner.read().await.refresh_token.clone()
    }

    /// Returns true when a main credential is held.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_authenticated()
    }

    /// Overwrite both credentials at once.
    pub async fn update(&self, main_token: MainToken, refresh_token: RefreshToken) {
        let mut session = self.inner.write().await;
        session.main_token = main_token;
        session.refresh_token = refresh_token;
    }

    /// Overwrite both credentials from a login or refresh response.
    pub(crate) async fn update_from_response(&self, response: AuthResponse) {
        self.update(
            MainToken::new(response.main_token),
            RefreshToken::new(response.refresh_token),
        )
        .await;
        debug!("Session credentials updated");
    }

    /// Empty both credentials.
    pub async fn clear(&self) {
        let mut session = self.inner.write().await;
        session.main_token = MainToken::default();
        session.refresh_token = RefreshToken::default();
        debug!("Session cleared");
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
