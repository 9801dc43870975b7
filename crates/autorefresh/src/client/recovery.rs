//! The recovery hook run when an instrumented request fails.
//!
//! A `401 Unauthorized` is treated as an expired main token: the hook
//! exchanges the refresh token for a new session and retries the request
//! once through the raw transport. Anything else passes through untouched.
//! When recovery is impossible the session is cleared and the caller gets
//! [`Error::Redirect`].

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::auth::{MainToken, RefreshToken, SessionStore};
use crate::error::{AuthError, Error, RedirectError, StatusError};

use super::endpoints::{AuthResponse, RefreshRequest};
use super::raw::{ApiRequest, RawTransport};

/// How concurrent `401` responses share refresh work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Every `401` runs its own refresh. Concurrent failures may refresh
    /// several times; the last response to arrive wins.
    #[default]
    PerRequest,

    /// Refreshes are serialized. A request that waited while another one
    /// rotated the credentials retries with the new main token instead of
    /// refreshing again. If the refresh failed, the waiters go straight to
    /// redirect.
    SingleFlight,
}

pub(crate) struct RecoveryInterceptor {
    raw: RawTransport,
    store: SessionStore,
    refresh_path: String,
    policy: RefreshPolicy,
    refresh_gate: Mutex<()>,
}

impl RecoveryInterceptor {
    pub(crate) fn new(
        raw: RawTransport,
        store: SessionStore,
        refresh_path: String,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            raw,
            store,
            refresh_path,
            policy,
            refresh_gate: Mutex::new(()),
        }
    }

    /// Handle the failure of `request`.
    ///
    /// Returns the body of the retried request when recovery succeeds. The
    /// retry's own failure, if any, is returned unchanged.
    pub(crate) async fn on_failure(&self, error: Error, request: ApiRequest) -> Result<Vec<u8>, Error> {
        let failed = match error {
            Error::Status(failed) if failed.is_unauthorized() => failed,
            other => return Err(other),
        };

        debug!(url = %failed.url, "Request unauthorized, attempting recovery");

        let refresh_token = self.store.refresh_token().await;
        if refresh_token.is_empty() {
            info!("No refresh token held");
            return Err(self.redirect(failed).await);
        }

        let refreshed = match self.policy {
            RefreshPolicy::PerRequest => self.refresh(&refresh_token).await,
            RefreshPolicy::SingleFlight => self.refresh_single_flight(request.authorization()).await,
        };

        match refreshed {
            Ok(main_token) => {
                debug!("Retrying request with refreshed credentials");
                let retry = request.with_authorization(main_token);
                self.raw.dispatch(&retry).await
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed");
                Err(self.redirect(failed).await)
            }
        }
    }

    /// Exchange `refresh_token` for a new session and store it.
    #[instrument(skip_all)]
    pub(crate) async fn refresh(&self, refresh_token: &RefreshToken) -> Result<MainToken, Error> {
        info!("Refreshing session");

        let request = RefreshRequest {
            refresh_token: refresh_token.as_str(),
        };
        let response: AuthResponse = self.raw.post_json(&self.refresh_path, &request).await?;

        let main_token = MainToken::new(response.main_token.as_str());
        self.store.update_from_response(response).await;

        debug!("Session refreshed successfully");
        Ok(main_token)
    }

    /// Refresh under the gate, unless the credentials changed since `sent_with`
    /// was attached to the failed request.
    async fn refresh_single_flight(&self, sent_with: Option<&MainToken>) -> Result<MainToken, Error> {
        let _gate = self.refresh_gate.lock().await;

        let session = self.store.snapshot().await;
        if session.is_authenticated() && Some(session.main_token()) != sent_with {
            debug!("Credentials already rotated by a concurrent refresh");
            return Ok(session.main_token().clone());
        }
        if session.refresh_token().is_empty() {
            return Err(AuthError::MissingRefreshToken.into());
        }

        let refreshed = self.refresh(session.refresh_token()).await;
        if refreshed.is_err() {
            // Waiters must not retry the rejected refresh token
            self.store.clear().await;
        }
        refreshed
    }

    /// Terminal state: forget the session and signal the caller.
    async fn redirect(&self, failed: StatusError) -> Error {
        self.store.clear().await;
        warn!(status = %failed.status, url = %failed.url, "Authentication exhausted, login required");
        RedirectError::new(failed).into()
    }
}

impl std::fmt::Debug for RecoveryInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryInterceptor")
            .field("refresh_path", &self.refresh_path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
