//! The authenticated client.
//!
//! [`AuthClient`] keeps two transport roles apart:
//!
//! - the *raw* role, used for login, refresh and the retry after a refresh,
//!   applies only the `2xx` success predicate;
//! - the *instrumented* role, used by [`AuthClient::request`], is the raw
//!   role plus the recovery hook that turns a `401` into one refresh and one
//!   retry.

mod builder;
mod endpoints;
mod raw;
mod recovery;
mod transport;

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::auth::{ClientCredentials, SessionStore};
use crate::error::{AuthError, Error};
use crate::types::BaseUrl;

pub use builder::{AuthClientBuilder, ClientConfig};
pub use endpoints::{LOGIN_PATH, REFRESH_PATH};
pub use recovery::RefreshPolicy;
pub use transport::{
    DEFAULT_USER_AGENT, HttpTransport, OutgoingRequest, Transport, TransportResponse,
};

pub(crate) use endpoints::AuthResponse;

use endpoints::LoginRequest;
use raw::{ApiRequest, RawTransport, decode};
use recovery::RecoveryInterceptor;

/// HTTP client that attaches the session's main token to every request and
/// recovers from token expiry.
///
/// Clients are cheap to clone (they use an internal `Arc`) and safe to share
/// across tasks. All clones use the same session.
///
/// # Example
///
/// ```no_run
/// use autorefresh::{AuthClient, BaseUrl, Method};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), autorefresh::Error> {
/// let client = AuthClient::builder(BaseUrl::new("https://api.example.com")?).build()?;
/// client.login("my-client", "s3cret").await?;
///
/// match client.request::<serde_json::Value>(Method::POST, "items", Some(json!({"name": "x"}))).await {
///     Ok(item) => println!("created {item}"),
///     Err(e) if e.is_redirect() => println!("please log in again"),
///     Err(e) => return Err(e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    raw: RawTransport,
    session: SessionStore,
    recovery: RecoveryInterceptor,
    login_path: String,
}

impl AuthClient {
    /// Start building a client for `base_url`.
    pub fn builder(base_url: BaseUrl) -> AuthClientBuilder {
        AuthClientBuilder::new(ClientConfig::new(base_url))
    }

    /// Build a client from a complete config, using the HTTP transport.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        AuthClientBuilder::new(config).build()
    }

    pub(crate) fn from_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        session: SessionStore,
    ) -> Self {
        let raw = RawTransport::new(config.base_url, transport, config.auth_scheme);
        let recovery = RecoveryInterceptor::new(
            raw.clone(),
            session.clone(),
            config.refresh_path,
            config.refresh_policy,
        );

        Self {
            inner: Arc::new(ClientInner {
                raw,
                session,
                recovery,
                login_path: config.login_path,
            }),
        }
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &BaseUrl {
        self.inner.raw.base()
    }

    /// Returns the session store this client reads and writes.
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Log in and store the returned tokens.
    ///
    /// Login bypasses the recovery hook: a `401` here means the credentials
    /// are wrong and is returned as-is, leaving the session untouched.
    #[instrument(skip(self, client_secret))]
    pub async fn login(&self, client_id: &str, client_secret: &str) -> Result<(), Error> {
        self.login_with(&ClientCredentials::new(client_id, client_secret))
            .await
    }

    /// Log in with a [`ClientCredentials`] value.
    #[instrument(skip(self, credentials), fields(client_id = %credentials.client_id()))]
    pub async fn login_with(&self, credentials: &ClientCredentials) -> Result<(), Error> {
        info!("Logging in");

        let request = LoginRequest {
            client_id: credentials.client_id(),
            client_secret: credentials.client_secret(),
        };
        let response: AuthResponse = self
            .inner
            .raw
            .post_json(&self.inner.login_path, &request)
            .await?;

        self.inner.session.update_from_response(response).await;

        debug!("Login successful");
        Ok(())
    }

    /// Send a request with the current main token attached and decode the
    /// JSON response body.
    ///
    /// An empty success body decodes as JSON `null`, so `()` and `Option<_>`
    /// are valid targets.
    ///
    /// # Errors
    ///
    /// - [`Error::Redirect`] when the token was rejected and could not be
    ///   refreshed; the session has been cleared.
    /// - [`Error::Status`] for any other non-`2xx` status, including a failed
    ///   retry after a successful refresh.
    /// - [`Error::Transport`] when no response arrived.
    #[instrument(skip(self, body))]
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let main_token = self.inner.session.main_token().await;
        let request = ApiRequest::new(method, path, body).with_authorization(main_token);

        let response = match self.inner.raw.dispatch(&request).await {
            Ok(response) => response,
            Err(error) => self.inner.recovery.on_failure(error, request).await?,
        };

        decode(&response)
    }

    /// Exchange the refresh token for a new session now.
    ///
    /// Unlike the automatic recovery, a failure here leaves the session as
    /// it was.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingRefreshToken`] when no refresh token is
    /// held, or the refresh endpoint's error.
    pub async fn refresh(&self) -> Result<(), Error> {
        let refresh_token = self.inner.session.refresh_token().await;
        if refresh_token.is_empty() {
            return Err(AuthError::MissingRefreshToken.into());
        }

        self.inner.recovery.refresh(&refresh_token).await?;
        Ok(())
    }

    /// Forget the current session.
    pub async fn logout(&self) {
        info!("Logging out");
        self.inner.session.clear().await;
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", self.base_url())
            .field("login_path", &self.inner.login_path)
            .field("recovery", &self.inner.recovery)
            .field("session", &self.inner.session)
            .finish()
    }
}
