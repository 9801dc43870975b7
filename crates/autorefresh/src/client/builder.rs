//! Client configuration and builder.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::SessionStore;
use crate::error::Error;
use crate::types::BaseUrl;

use super::endpoints::{LOGIN_PATH, REFRESH_PATH};
use super::recovery::RefreshPolicy;
use super::transport::{DEFAULT_USER_AGENT, HttpTransport, Transport};
use super::AuthClient;

/// Settings for an [`AuthClient`].
///
/// Everything but the base URL has a default, so a config can be
/// deserialized from as little as `{"base_url": "https://api.example.com"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server base URL; all paths resolve relative to it.
    pub base_url: BaseUrl,

    /// Path of the login endpoint.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Path of the refresh endpoint.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Scheme prepended to the main token in the authorization header, for
    /// example `Bearer`. The raw token is sent when unset.
    #[serde(default)]
    pub auth_scheme: Option<String>,

    /// How concurrent `401` responses share refresh work.
    #[serde(default)]
    pub refresh_policy: RefreshPolicy,

    /// Per-request timeout in milliseconds, enforced by the HTTP transport.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// User agent sent by the HTTP transport.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_login_path() -> String {
    LOGIN_PATH.to_string()
}

fn default_refresh_path() -> String {
    REFRESH_PATH.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ClientConfig {
    /// Create a config with default settings for `base_url`.
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            auth_scheme: None,
            refresh_policy: RefreshPolicy::default(),
            timeout_ms: None,
            user_agent: default_user_agent(),
        }
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Builder for [`AuthClient`].
///
/// # Example
///
/// ```
/// use autorefresh::{AuthClient, BaseUrl, RefreshPolicy};
///
/// let client = AuthClient::builder(BaseUrl::new("https://api.example.com").unwrap())
///     .auth_scheme("Bearer")
///     .refresh_policy(RefreshPolicy::SingleFlight)
///     .build()
///     .unwrap();
/// assert_eq!(client.base_url().as_str(), "https://api.example.com/");
/// ```
pub struct AuthClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    session: Option<SessionStore>,
}

impl AuthClientBuilder {
    pub(crate) fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            session: None,
        }
    }

    /// Override the login endpoint path.
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.config.login_path = path.into();
        self
    }

    /// Override the refresh endpoint path.
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.config.refresh_path = path.into();
        self
    }

    /// Prefix the main token with `scheme` in the authorization header.
    pub fn auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.config.auth_scheme = Some(scheme.into());
        self
    }

    /// Choose how concurrent `401` responses share refresh work.
    pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.config.refresh_policy = policy;
        self
    }

    /// Set a per-request timeout on the default HTTP transport.
    ///
    /// The config stores whole milliseconds; any remainder rounds up so a
    /// short non-zero timeout never becomes zero.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.config.timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    /// Set the user agent of the default HTTP transport.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Use a custom transport instead of [`HttpTransport`].
    ///
    /// Timeout and user agent settings are ignored in that case.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Share an existing session store instead of starting empty.
    pub fn session(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the default HTTP transport cannot be created.
    pub fn build(self) -> Result<AuthClient, Error> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::with_options(
                &self.config.user_agent,
                self.config.timeout(),
            )?),
        };
        let session = self.session.unwrap_or_default();

        Ok(AuthClient::from_parts(self.config, transport, session))
    }
}
