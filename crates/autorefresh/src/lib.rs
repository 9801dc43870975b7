//! autorefresh - HTTP client with automatic session recovery.
//!
//! This library wraps a JSON HTTP API that issues a short-lived *main* token
//! and a longer-lived *refresh* token. Every request made through
//! [`AuthClient`] carries the current main token; when the server answers
//! `401 Unauthorized`, the client exchanges the refresh token for a new
//! session and retries the request exactly once.
//!
//! When recovery is impossible (no refresh token, or the refresh itself is
//! rejected) the session is cleared and the call fails with
//! [`Error::Redirect`], whose message is `"Redirect"`. Sending the user back to
//! a login screen is left to the caller.
//!
//! # Example
//!
//! ```no_run
//! use autorefresh::{AuthClient, BaseUrl, Method};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), autorefresh::Error> {
//! let client = AuthClient::builder(BaseUrl::new("http://baseUrl.com/")?).build()?;
//! client.login("validClientId", "validClientSecret").await?;
//!
//! let ok: bool = client.request(Method::POST, "test", Some(json!({}))).await?;
//! assert!(ok);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{ClientCredentials, MainToken, RefreshToken, Session, SessionStore};
pub use client::{AuthClient, AuthClientBuilder, ClientConfig, HttpTransport, RefreshPolicy, Transport};
pub use error::{Error, REDIRECT_MESSAGE};
pub use types::BaseUrl;

pub use reqwest::{Method, StatusCode};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
