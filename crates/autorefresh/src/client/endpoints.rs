//! Authentication endpoint definitions and request/response types.

use serde::{Deserialize, Serialize};

/// Default path of the login endpoint, relative to the base URL.
pub const LOGIN_PATH: &str = "login";

/// Default path of the refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "refresh";

/// Request body for the login endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Request body for the refresh endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response from both the login and refresh endpoints.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthResponse {
    pub main_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
