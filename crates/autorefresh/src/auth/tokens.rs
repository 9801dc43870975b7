//! Credential token types.

use std::fmt;

/// The main credential, attached to every ordinary request.
///
/// Main tokens are short-lived. The value is opaque and sent as-is in the
/// authorization header.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MainToken(String);

impl MainToken {
    /// Create a new main token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token value.
    ///
    /// # Security
    ///
    /// Use only when constructing authorization headers or exporting the
    /// session on purpose.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when no token is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for MainToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MainToken").field(&"[REDACTED]").finish()
    }
}

/// The refresh credential, exchanged for a new session when the main token
/// is rejected.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token value.
    ///
    /// # Security
    ///
    /// Use only when constructing refresh requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when no token is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}
