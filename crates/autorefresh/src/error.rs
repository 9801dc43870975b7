//! Error types for the autorefresh library.
//!
//! Every failure surfaces through [`Error`], with explicit variants so callers
//! can tell a transport failure from an HTTP status failure, and both of those
//! from the terminal [`Error::Redirect`] signal.

use std::fmt;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// Message carried by [`Error::Redirect`].
///
/// This is the only contract a surrounding application needs in order to
/// detect that the user must log in again.
pub const REDIRECT_MESSAGE: &str = "Redirect";

/// The unified error type for autorefresh operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a status outside of `200..300`.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// Authentication is exhausted and the caller must send the user to login.
    ///
    /// The session has already been cleared when this is returned.
    #[error(transparent)]
    Redirect(#[from] RedirectError),

    /// A local authentication precondition was not met.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A successful response body did not match the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid input (base URL, request path, header value).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the HTTP status behind this error, if a response was received.
    ///
    /// For [`Error::Redirect`] this is the status of the request that
    /// triggered the redirect, normally `401`.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status(err) => Some(err.status),
            Error::Redirect(err) => Some(err.cause().status),
            _ => None,
        }
    }

    /// Returns true if this is the redirect signal.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Error::Redirect(_))
    }

    /// Returns true if this is a plain `401 Unauthorized` status error.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Status(err) if err.is_unauthorized())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Transport-level errors: no HTTP response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {message}")]
    Builder { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else if err.is_builder() {
            TransportError::Builder {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

/// A response whose status failed the success predicate.
#[derive(Debug, Clone)]
pub struct StatusError {
    /// HTTP status code.
    pub status: StatusCode,
    /// Method of the failed request.
    pub method: Method,
    /// Absolute URL of the failed request.
    pub url: String,
    /// Error code from the server body, if present.
    pub error: Option<String>,
    /// Error message from the server body, if present.
    pub message: Option<String>,
}

/// Common error body shape (`{"error": ..., "message": ...}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl StatusError {
    /// Build a status error, extracting `error`/`message` from a JSON body when
    /// the server sent one.
    pub fn new(status: StatusCode, method: Method, url: impl Into<String>, body: &[u8]) -> Self {
        let (error, message) = match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => (parsed.error, parsed.message),
            Err(_) => (None, None),
        };

        Self {
            status,
            method,
            url: url.into(),
            error,
            message,
        }
    }

    /// Returns true for `401 Unauthorized`.
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} for {} {}", self.status, self.method, self.url)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for StatusError {}

/// The redirect signal, wrapping the `401` that could not be recovered.
#[derive(Debug, Error)]
#[error("{}", REDIRECT_MESSAGE)]
pub struct RedirectError {
    #[source]
    cause: StatusError,
}

impl RedirectError {
    pub(crate) fn new(cause: StatusError) -> Self {
        Self { cause }
    }

    /// The original failure that triggered the redirect.
    pub fn cause(&self) -> &StatusError {
        &self.cause
    }
}

/// Local authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A refresh was requested but no refresh token is held.
    #[error("no refresh token available")]
    MissingRefreshToken,
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid base URL.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// A request path could not be joined onto the base URL.
    #[error("invalid request path '{value}': {reason}")]
    Path { value: String, reason: String },

    /// A token contains characters that are not allowed in a header value.
    #[error("invalid authorization header value")]
    HeaderValue,
}
