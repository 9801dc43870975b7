//! The HTTP transport seam.
//!
//! A [`Transport`] only moves bytes: it reports every status code as a
//! response and leaves success checks and recovery to the layers above it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use tracing::{instrument, trace};
use url::Url;

use crate::error::{Error, TransportError};

/// A fully resolved request, ready to hand to a [`Transport`].
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

/// The raw response to an [`OutgoingRequest`], whatever its status.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Sends requests over the network.
///
/// Implementations must return `Ok` for every response that was received,
/// including `4xx` and `5xx` statuses, and `Err` only when no response
/// arrived.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and collect the full response body.
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the default user agent and no timeout.
    pub fn new() -> Result<Self, Error> {
        Self::with_options(DEFAULT_USER_AGENT, None)
    }

    /// Create a transport with a custom user agent and optional timeout.
    pub fn with_options(user_agent: &str, timeout: Option<Duration>) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::from)?;

        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client, sharing its connection pool.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// User agent sent by [`HttpTransport::new`].
pub const DEFAULT_USER_AGENT: &str = concat!("autorefresh/", env!("CARGO_PKG_VERSION"));

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        trace!(status = %status, len = body.len(), "HTTP response");

        Ok(TransportResponse { status, body })
    }
}
