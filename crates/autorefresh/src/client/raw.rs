//! The raw transport role: base URL resolution, credential attachment and the
//! success predicate, with no recovery attached.
//!
//! Login, refresh and the single retry after a refresh all go through this
//! role directly, so a failure there can never re-enter the recovery hook.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, trace};

use crate::auth::MainToken;
use crate::error::{Error, InvalidInputError, StatusError};
use crate::types::BaseUrl;

use super::transport::{OutgoingRequest, Transport};

/// A request as the caller described it, plus the credential it carries.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    authorization: Option<MainToken>,
}

impl ApiRequest {
    pub(crate) fn new(method: Method, path: impl Into<String>, body: Option<serde_json::Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            authorization: None,
        }
    }

    /// Replace the credential this request carries. An empty token means no
    /// authorization header is sent.
    pub(crate) fn with_authorization(mut self, token: MainToken) -> Self {
        self.authorization = (!token.is_empty()).then_some(token);
        self
    }

    pub(crate) fn authorization(&self) -> Option<&MainToken> {
        self.authorization.as_ref()
    }
}

/// Decode a successful body. An empty body decodes as JSON `null`.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Transport without the recovery hook.
#[derive(Clone)]
pub(crate) struct RawTransport {
    base: BaseUrl,
    transport: Arc<dyn Transport>,
    auth_scheme: Option<String>,
}

impl RawTransport {
    pub(crate) fn new(base: BaseUrl, transport: Arc<dyn Transport>, auth_scheme: Option<String>) -> Self {
        Self {
            base,
            transport,
            auth_scheme,
        }
    }

    pub(crate) fn base(&self) -> &BaseUrl {
        &self.base
    }

    /// Send a request and apply the success predicate.
    ///
    /// Returns the body on success and [`Error::Status`] otherwise.
    pub(crate) async fn dispatch(&self, request: &ApiRequest) -> Result<Vec<u8>, Error> {
        let url = self.base.join(&request.path)?;
        debug!(method = %request.method, %url, "Dispatching request");

        let outgoing = OutgoingRequest {
            method: request.method.clone(),
            url: url.clone(),
            headers: self.headers(request.authorization())?,
            body: request.body.clone(),
        };

        let response = self.transport.send(outgoing).await?;
        trace!(status = %response.status, "Response received");

        if response.status.is_success() {
            Ok(response.body)
        } else {
            Err(StatusError::new(
                response.status,
                request.method.clone(),
                url.as_str(),
                &response.body,
            )
            .into())
        }
    }

    /// POST a JSON body without credentials and decode the JSON response.
    pub(crate) async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let request = ApiRequest::new(Method::POST, path, Some(serde_json::to_value(body)?));
        let response = self.dispatch(&request).await?;
        decode(&response)
    }

    fn headers(&self, token: Option<&MainToken>) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = match self.auth_scheme {
                Some(ref scheme) => format!("{} {}", scheme, token.as_str()),
                None => token.as_str().to_string(),
            };
            let mut value =
                HeaderValue::from_str(&value).map_err(|_| InvalidInputError::HeaderValue)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

impl std::fmt::Debug for RawTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawTransport")
            .field("base", &self.base)
            .field("auth_scheme", &self.auth_scheme)
            .finish_non_exhaustive()
    }
}
