//! Network transports.
//!
//! # Design
//! [`Transport`] is the only place where I/O happens. The client never reaches
//! for a process-wide default: it is handed a transport at construction, which
//! lets tests substitute an in-memory double and lets authentication
//! strategies wrap another transport (see [`crate::auth::AuthTransport`]).
//!
//! [`UreqTransport`] is the stock implementation. Its agent is configured so
//! that 4xx/5xx responses come back as data instead of `Err`, leaving status
//! interpretation to [`crate::response`].

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::HeaderMap;
use thiserror::Error;
use ureq::Agent;
use url::Url;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes a single HTTP request and returns the response with its body read.
///
/// Implementations must be safe to share between threads; the client holds no
/// lock around calls to `execute`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// A request that never produced a response: connection refused, timeout,
/// TLS failure and the like.
#[derive(Debug, Error)]
#[error("transport failed: {source}")]
pub struct TransportError {
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl TransportError {
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Blocking transport backed by a [`ureq::Agent`].
///
/// Cloning is cheap and clones share the agent's connection pool.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::from_agent(
            Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent(),
        )
    }

    /// Bounds the whole request (connect, send, receive) by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::from_agent(
            Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .new_agent(),
        )
    }

    /// Wraps a caller-configured agent.
    ///
    /// The agent should have `http_status_as_error` disabled; otherwise error
    /// statuses surface as [`TransportError`] rather than as a failed response.
    pub fn from_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut response = match body {
            Some(body) => self.agent.run(to_http(method, &url, headers, body)?),
            None => self.agent.run(to_http(method, &url, headers, ())?),
        }
        .map_err(TransportError::new)?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(TransportError::new)?;

        Ok(HttpResponse {
            status,
            headers,
            body: Bytes::from(body),
        })
    }
}

fn to_http<B>(
    method: HttpMethod,
    url: &Url,
    headers: HeaderMap,
    body: B,
) -> Result<http::Request<B>, TransportError> {
    let mut request = http::Request::builder()
        .method(http::Method::from(method))
        .uri(url.as_str())
        .body(body)
        .map_err(TransportError::new)?;
    *request.headers_mut() = headers;
    Ok(request)
}
