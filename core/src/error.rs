//! Error types for the JumpServer API client.
//!
//! # Design
//! Failures split by where they happen. `Url` and `Encoding` are raised while
//! building the request, before any I/O. `Network` means no response arrived,
//! so there is nothing to inspect. `RequestFailed` and `Decoding` both carry
//! the response envelope, letting callers read the status, headers and raw
//! body (which may hold a structured error payload) even though the call
//! failed.

use thiserror::Error;

use crate::response::Response;
use crate::transport::TransportError;

/// Errors returned by [`Client`](crate::Client) and the resource services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL or request path could not be parsed or resolved.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The request never produced a response.
    #[error(transparent)]
    Network(#[from] TransportError),

    /// The server answered with a status outside 200..=299.
    #[error("request failed with status code {status}, see the response body for details")]
    RequestFailed { status: u16, response: Box<Response> },

    /// The server answered successfully but the body did not match the
    /// expected shape.
    #[error("failed to decode response body: {source}")]
    Decoding {
        #[source]
        source: serde_json::Error,
        response: Box<Response>,
    },
}

impl ApiError {
    /// The response envelope, when the server produced one.
    pub fn response(&self) -> Option<&Response> {
        match self {
            ApiError::RequestFailed { response, .. } | ApiError::Decoding { response, .. } => {
                Some(response.as_ref())
            }
            ApiError::Url(_) | ApiError::Encoding(_) | ApiError::Network(_) => None,
        }
    }

    /// HTTP status of the response, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
