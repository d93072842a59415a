//! Request builder and dispatcher for the JumpServer API.
//!
//! # Design
//! `Client` holds a normalized base URL and a [`Transport`], and carries no
//! mutable state between calls. A call is split into [`Client::new_request`],
//! which resolves the path and encodes the body without any I/O, and
//! [`Client::execute`] / [`Client::execute_json`], which dispatch through the
//! transport and classify the result. [`Client::send`] chains the two.

use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::assets::Assets;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::response::{self, Response};
use crate::transport::{Transport, UreqTransport};
use crate::users::Users;

/// Synchronous client for the JumpServer REST API.
///
/// Cheap to share by reference across threads when `T` is; every call builds
/// its own request and envelope.
#[derive(Debug, Clone)]
pub struct Client<T = UreqTransport> {
    transport: T,
    base_url: Url,
}

impl<T: Transport> Client<T> {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// A trailing `/` is appended to the base path if missing so that relative
    /// paths resolve beneath it rather than replacing its last segment.
    pub fn new(transport: T, base_url: &str) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            transport,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn users(&self) -> Users<'_, T> {
        Users::new(self)
    }

    pub fn assets(&self) -> Assets<'_, T> {
        Assets::new(self)
    }

    /// Builds a request for `path`, relative to the base URL unless absolute.
    ///
    /// Leading `/` characters are ignored, so `/api/x` and `api/x` resolve to
    /// the same URL beneath the base path. `body`, when given, is encoded as
    /// JSON. `Content-Type: application/json` is set either way.
    pub fn new_request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.base_url.join(path.trim_start_matches('/'))?;

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(ApiError::Encoding)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Dispatches `request` and classifies the response without decoding it.
    pub fn execute(&self, request: HttpRequest) -> Result<Response, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let raw = self.transport.execute(request)?;
        debug!(status = raw.status, bytes = raw.body.len(), "received response");
        response::check_response(Response::new(raw))
    }

    /// Dispatches `request`, classifies the response and decodes its body.
    pub fn execute_json<V: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<Response<V>, ApiError> {
        let response = self.execute(request)?;
        response::decode(response)
    }

    /// Builds, dispatches, classifies and decodes in one step.
    pub fn send<B, V>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response<V>, ApiError>
    where
        B: Serialize + ?Sized,
        V: DeserializeOwned,
    {
        let request = self.new_request(method, path, body)?;
        self.execute_json(request)
    }

    pub fn get<V: DeserializeOwned>(&self, path: &str) -> Result<Response<V>, ApiError> {
        self.send::<(), V>(HttpMethod::Get, path, None)
    }

    pub fn post<B, V>(&self, path: &str, body: &B) -> Result<Response<V>, ApiError>
    where
        B: Serialize + ?Sized,
        V: DeserializeOwned,
    {
        self.send(HttpMethod::Post, path, Some(body))
    }
}
