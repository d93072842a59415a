//! Authentication strategies.
//!
//! # Design
//! An [`Authenticator`] turns a request into an authenticated copy of it.
//! [`AuthTransport`] pairs an authenticator with an inner [`Transport`] and is
//! a transport itself, so the client only ever sees one `Transport` and never
//! knows which credentials are in play.
//!
//! `intercept` borrows the caller's request and returns a clone with its own
//! header map; the original cannot be modified. Credentials are fixed at
//! construction and held as [`SecretString`] so they stay out of `Debug`
//! output.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportError, UreqTransport};
use crate::types::AuthenticateInfo;

/// Header carrying the one-time password for accounts with two-factor auth.
pub const OTP_HEADER: &str = "x-jms-otp";

/// Adds authentication material to outgoing requests.
pub trait Authenticator: Send + Sync {
    /// Returns an authenticated copy of `request`.
    fn intercept(&self, request: &HttpRequest) -> HttpRequest;

    /// Wraps `inner` so that every request it executes is authenticated.
    fn transport<T: Transport>(self, inner: T) -> AuthTransport<Self, T>
    where
        Self: Sized,
    {
        AuthTransport::new(self, inner)
    }

    /// Same as [`transport`](Self::transport) over a default [`UreqTransport`].
    fn into_transport(self) -> AuthTransport<Self, UreqTransport>
    where
        Self: Sized,
    {
        AuthTransport::new(self, UreqTransport::new())
    }
}

/// HTTP Basic authentication with a fixed username and password.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    username: String,
    password: SecretString,
    otp: Option<SecretString>,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            otp: None,
        }
    }

    /// Sends `otp` in the one-time-password header on every request.
    /// An empty value disables the header.
    pub fn with_otp(mut self, otp: impl Into<String>) -> Self {
        self.otp = Some(SecretString::from(otp.into()));
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl Authenticator for BasicAuth {
    fn intercept(&self, request: &HttpRequest) -> HttpRequest {
        let credentials = format!("{}:{}", self.username, self.password.expose_secret());
        let value = format!("Basic {}", STANDARD.encode(credentials));
        let mut copy = request.clone();
        set_sensitive(&mut copy, AUTHORIZATION, &value);
        set_otp(&mut copy, self.otp.as_ref());
        copy
    }
}

/// Session token authentication, sent as `Authorization: Bearer <token>`.
///
/// The token is normally obtained from
/// [`Users::authenticate`](crate::users::Users::authenticate).
#[derive(Debug, Clone)]
pub struct TokenAuth {
    token: SecretString,
    otp: Option<SecretString>,
}

impl TokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            otp: None,
        }
    }

    pub fn with_otp(mut self, otp: impl Into<String>) -> Self {
        self.otp = Some(SecretString::from(otp.into()));
        self
    }
}

impl From<&AuthenticateInfo> for TokenAuth {
    fn from(info: &AuthenticateInfo) -> Self {
        Self::new(info.token.clone())
    }
}

impl Authenticator for TokenAuth {
    fn intercept(&self, request: &HttpRequest) -> HttpRequest {
        let value = format!("Bearer {}", self.token.expose_secret());
        let mut copy = request.clone();
        set_sensitive(&mut copy, AUTHORIZATION, &value);
        set_otp(&mut copy, self.otp.as_ref());
        copy
    }
}

fn set_otp(request: &mut HttpRequest, otp: Option<&SecretString>) {
    if let Some(otp) = otp.map(|otp| otp.expose_secret()) {
        if !otp.is_empty() {
            set_sensitive(request, HeaderName::from_static(OTP_HEADER), otp);
        }
    }
}

// Values that are not valid header text are dropped; the server answers 401.
fn set_sensitive(request: &mut HttpRequest, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(mut value) => {
            value.set_sensitive(true);
            request.headers.insert(name, value);
        }
        Err(_) => warn!(header = %name, "credential is not a valid header value, not sent"),
    }
}

/// A [`Transport`] that authenticates each request before delegating to
/// `inner`.
#[derive(Debug, Clone)]
pub struct AuthTransport<A, T = UreqTransport> {
    authenticator: A,
    inner: T,
}

impl<A: Authenticator, T: Transport> AuthTransport<A, T> {
    pub fn new(authenticator: A, inner: T) -> Self {
        Self {
            authenticator,
            inner,
        }
    }

    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }
}

impl<A: Authenticator, T: Transport> Transport for AuthTransport<A, T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let request = self.authenticator.intercept(&request);
        self.inner.execute(request)
    }
}
