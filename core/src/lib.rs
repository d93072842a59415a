//! Synchronous client for the JumpServer REST API.
//!
//! # Overview
//! Resolves endpoint paths against a base URL, authenticates each request
//! through a pluggable strategy, decodes JSON bodies and reads `Link`
//! pagination headers. One blocking request per call.
//!
//! # Design
//! - `Client` holds a base URL and a [`Transport`]; it has no mutable state.
//! - Authentication ([`BasicAuth`], [`TokenAuth`]) wraps a transport rather
//!   than living in the client, so the client depends only on `Transport`.
//! - Every response becomes a [`Response`] envelope before its status is
//!   checked; failures that have one carry it inside [`ApiError`].
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//!
//! ```no_run
//! use jms_core::{Authenticator, BasicAuth, Client};
//!
//! let transport = BasicAuth::new("admin", "admin").into_transport();
//! let client = Client::new(transport, "http://localhost:8080")?;
//! for user in client.users().list()?.into_value() {
//!     println!("{}", user.username);
//! }
//! # Ok::<(), jms_core::ApiError>(())
//! ```

pub mod assets;
pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;
pub mod types;
pub mod users;

pub use auth::{AuthTransport, Authenticator, BasicAuth, TokenAuth, OTP_HEADER};
pub use client::Client;
pub use error::ApiError;
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::{Pagination, Response};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{Asset, AuthenticateInfo, ListOptions, LoginRequest, Page, User};
