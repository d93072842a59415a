//! Response envelope: status classification, JSON decoding and pagination.
//!
//! # Design
//! A [`Response`] is built from every [`HttpResponse`] the transport returns,
//! before the status is looked at, so that failures can hand the envelope
//! back inside [`ApiError`]. Decoding consumes the body bytes exactly once.
//!
//! Pagination is best effort. A missing or malformed `Link` header leaves the
//! page cursors at zero and never fails the call.

use bytes::Bytes;
use http::header::{HeaderMap, LINK};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Decoded and classified wrapper around an HTTP response.
///
/// `V` is the decoded body; it is `()` when the caller did not ask for one.
#[derive(Debug, Clone)]
pub struct Response<V = ()> {
    pub status: u16,
    pub headers: HeaderMap,
    /// Raw body as received. Kept so failed responses can be inspected.
    pub body: Bytes,
    pub pagination: Pagination,
    pub value: V,
}

impl Response {
    /// Wraps a transport response and extracts its pagination cursors.
    pub fn new(raw: HttpResponse) -> Self {
        let pagination = Pagination::from_headers(&raw.headers);
        Response {
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
            pagination,
            value: (),
        }
    }

    /// Decodes the raw body as JSON without touching the envelope.
    ///
    /// Useful for reading a structured error payload out of a failed response.
    pub fn json<E: DeserializeOwned>(&self) -> Result<E, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

impl<V> Response<V> {
    pub fn is_success(&self) -> bool {
        is_success(self.status)
    }

    pub fn into_value(self) -> V {
        self.value
    }

    /// Transforms the decoded value, keeping status, headers and cursors.
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Response<U> {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
            pagination: self.pagination,
            value: f(self.value),
        }
    }
}

/// Status codes 200 through 299 inclusive are success.
pub fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Fails with [`ApiError::RequestFailed`] when the status is not a success.
///
/// The envelope travels inside the error; the body is left for the caller to
/// interpret.
pub fn check_response(response: Response) -> Result<Response, ApiError> {
    if response.is_success() {
        return Ok(response);
    }
    Err(ApiError::RequestFailed {
        status: response.status,
        response: Box::new(response),
    })
}

/// Decodes the body of a successful response into `V`.
///
/// On failure the envelope is returned inside [`ApiError::Decoding`].
pub fn decode<V: DeserializeOwned>(response: Response) -> Result<Response<V>, ApiError> {
    match serde_json::from_slice::<V>(&response.body) {
        Ok(value) => Ok(response.map(|()| value)),
        Err(source) => Err(ApiError::Decoding {
            source,
            response: Box::new(response),
        }),
    }
}

/// Paging information for a response.
///
/// `start_at`, `max_results` and `total` are filled by services that page with
/// offset and limit. The page cursors come from the `Link` header. Zero means
/// absent or unknown throughout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub start_at: usize,
    pub max_results: usize,
    pub total: usize,

    pub next_page: u32,
    pub prev_page: u32,
    pub first_page: u32,
    pub last_page: u32,
}

impl Pagination {
    /// Reads page cursors from the first `Link` header, if any.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(Self::from_link)
            .unwrap_or_default()
    }

    /// Parses a `Link` header value of the form
    /// `<url>; rel="next", <url>; rel="last"`.
    ///
    /// Entries without a `rel`, without angle brackets around the URL, with
    /// an unparsable URL, or whose URL has no integer `page` query parameter
    /// are skipped.
    pub fn from_link(header: &str) -> Self {
        let mut pagination = Self::default();

        for link in header.split(',') {
            let segments: Vec<&str> = link.trim().split(';').collect();

            // href and at least one param
            if segments.len() < 2 {
                debug!(link, "skipping link entry without parameters");
                continue;
            }

            let Some(href) = segments[0]
                .strip_prefix('<')
                .and_then(|s| s.strip_suffix('>'))
            else {
                debug!(link, "skipping link entry without <url>");
                continue;
            };

            let Some(page) = page_param(href) else {
                debug!(href, "skipping link entry without a valid url and integer page");
                continue;
            };

            for segment in &segments[1..] {
                match segment.trim() {
                    r#"rel="next""# => pagination.next_page = page,
                    r#"rel="prev""# => pagination.prev_page = page,
                    r#"rel="first""# => pagination.first_page = page,
                    r#"rel="last""# => pagination.last_page = page,
                    _ => {}
                }
            }
        }

        pagination
    }

    pub fn has_next(&self) -> bool {
        self.next_page != 0
    }
}

/// Extracts the `page` query parameter from an absolute or relative href.
///
/// Relative hrefs are resolved against a placeholder origin; only the query
/// is read afterwards.
fn page_param(href: &str) -> Option<u32> {
    let origin = Url::parse("http://localhost/").ok()?;
    let url = Url::options().base_url(Some(&origin)).parse(href).ok()?;
    let (_, page) = url.query_pairs().find(|(k, _)| k == "page")?;
    page.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde::Deserialize;

    fn raw(status: u16, body: &'static str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HeaderMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        username: String,
    }

    #[test]
    fn success_range_is_inclusive() {
        assert!(!is_success(199));
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(is_success(299));
        assert!(!is_success(300));
    }

    #[test]
    fn every_non_2xx_status_fails_with_code_preserved() {
        for status in (100..600).filter(|s| !(200..300).contains(s)) {
            let err = check_response(Response::new(raw(status, ""))).unwrap_err();
            match err {
                ApiError::RequestFailed {
                    status: code,
                    response,
                } => {
                    assert_eq!(code, status);
                    assert_eq!(response.status, status);
                }
                other => panic!("status {status}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn decode_success() {
        let resp = decode::<User>(Response::new(raw(200, r#"{"username":"admin"}"#))).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.value.username, "admin");
    }

    #[test]
    fn decode_failure_keeps_envelope() {
        let mut http = raw(200, "not json");
        http.headers.insert("x-request-id", HeaderValue::from_static("abc"));
        let err = decode::<User>(Response::new(http)).unwrap_err();
        match err {
            ApiError::Decoding { response, .. } => {
                assert_eq!(response.status, 200);
                assert_eq!(response.headers["x-request-id"], "abc");
                assert_eq!(&response.body[..], b"not json");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failed_response_body_can_be_read_as_json() {
        let err = check_response(Response::new(raw(400, r#"{"detail":"bad"}"#))).unwrap_err();
        let detail: serde_json::Value = err.response().unwrap().json().unwrap();
        assert_eq!(detail["detail"], "bad");
    }

    #[test]
    fn link_next_and_prev() {
        let p = Pagination::from_link(
            r#"<https://x/?page=2>; rel="next", <https://x/?page=1>; rel="prev""#,
        );
        assert_eq!(p.next_page, 2);
        assert_eq!(p.prev_page, 1);
        assert_eq!(p.first_page, 0);
        assert_eq!(p.last_page, 0);
        assert!(p.has_next());
    }

    #[test]
    fn link_all_four_relations() {
        let p = Pagination::from_link(concat!(
            r#"<https://api/users/?page_size=10&page=3>; rel="next", "#,
            r#"<https://api/users/?page=1&page_size=10>; rel="prev", "#,
            r#"<https://api/users/?page=1>; rel="first", "#,
            r#"<https://api/users/?page=9>; rel="last""#,
        ));
        assert_eq!(
            p,
            Pagination {
                next_page: 3,
                prev_page: 1,
                first_page: 1,
                last_page: 9,
                ..Pagination::default()
            }
        );
    }

    #[test]
    fn link_malformed_entries_are_skipped() {
        let p = Pagination::from_link(concat!(
            r#"<https://x/?page=5>, "#,
            r#"<https://x/?page=abc>; rel="prev", "#,
            r#"https://x/?page=7; rel="first", "#,
            r#"<https://x/?page=9>; rel="last""#,
        ));
        assert_eq!(p.next_page, 0);
        assert_eq!(p.prev_page, 0);
        assert_eq!(p.first_page, 0);
        assert_eq!(p.last_page, 9);
    }

    #[test]
    fn link_relative_href_is_accepted() {
        let p = Pagination::from_link(r#"</api/assets/v1/assets/?page=4#top>; rel="next""#);
        assert_eq!(p.next_page, 4);
    }

    #[test]
    fn link_unparsable_url_is_skipped() {
        let p = Pagination::from_link(concat!(
            r#"<http://[::1?page=2>; rel="next", "#,
            r#"<http://h:99999/?page=3>; rel="prev", "#,
            r#"<http://h/?page=4>; rel="last""#,
        ));
        assert_eq!(p.next_page, 0);
        assert_eq!(p.prev_page, 0);
        assert_eq!(p.last_page, 4);
    }

    #[test]
    fn missing_link_header_yields_zero_cursors() {
        let resp = Response::new(raw(200, "[]"));
        assert_eq!(resp.pagination, Pagination::default());
        assert!(!resp.pagination.has_next());
    }

    #[test]
    fn link_header_populates_envelope() {
        let mut http = raw(200, "[]");
        http.headers.insert(
            LINK,
            HeaderValue::from_static(r#"<http://h/?page=2>; rel="next""#),
        );
        assert_eq!(Response::new(http).pagination.next_page, 2);
    }
}
