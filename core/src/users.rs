//! User endpoints: listing, lookup, search and login.

use url::form_urlencoded;

use crate::client::Client;
use crate::error::ApiError;
use crate::response::Response;
use crate::transport::Transport;
use crate::types::{AuthenticateInfo, ListOptions, LoginRequest, Page, User};

const USERS_PATH: &str = "api/users/v1/users/";
const AUTH_PATH: &str = "api/users/v1/auth/";

/// Handle for the user endpoints, borrowed from [`Client::users`].
#[derive(Debug)]
pub struct Users<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Users<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Response<Vec<User>>, ApiError> {
        self.client.get(USERS_PATH)
    }

    /// Fetches one page and records offset, limit and total on the envelope.
    pub fn list_page(&self, options: &ListOptions) -> Result<Response<Page<User>>, ApiError> {
        let offset = options.offset.to_string();
        let limit = options.limit.to_string();
        let path = with_query(
            USERS_PATH,
            &[("offset", offset.as_str()), ("limit", limit.as_str())],
        );
        let mut response: Response<Page<User>> = self.client.get(&path)?;
        response.pagination.start_at = options.offset;
        response.pagination.max_results = options.limit;
        response.pagination.total = response.value.count;
        Ok(response)
    }

    /// Looks a user up by exact username. `None` when nobody matches.
    pub fn get(&self, username: &str) -> Result<Response<Option<User>>, ApiError> {
        let path = with_query(USERS_PATH, &[("username", username)]);
        let response: Response<Vec<User>> = self.client.get(&path)?;
        Ok(response.map(|users| users.into_iter().next()))
    }

    pub fn search(&self, term: &str) -> Result<Response<Vec<User>>, ApiError> {
        self.client.get(&with_query(USERS_PATH, &[("search", term)]))
    }

    /// Logs in and returns the session token to use with
    /// [`TokenAuth`](crate::auth::TokenAuth).
    pub fn authenticate(
        &self,
        login: &LoginRequest,
    ) -> Result<Response<AuthenticateInfo>, ApiError> {
        self.client.post(AUTH_PATH, login)
    }
}

pub(crate) fn with_query(path: &str, pairs: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{path}?{query}")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;
    use http::HeaderMap;

    use super::*;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};
    use crate::transport::TransportError;

    struct Canned {
        body: &'static str,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last(&self) -> HttpRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for Canned {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: 200,
                headers: HeaderMap::new(),
                body: Bytes::from_static(self.body.as_bytes()),
            })
        }
    }

    #[test]
    fn query_values_are_encoded() {
        assert_eq!(
            with_query(USERS_PATH, &[("search", "a b&c=d")]),
            "api/users/v1/users/?search=a+b%26c%3Dd"
        );
    }

    #[test]
    fn get_returns_first_match() {
        let canned = Canned::new(r#"[{"username":"admin"},{"username":"admin2"}]"#);
        let client = Client::new(&canned, "http://jms.local").unwrap();

        let user = client.users().get("admin").unwrap().into_value();

        assert_eq!(user.unwrap().username, "admin");
        assert_eq!(
            canned.last().url.as_str(),
            "http://jms.local/api/users/v1/users/?username=admin"
        );
    }

    #[test]
    fn get_without_match_is_none() {
        let canned = Canned::new("[]");
        let client = Client::new(&canned, "http://jms.local").unwrap();
        assert!(client.users().get("ghost").unwrap().value.is_none());
    }

    #[test]
    fn list_page_fills_counts() {
        let canned = Canned::new(r#"{"count":7,"next":null,"previous":null,"results":[{"username":"a"},{"username":"b"}]}"#);
        let client = Client::new(&canned, "http://jms.local").unwrap();

        let resp = client.users().list_page(&ListOptions::new(4, 2)).unwrap();

        assert_eq!(resp.pagination.start_at, 4);
        assert_eq!(resp.pagination.max_results, 2);
        assert_eq!(resp.pagination.total, 7);
        assert_eq!(resp.value.results.len(), 2);
        assert_eq!(canned.last().url.query(), Some("offset=4&limit=2"));
    }

    #[test]
    fn authenticate_posts_login_body() {
        let canned = Canned::new(r#"{"token":"abc","user":{"username":"admin"}}"#);
        let client = Client::new(&canned, "http://jms.local").unwrap();

        let info = client
            .users()
            .authenticate(&LoginRequest::password("admin", "admin"))
            .unwrap()
            .into_value();

        assert_eq!(info.token, "abc");
        assert_eq!(info.user.unwrap().username, "admin");

        let sent = canned.last();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url.path(), "/api/users/v1/auth/");
        let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["username"], "admin");
        assert_eq!(body["login_type"], "");
    }
}
