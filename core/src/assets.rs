//! Asset endpoints.

use crate::client::Client;
use crate::error::ApiError;
use crate::response::Response;
use crate::transport::Transport;
use crate::types::{Asset, ListOptions, Page};
use crate::users::with_query;

const ASSETS_PATH: &str = "api/assets/v1/assets/";

/// Handle for the asset endpoints, borrowed from [`Client::assets`].
#[derive(Debug)]
pub struct Assets<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Assets<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Response<Vec<Asset>>, ApiError> {
        self.client.get(ASSETS_PATH)
    }

    pub fn list_page(&self, options: &ListOptions) -> Result<Response<Page<Asset>>, ApiError> {
        let offset = options.offset.to_string();
        let limit = options.limit.to_string();
        let path = with_query(
            ASSETS_PATH,
            &[("offset", offset.as_str()), ("limit", limit.as_str())],
        );
        let mut response: Response<Page<Asset>> = self.client.get(&path)?;
        response.pagination.start_at = options.offset;
        response.pagination.max_results = options.limit;
        response.pagination.total = response.value.count;
        Ok(response)
    }

    /// Matches hostname, IP and other text fields server side.
    pub fn search(&self, term: &str) -> Result<Response<Vec<Asset>>, ApiError> {
        self.client.get(&with_query(ASSETS_PATH, &[("search", term)]))
    }

    /// Fetches one asset. An unknown id fails with status 404.
    pub fn get(&self, id: &str) -> Result<Response<Asset>, ApiError> {
        let id: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
        self.client.get(&format!("{ASSETS_PATH}{id}/"))
    }
}
