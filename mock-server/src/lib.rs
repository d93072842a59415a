//! In-memory stand-in for the JumpServer v1 API.
//!
//! Serves the user, login and asset endpoints with seeded data. Every route
//! except login requires `Authorization: Basic` with the seeded credentials or
//! `Authorization: Bearer` with a token issued by the login route. When the
//! one-time-password header is present it must carry [`OTP`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin";
pub const OTP: &str = "123456";
pub const OTP_HEADER: &str = "x-jms-otp";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub groups: Vec<String>,
    pub role: String,
    pub is_active: bool,
    pub otp_level: u8,
    pub source: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub hostname: String,
    pub ip: String,
    pub protocol: String,
    pub port: u16,
    pub platform: String,
    pub is_active: bool,
    pub public_ip: Option<String>,
    pub nodes: Vec<String>,
    pub labels: Vec<String>,
    pub connectivity: i32,
    pub org_name: String,
}

#[derive(Debug, Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub remote_addr: String,
    #[serde(default)]
    pub login_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paged<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub username: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Clone)]
pub struct AppState {
    users: Arc<Vec<User>>,
    assets: Arc<HashMap<Uuid, Asset>>,
    tokens: Arc<RwLock<HashSet<String>>>,
}

impl AppState {
    fn seeded() -> Self {
        let users = vec![
            user(ADMIN_USERNAME, "Administrator", "Admin"),
            user("alice", "Alice Liddell", "User"),
            user("bob", "Bob Stone", "User"),
        ];
        let assets: HashMap<Uuid, Asset> = [
            asset("web-01", "10.0.0.11", 22, "Linux"),
            asset("web-02", "10.0.0.12", 22, "Linux"),
            asset("db-01", "10.0.1.20", 3389, "Windows"),
        ]
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
        Self {
            users: Arc::new(users),
            assets: Arc::new(assets),
            tokens: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    async fn authorize(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        if let Some(otp) = headers.get(OTP_HEADER) {
            if otp != OTP {
                return Err(StatusCode::UNAUTHORIZED);
            }
        }
        let credentials = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if let Some(encoded) = credentials.strip_prefix("Basic ") {
            let decoded = STANDARD
                .decode(encoded)
                .map_err(|_| StatusCode::UNAUTHORIZED)?;
            if decoded == format!("{ADMIN_USERNAME}:{ADMIN_PASSWORD}").as_bytes() {
                return Ok(());
            }
        } else if let Some(token) = credentials.strip_prefix("Bearer ") {
            if self.tokens.read().await.contains(token) {
                return Ok(());
            }
        }
        Err(StatusCode::UNAUTHORIZED)
    }
}

fn user(username: &str, name: &str, role: &str) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        username: username.to_string(),
        email: format!("{username}@jumpserver.local"),
        groups: vec!["Default".to_string()],
        role: role.to_string(),
        is_active: true,
        otp_level: 0,
        source: "local".to_string(),
    }
}

fn asset(hostname: &str, ip: &str, port: u16, platform: &str) -> Asset {
    Asset {
        id: Uuid::new_v4(),
        hostname: hostname.to_string(),
        ip: ip.to_string(),
        protocol: if port == 22 { "ssh" } else { "rdp" }.to_string(),
        port,
        platform: platform.to_string(),
        is_active: true,
        public_ip: None,
        nodes: vec!["Default".to_string()],
        labels: Vec::new(),
        connectivity: 1,
        org_name: "DEFAULT".to_string(),
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/api/users/v1/users/", get(list_users))
        .route("/api/users/v1/auth/", post(authenticate))
        .route("/api/assets/v1/assets/", get(list_assets))
        .route("/api/assets/v1/assets/{id}/", get(get_asset))
        .with_state(AppState::seeded())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ListParams>,
) -> Result<Response, StatusCode> {
    state.authorize(&headers).await?;
    let users: Vec<User> = state
        .users
        .iter()
        .filter(|u| params.username.as_ref().map_or(true, |name| &u.username == name))
        .filter(|u| {
            params.search.as_ref().map_or(true, |term| {
                u.username.contains(term.as_str()) || u.name.contains(term.as_str())
            })
        })
        .cloned()
        .collect();
    info!(count = users.len(), "list users");
    Ok(listing(users, &params, uri.path()))
}

async fn authenticate(
    State(state): State<AppState>,
    Json(login): Json<Login>,
) -> Result<Json<LoginResponse>, StatusCode> {
    if login.username != ADMIN_USERNAME || login.password != ADMIN_PASSWORD {
        info!(username = %login.username, "login rejected");
        return Err(StatusCode::BAD_REQUEST);
    }
    let user = state
        .users
        .iter()
        .find(|u| u.username == login.username)
        .cloned()
        .ok_or(StatusCode::BAD_REQUEST)?;
    let token = Uuid::new_v4().simple().to_string();
    state.tokens.write().await.insert(token.clone());
    info!(username = %login.username, login_type = %login.login_type, "login accepted");
    Ok(Json(LoginResponse { token, user }))
}

async fn list_assets(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ListParams>,
) -> Result<Response, StatusCode> {
    state.authorize(&headers).await?;
    let mut assets: Vec<Asset> = state
        .assets
        .values()
        .filter(|a| {
            params
                .search
                .as_ref()
                .map_or(true, |term| a.hostname.contains(term.as_str()) || a.ip.contains(term.as_str()))
        })
        .cloned()
        .collect();
    assets.sort_by(|a, b| a.hostname.cmp(&b.hostname));
    info!(count = assets.len(), "list assets");
    Ok(listing(assets, &params, uri.path()))
}

async fn get_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Asset>, StatusCode> {
    state.authorize(&headers).await?;
    state
        .assets
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Shapes a listing the way the real server does: a bare array by default,
/// `{count, next, previous, results}` for `offset`/`limit`, and a bare array
/// with a `Link` header for `page`/`page_size`.
fn listing<T: Serialize>(items: Vec<T>, params: &ListParams, path: &str) -> Response {
    if let Some(limit) = params.limit {
        let offset = params.offset.unwrap_or(0);
        let count = items.len();
        let end = offset.saturating_add(limit);
        let next = (end < count).then(|| format!("{path}?offset={end}&limit={limit}"));
        let previous =
            (offset > 0).then(|| format!("{path}?offset={}&limit={limit}", offset.saturating_sub(limit)));
        let results = items.into_iter().skip(offset).take(limit).collect();
        return Json(Paged {
            count,
            next,
            previous,
            results,
        })
        .into_response();
    }

    if let Some(page) = params.page {
        let page = page.max(1);
        let size = params.page_size.unwrap_or(10).max(1);
        let last = items.len().div_ceil(size).max(1);
        let link = link_header(path, page, size, last);
        let results: Vec<T> = items
            .into_iter()
            .skip((page - 1).saturating_mul(size))
            .take(size)
            .collect();
        let mut response = Json(results).into_response();
        if let Ok(value) = HeaderValue::from_str(&link) {
            response.headers_mut().insert(header::LINK, value);
        }
        return response;
    }

    Json(items).into_response()
}

fn link_header(path: &str, page: usize, size: usize, last: usize) -> String {
    let href = |p: usize| format!("<{path}?page={p}&page_size={size}>");
    let mut links = Vec::new();
    if page < last {
        links.push(format!(r#"{}; rel="next""#, href(page + 1)));
    }
    if page > 1 {
        links.push(format!(r#"{}; rel="prev""#, href(page - 1)));
    }
    links.push(format!(r#"{}; rel="first""#, href(1)));
    links.push(format!(r#"{}; rel="last""#, href(last)));
    links.join(", ")
}
