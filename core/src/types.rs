//! Domain DTOs for the JumpServer v1 API.
//!
//! # Design
//! These types mirror the server's payloads but are defined independently of
//! the mock-server crate; integration tests catch schema drift. Every field
//! defaults, so partial payloads (such as a bare `{"username":"admin"}`)
//! decode without error, and `null` decodes as the field's default.

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A JumpServer user account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub groups: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub groups_display: String,
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub role_display: String,
    #[serde(deserialize_with = "null_as_default")]
    pub avatar_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub wechat: String,
    pub phone: Option<String>,
    pub otp_level: Option<u8>,
    #[serde(deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source_display: String,
    pub is_valid: Option<bool>,
    pub is_expired: Option<bool>,
    pub is_active: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_by: String,
    pub is_first_login: Option<bool>,
    pub date_password_last_updated: Option<String>,
    pub date_expired: Option<String>,
}

/// A managed asset (host or device).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Asset {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub org_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hostname: String,
    #[serde(deserialize_with = "null_as_default")]
    pub protocol: String,
    #[serde(deserialize_with = "null_as_default")]
    pub port: u16,
    #[serde(deserialize_with = "null_as_default")]
    pub platform: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    pub public_ip: Option<String>,
    pub number: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub sn: Option<String>,
    pub cpu_model: Option<String>,
    pub cpu_count: Option<String>,
    pub cpu_cores: Option<String>,
    pub cpu_vcpus: Option<String>,
    pub memory: Option<String>,
    pub disk_total: Option<String>,
    pub disk_info: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub os_arch: Option<String>,
    pub hostname_raw: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_by: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date_created: String,
    #[serde(deserialize_with = "null_as_default")]
    pub comment: String,
    pub domain: Option<String>,
    pub admin_user: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub nodes: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    pub hardware_info: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub connectivity: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub org_name: String,
}

/// Request payload for the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub public_key: String,
    pub remote_addr: String,
    pub login_type: String,
}

impl LoginRequest {
    /// A password login; the remaining fields are sent empty.
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            public_key: String::new(),
            remote_addr: String::new(),
            login_type: String::new(),
        }
    }
}

/// Response of the login endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthenticateInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    pub user: Option<User>,
}

/// One page of an offset/limit listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    pub count: usize,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Offset and limit for a paged listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub offset: usize,
    pub limit: usize,
}

impl ListOptions {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
        }
    }
}
