use async_trait::async_trait;
use serde::Serialize;

use super::principal::Identity;
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Authentication surface of the backend, consumed by the session manager.
/// Implemented over HTTP in `api::HttpApi` and by fakes in tests.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Validate a bearer token and return the identity it belongs to.
    async fn fetch_current_user(&self, token: &str) -> AppResult<Identity>;
    /// Exchange credentials for a bearer token.
    async fn login(&self, credentials: &Credentials) -> AppResult<String>;
    /// Create an account and return a bearer token for it.
    async fn register(&self, fields: &RegisterRequest) -> AppResult<String>;
}
