use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::identity::{AuthApi, Credentials, Identity, RegisterRequest, TokenStore};
use crate::review::ModerationApi;

use super::types::{Suggestion, SuggestionFilter, TokenResponse};

/// HTTP implementation of the auth and moderation collaborator traits.
/// Holds a base URL, a shared client and the token store; authenticated
/// endpoints pick up whatever bearer token is currently stored, so a login
/// or logout is visible to every subsequent request. Endpoint paths follow
/// the backend's `/v1` REST surface.
#[derive(Clone)]
pub struct HttpApi {
    base: Url,
    client: Client,
    store: Arc<dyn TokenStore>,
}

impl HttpApi {
    pub fn new(base: &str, store: Arc<dyn TokenStore>) -> AppResult<Self> {
        let base = Url::parse(base).map_err(|e| AppError::user(format!("invalid base URL: {}", e)))?;
        let client = Client::builder().build()?;
        Ok(Self { base, client, store })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> AppResult<Url> {
        self.base
            .join(path)
            .map_err(|e| AppError::internal(format!("bad endpoint path '{}': {}", path, e)))
    }

    /// Attach the stored bearer token, when one exists. Requests without a
    /// token still go out; the server answers 401 and the taxonomy maps it.
    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match self.store.get() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Check status before touching the body; non-2xx responses are mapped
    /// into the error taxonomy with the backend's `detail` text when present.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> AppResult<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::from_status(status.as_u16(), &body));
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn fetch_current_user(&self, token: &str) -> AppResult<Identity> {
        let url = self.url("/v1/users/me")?;
        let resp = self.client.get(url).bearer_auth(token).send().await?;
        Self::decode(resp).await
    }

    async fn login(&self, credentials: &Credentials) -> AppResult<String> {
        let url = self.url("/v1/users/login")?;
        // The backend takes the OAuth2 password form, not JSON
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let resp = self.client.post(url).form(&form).send().await?;
        let token: TokenResponse = Self::decode(resp).await?;
        debug!(user = %credentials.username, "api.login ok");
        Ok(token.access_token)
    }

    async fn register(&self, fields: &RegisterRequest) -> AppResult<String> {
        let url = self.url("/v1/users/register")?;
        let resp = self.client.post(url).json(fields).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::from_status(status.as_u16(), &body));
        }
        debug!(user = %fields.username, "api.register ok");
        // Registration returns the created profile; a login round-trip
        // issues the token for it.
        let creds = Credentials::new(&fields.username, &fields.password);
        self.login(&creds).await
    }
}

#[async_trait]
impl ModerationApi for HttpApi {
    async fn list(&self, filter: &SuggestionFilter) -> AppResult<Vec<Suggestion>> {
        let url = self.url("/v1/moderation/suggestions")?;
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(status) = filter.status {
            query.push(("status", status.as_str().to_string()));
        }
        if let Some(skip) = filter.skip {
            query.push(("skip", skip.to_string()));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }
        let resp = self.authed(self.client.get(url).query(&query)).send().await?;
        Self::decode(resp).await
    }

    async fn approve(&self, id: &str) -> AppResult<Suggestion> {
        let url = self.url(&format!("/v1/moderation/suggestions/{}/approve", id))?;
        let resp = self.authed(self.client.post(url)).send().await?;
        Self::decode(resp).await
    }

    async fn reject(&self, id: &str) -> AppResult<Suggestion> {
        let url = self.url(&format!("/v1/moderation/suggestions/{}/reject", id))?;
        let resp = self.authed(self.client.post(url)).send().await?;
        Self::decode(resp).await
    }
}
