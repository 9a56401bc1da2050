//! Unified application error model and mapping helpers.
//! This module provides a common error enum used across the session manager,
//! the moderation queue and the HTTP client, along with helpers to classify
//! remote failures into the client-side taxonomy.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Login, registration or token validation rejected by the server.
    #[error("auth: {code}: {message}")]
    Auth { code: String, message: String },
    /// A previous action on this entity is still awaiting its response.
    #[error("an action is already in flight for '{id}'")]
    AlreadyInFlight { id: String },
    /// The server refused or failed a moderation action; the entry is kept
    /// and the caller may retry.
    #[error("action failed for '{id}': {message}")]
    Action { id: String, message: String },
    /// Transport or protocol failure talking to the HTTP API.
    #[error("api: {message}")]
    Api { status: Option<u16>, message: String },
    #[error("invalid input: {message}")]
    UserInput { message: String },
    #[error("internal: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self {
        AppError::Auth { code: code.into(), message: msg.into() }
    }
    pub fn already_in_flight<S: Into<String>>(id: S) -> Self {
        AppError::AlreadyInFlight { id: id.into() }
    }
    pub fn action<S: Into<String>, M: Into<String>>(id: S, msg: M) -> Self {
        AppError::Action { id: id.into(), message: msg.into() }
    }
    pub fn api<S: Into<String>>(status: Option<u16>, msg: S) -> Self {
        AppError::Api { status, message: msg.into() }
    }
    pub fn user<S: Into<String>>(msg: S) -> Self {
        AppError::UserInput { message: msg.into() }
    }
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        AppError::Internal { message: msg.into() }
    }

    /// Whether retrying the same call can reasonably succeed. Duplicate
    /// submissions and bad input are not retryable as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Action { .. } | AppError::Api { .. })
    }

    /// Classify a non-success HTTP response. The backend wraps error text in
    /// a JSON `detail` field; fall back to the raw body when it does not.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(|s| s.to_string()))
            .unwrap_or_else(|| {
                if body.is_empty() { format!("HTTP {}", status) } else { body.to_string() }
            });
        match status {
            401 => AppError::Auth { code: "unauthorized".into(), message },
            403 => AppError::Auth { code: "forbidden".into(), message },
            _ => AppError::Api { status: Some(status), message },
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Api {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
