//! Environment-driven client configuration.
//! The library itself takes its collaborators by injection; this module only
//! serves the binaries, which resolve their defaults from `NTTL_*` env vars.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TOKEN_FILE: &str = ".nttl_token";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the knowledge-base HTTP API.
    pub api_url: String,
    /// Path of the file the bearer token is persisted to between runs.
    pub token_file: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let api_url = env::var("NTTL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let token_file = env::var("NTTL_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_FILE));
        Self { api_url, token_file }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
        }
    }
}
