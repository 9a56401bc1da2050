//! Typed wrapper over the knowledge-base REST API.

mod http;
mod types;

pub use http::HttpApi;
pub use types::{Suggestion, SuggestionFilter, SuggestionStatus, TokenResponse};
