use async_trait::async_trait;

use crate::api::{Suggestion, SuggestionFilter};
use crate::error::AppResult;

/// Moderation surface of the backend, consumed by the queue.
/// Implemented over HTTP in `api::HttpApi` and by fakes in tests.
#[async_trait]
pub trait ModerationApi: Send + Sync {
    async fn list(&self, filter: &SuggestionFilter) -> AppResult<Vec<Suggestion>>;
    async fn approve(&self, id: &str) -> AppResult<Suggestion>;
    async fn reject(&self, id: &str) -> AppResult<Suggestion>;
}
