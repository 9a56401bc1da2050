use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::api::{Suggestion, SuggestionFilter};
use crate::error::{AppError, AppResult};

use super::pending::{ActionKind, MoveDirection, PendingList, QueueEntity};
use super::provider::ModerationApi;

impl QueueEntity for Suggestion {
    fn entity_id(&self) -> &str {
        &self.id
    }
}

/// Drives the pending-suggestion list through approve/reject actions with
/// optimistic local mutation: a confirmed action updates the list in place,
/// no refetch. The list is only touched inside the lock, on either side of
/// the awaited API call; the per-id marker serializes actions per entity
/// while leaving distinct entities free to proceed concurrently.
pub struct ModerationQueue {
    api: Arc<dyn ModerationApi>,
    list: Mutex<PendingList<Suggestion>>,
}

impl ModerationQueue {
    pub fn new(api: Arc<dyn ModerationApi>) -> Self {
        Self { api, list: Mutex::new(PendingList::new()) }
    }

    /// Replace the list from the server. Overlapping loads are resolved by
    /// sequence: only the newest response is applied, stale ones are
    /// dropped. A failed fetch leaves the current list untouched.
    pub async fn load(&self, filter: &SuggestionFilter) -> AppResult<usize> {
        let seq = self.list.lock().begin_load();
        let entries = self.api.list(filter).await?;
        let mut list = self.list.lock();
        if list.apply_load(seq, entries) {
            debug!(seq, n = list.len(), "moderation.load applied");
        } else {
            debug!(seq, "moderation.load discarded stale response");
        }
        Ok(list.len())
    }

    /// Approve a pending suggestion. `Ok(Some)` carries the server-confirmed
    /// entity, already removed from the local list; `Ok(None)` means the id
    /// was not present (quiet no-op).
    pub async fn approve(&self, id: &str) -> AppResult<Option<Suggestion>> {
        self.invoke(id, ActionKind::Approve).await
    }

    /// Reject a pending suggestion. Same contract as `approve`.
    pub async fn reject(&self, id: &str) -> AppResult<Option<Suggestion>> {
        self.invoke(id, ActionKind::Reject).await
    }

    async fn invoke(&self, id: &str, kind: ActionKind) -> AppResult<Option<Suggestion>> {
        let ticket = match self.list.lock().begin_action(id, kind)? {
            Some(ticket) => ticket,
            None => {
                debug!(id, action = kind.as_str(), "moderation.invoke: id not present");
                return Ok(None);
            }
        };
        let result = match kind {
            ActionKind::Approve => self.api.approve(id).await,
            ActionKind::Reject => self.api.reject(id).await,
        };
        let mut list = self.list.lock();
        match result {
            Ok(entity) => {
                list.complete_action(id, ticket, true);
                debug!(id, action = kind.as_str(), "moderation.invoke: confirmed");
                Ok(Some(entity))
            }
            Err(e) => {
                list.complete_action(id, ticket, false);
                debug!(id, action = kind.as_str(), "moderation.invoke: failed: {}", e);
                Err(AppError::action(id, e.to_string()))
            }
        }
    }

    /// Local reorder helper; never talks to the server.
    pub fn move_suggestion(&self, id: &str, direction: MoveDirection) -> bool {
        self.list.lock().move_entity(id, direction)
    }

    pub fn snapshot(&self) -> Vec<Suggestion> {
        self.list.lock().entries().to_vec()
    }

    pub fn len(&self) -> usize {
        self.list.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.lock().is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.list.lock().is_loaded()
    }

    pub fn in_flight_ids(&self) -> Vec<String> {
        self.list.lock().in_flight_ids()
    }
}
