//! Pure state machine for a list of entities awaiting single-shot actions.
//! All transitions here are synchronous; the async orchestration around the
//! network call lives in `queue`. Each entity goes idle, then in flight,
//! then is removed on success or returns to idle on failure, and many
//! entities may be in flight at once.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Entities that can sit in a pending list.
pub trait QueueEntity {
    fn entity_id(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Approve,
    Reject,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Approve => "approve",
            ActionKind::Reject => "reject",
        }
    }
}

/// Identifies one in-flight action. A completion is only honored when its
/// ticket still matches the marker, so a completion overtaken by a reload
/// cannot clobber newer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTicket(Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug)]
pub struct PendingList<E: QueueEntity> {
    entries: Vec<E>,
    in_flight: HashMap<String, (ActionKind, ActionTicket)>,
    next_load_seq: u64,
    applied_load_seq: u64,
    loaded: bool,
}

impl<E: QueueEntity> Default for PendingList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: QueueEntity> PendingList<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            in_flight: HashMap::new(),
            next_load_seq: 0,
            applied_load_seq: 0,
            loaded: false,
        }
    }

    /// Allocate a sequence number for a reload about to be issued.
    pub fn begin_load(&mut self) -> u64 {
        self.next_load_seq += 1;
        self.next_load_seq
    }

    /// Apply a reload response. Responses are honored in sequence order:
    /// anything at or below the last applied sequence is stale and
    /// discarded, so overlapping reloads cannot reorder the list backwards.
    /// Applying clears every in-flight marker. Returns whether it applied.
    pub fn apply_load(&mut self, seq: u64, entries: Vec<E>) -> bool {
        if seq <= self.applied_load_seq {
            return false;
        }
        self.applied_load_seq = seq;
        self.entries = entries;
        self.in_flight.clear();
        self.loaded = true;
        true
    }

    /// Guarded start of an action. An id that is no longer present is a
    /// quiet no-op (`Ok(None)`); an id already in flight is a typed
    /// rejection and must not reach the network.
    pub fn begin_action(&mut self, id: &str, kind: ActionKind) -> AppResult<Option<ActionTicket>> {
        if !self.contains(id) {
            return Ok(None);
        }
        if self.in_flight.contains_key(id) {
            return Err(AppError::already_in_flight(id));
        }
        let ticket = ActionTicket(Uuid::new_v4());
        self.in_flight.insert(id.to_string(), (kind, ticket));
        Ok(Some(ticket))
    }

    /// Settle an action. Success removes the entity and its marker in the
    /// same transition; failure clears only the marker, keeping the entry
    /// for a retry. A ticket superseded by a reload is ignored entirely.
    /// Returns whether any state changed.
    pub fn complete_action(&mut self, id: &str, ticket: ActionTicket, success: bool) -> bool {
        match self.in_flight.get(id) {
            Some((_, current)) if *current == ticket => {}
            _ => return false,
        }
        self.in_flight.remove(id);
        if success {
            self.entries.retain(|e| e.entity_id() != id);
        }
        true
    }

    /// Swap an entity with its immediate neighbor. No-op at either boundary
    /// and for unknown ids; never touches in-flight markers.
    pub fn move_entity(&mut self, id: &str, direction: MoveDirection) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.entity_id() == id) else {
            return false;
        };
        match direction {
            MoveDirection::Up if pos > 0 => {
                self.entries.swap(pos, pos - 1);
                true
            }
            MoveDirection::Down if pos + 1 < self.entries.len() => {
                self.entries.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }

    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a load has ever been applied. An applied-but-empty list is a
    /// distinct state from a list that was never loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.entity_id() == id)
    }

    pub fn is_in_flight(&self, id: &str) -> bool {
        self.in_flight.contains_key(id)
    }

    pub fn in_flight_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.in_flight.keys().cloned().collect();
        ids.sort();
        ids
    }
}
