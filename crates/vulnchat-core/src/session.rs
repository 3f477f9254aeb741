//! In-memory session state store.
//!
//! Holds the authoritative, append-only turn sequence for each open chat
//! session. State is request-scoped in spirit: it is created on the first
//! user turn, mutated by appends during an exchange, and checkpointed to the
//! durable store on finalize. Durability is the chat store's job; this type
//! only ever mutates memory.
//!
//! At most one exchange may mutate a session at a time. That invariant is
//! enforced one level up by `ChatService`'s per-session lock; the store
//! itself is safe for concurrent use across *different* sessions.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use vulnchat_types::error::SessionError;
use vulnchat_types::turn::Turn;

#[derive(Default)]
struct SessionState {
    turns: Vec<Turn>,
    finalized: bool,
}

/// Concurrent map of open sessions, cheap to clone (shared interior).
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to a session, creating the session if absent.
    ///
    /// Rejects turns with empty content with [`SessionError::InvalidTurn`],
    /// leaving the session untouched. Returns the new turn count.
    pub fn append(&self, session_id: Uuid, turn: Turn) -> Result<usize, SessionError> {
        turn.validate()?;
        let mut state = self.sessions.entry(session_id).or_default();
        state.turns.push(turn);
        state.finalized = false;
        Ok(state.turns.len())
    }

    /// A copy of the current turn sequence, in append order. Non-mutating;
    /// an unknown session yields an empty sequence.
    pub fn snapshot(&self, session_id: &Uuid) -> Vec<Turn> {
        self.sessions
            .get(session_id)
            .map(|s| s.turns.clone())
            .unwrap_or_default()
    }

    /// Number of turns currently held for a session.
    pub fn len(&self, session_id: &Uuid) -> usize {
        self.sessions.get(session_id).map(|s| s.turns.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, session_id: &Uuid) -> bool {
        self.len(session_id) == 0
    }

    pub fn contains(&self, session_id: &Uuid) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Mark a session ready for persistence and hand its turns to the caller.
    ///
    /// Idempotent: calling twice with no intervening append returns the same
    /// sequence and changes nothing. The session stays in memory so a later
    /// exchange in the same conversation can continue it.
    pub fn finalize(&self, session_id: &Uuid) -> Vec<Turn> {
        match self.sessions.get_mut(session_id) {
            Some(mut state) => {
                state.finalized = true;
                state.turns.clone()
            }
            None => Vec::new(),
        }
    }

    /// Whether the session has been finalized since its last append.
    pub fn is_finalized(&self, session_id: &Uuid) -> bool {
        self.sessions
            .get(session_id)
            .map(|s| s.finalized)
            .unwrap_or(false)
    }

    /// Roll a session back to `len` turns.
    ///
    /// Used when an exchange fails mid-stream: dropping the pending user turn
    /// means a whole-call retry reproduces the pre-exchange state.
    pub fn truncate(&self, session_id: &Uuid, len: usize) {
        if let Some(mut state) = self.sessions.get_mut(session_id) {
            state.turns.truncate(len);
            debug!(%session_id, len, "session rolled back");
        }
    }

    /// Seed a session from a previously checkpointed turn sequence.
    ///
    /// No-op when the session is already in memory -- live state always wins
    /// over the durable copy it was checkpointed from.
    pub fn hydrate(&self, session_id: Uuid, turns: Vec<Turn>) {
        self.sessions.entry(session_id).or_insert_with(|| {
            debug!(%session_id, count = turns.len(), "session hydrated from checkpoint");
            SessionState {
                turns,
                finalized: true,
            }
        });
    }

    /// Drop a session's in-memory state.
    pub fn evict(&self, session_id: &Uuid) {
        self.sessions.remove(session_id);
    }
}
