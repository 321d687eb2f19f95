#![allow(dead_code)]

//! Session Store — per-user bounded conversation buffers.
//!
//! Purely in-memory: created on first access, process lifetime, lost on
//! restart. Each user id gets its own lock so a read+append pair can be held
//! atomic across an LLM call without serializing unrelated users.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::chat::ConversationTurn;

/// Maximum turns retained per user: the 5 most recent exchanges.
pub const MAX_TURNS: usize = 10;

type Buffer = Arc<Mutex<Vec<ConversationTurn>>>;

/// Process-wide conversation store, keyed by user id.
#[derive(Default)]
pub struct SessionStore {
    buffers: Mutex<HashMap<String, Buffer>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the per-user buffer, creating it on first access. The caller
    /// holds the returned lock for the duration of a read+append pair.
    pub async fn buffer(&self, user_id: &str) -> Buffer {
        let mut buffers = self.buffers.lock().await;
        buffers.entry(user_id.to_string()).or_default().clone()
    }

    /// Snapshot of the current history for a user. Empty if unseen.
    pub async fn get(&self, user_id: &str) -> Vec<ConversationTurn> {
        let buffer = {
            let buffers = self.buffers.lock().await;
            match buffers.get(user_id) {
                Some(b) => b.clone(),
                None => return Vec::new(),
            }
        };
        let guard = buffer.lock().await;
        guard.clone()
    }

    /// Appends turns for a user, then trims to the cap from the front.
    pub async fn append(&self, user_id: &str, turns: Vec<ConversationTurn>) {
        let buffer = self.buffer(user_id).await;
        let mut guard = buffer.lock().await;
        guard.extend(turns);
        trim_to_cap(&mut guard);
    }

    /// Removes all history for a user. Waits on the per-user lock so an
    /// in-flight exchange for the same user is not half-clobbered.
    pub async fn clear(&self, user_id: &str) {
        let buffer = {
            let buffers = self.buffers.lock().await;
            match buffers.get(user_id) {
                Some(b) => b.clone(),
                None => return,
            }
        };
        buffer.lock().await.clear();
    }
}

/// Drops the oldest turns so the buffer holds at most `MAX_TURNS`.
pub fn trim_to_cap(turns: &mut Vec<ConversationTurn>) {
    if turns.len() > MAX_TURNS {
        let excess = turns.len() - MAX_TURNS;
        turns.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(n: usize) -> Vec<ConversationTurn> {
        vec![
            ConversationTurn::user(format!("question {n}")),
            ConversationTurn::assistant(format!("answer {n}")),
        ]
    }

    #[tokio::test]
    async fn test_unseen_user_has_empty_history() {
        let store = SessionStore::new();
        assert!(store.get("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn test_append_accumulates_in_order() {
        let store = SessionStore::new();
        store.append("u1", exchange(1)).await;
        store.append("u1", exchange(2)).await;

        let history = store.get("u1").await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content, "question 1");
        assert_eq!(history[3].content, "answer 2");
    }

    #[tokio::test]
    async fn test_cap_keeps_most_recent_ten_turns() {
        let store = SessionStore::new();
        for n in 1..=6 {
            store.append("u1", exchange(n)).await;
        }

        let history = store.get("u1").await;
        assert_eq!(history.len(), MAX_TURNS);
        // Exchange 1 fell off; exchange 2 onward survives in order.
        assert_eq!(history[0].content, "question 2");
        assert_eq!(history[9].content, "answer 6");
    }

    #[tokio::test]
    async fn test_clear_empties_history() {
        let store = SessionStore::new();
        store.append("u1", exchange(1)).await;
        store.clear("u1").await;
        assert!(store.get("u1").await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_unseen_user_is_a_noop() {
        let store = SessionStore::new();
        store.clear("ghost").await;
        assert!(store.get("ghost").await.is_empty());
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = SessionStore::new();
        store.append("u1", exchange(1)).await;
        assert!(store.get("u2").await.is_empty());
    }

    #[test]
    fn test_trim_is_noop_at_or_below_cap() {
        let mut turns: Vec<ConversationTurn> =
            (0..MAX_TURNS).map(|n| ConversationTurn::user(n.to_string())).collect();
        trim_to_cap(&mut turns);
        assert_eq!(turns.len(), MAX_TURNS);
    }
}
