//! InMemory SessionIndex 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ParticipantId, SessionEntry, SessionIndex};

/// インメモリ SessionIndex 実装
#[derive(Default)]
pub struct InMemorySessionIndex {
    sessions: Mutex<HashMap<ParticipantId, SessionEntry>>,
}

impl InMemorySessionIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionIndex for InMemorySessionIndex {
    async fn insert(&self, entry: SessionEntry) {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(entry.participant_id.clone(), entry);
    }

    async fn get(&self, participant_id: &ParticipantId) -> Option<SessionEntry> {
        self.sessions.lock().await.get(participant_id).cloned()
    }

    async fn remove(&self, participant_id: &ParticipantId) -> Option<SessionEntry> {
        self.sessions.lock().await.remove(participant_id)
    }
}
