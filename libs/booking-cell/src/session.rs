use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::ConversationState;

/// Per-chat conversation storage. The engine only talks to this trait, so a
/// multi-instance deployment can swap the map for an external key-value
/// store without touching the state machine.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, chat_id: i64) -> Option<ConversationState>;
    async fn set(&self, chat_id: i64, state: ConversationState);
    async fn clear(&self, chat_id: i64);
}

/// Single-instance backend: a guarded in-process map.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<i64, ConversationState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, chat_id: i64) -> Option<ConversationState> {
        self.sessions.read().await.get(&chat_id).cloned()
    }

    async fn set(&self, chat_id: i64, state: ConversationState) {
        self.sessions.write().await.insert(chat_id, state);
    }

    async fn clear(&self, chat_id: i64) {
        self.sessions.write().await.remove(&chat_id);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientContact {
    pub name: String,
    pub phone: String,
}

/// Known-client fast path: a completed booking records the contact, and the
/// next booking from the same chat skips the name/phone steps.
pub struct ClientDirectory {
    clients: RwLock<HashMap<i64, ClientContact>>,
}

impl ClientDirectory {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, chat_id: i64) -> Option<ClientContact> {
        self.clients.read().await.get(&chat_id).cloned()
    }

    pub async fn record(&self, chat_id: i64, name: &str, phone: &str) {
        self.clients.write().await.insert(
            chat_id,
            ClientContact {
                name: name.to_string(),
                phone: phone.to_string(),
            },
        );
    }
}

impl Default for ClientDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Step;

    #[tokio::test]
    async fn sessions_are_scoped_per_chat() {
        let store = InMemorySessionStore::new();

        let mut state = ConversationState::idle();
        state.step = Step::EnteringName;
        store.set(1, state.clone()).await;

        assert_eq!(store.get(1).await, Some(state));
        assert_eq!(store.get(2).await, None);

        store.clear(1).await;
        assert_eq!(store.get(1).await, None);
    }

    #[tokio::test]
    async fn directory_remembers_the_last_contact() {
        let directory = ClientDirectory::new();
        directory.record(1, "Анна", "+79255355278").await;
        directory.record(1, "Анна П.", "+79255355278").await;

        let contact = directory.get(1).await.unwrap();
        assert_eq!(contact.name, "Анна П.");
        assert_eq!(directory.get(2).await, None);
    }
}
