use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use uuid::Uuid;

use crate::store::{ConversationId, ConversationStore, StoreError, StoreResult};

/// In-memory store, used by tests and as the inner state of the fs store.
#[derive(Default)]
pub struct MemoryConversationStore {
    conversations: Mutex<HashMap<ConversationId, Vec<Value>>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_state(state: HashMap<ConversationId, Vec<Value>>) -> Self {
        Self {
            conversations: Mutex::new(state),
        }
    }

    pub(crate) fn snapshot(&self) -> HashMap<ConversationId, Vec<Value>> {
        self.conversations
            .lock()
            .expect("conversation map mutex poisoned")
            .clone()
    }

    fn insert(&self, turns: Vec<Value>) -> ConversationId {
        let id = Uuid::new_v4().to_string();
        self.conversations
            .lock()
            .expect("conversation map mutex poisoned")
            .insert(id.clone(), turns);
        id
    }
}

#[async_trait::async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn create_conversation(&self) -> StoreResult<ConversationId> {
        Ok(self.insert(Vec::new()))
    }

    async fn start_conversation(&self, turns: Vec<Value>) -> StoreResult<ConversationId> {
        Ok(self.insert(turns))
    }

    async fn update_conversation(&self, id: &str, turns: Vec<Value>) -> StoreResult<()> {
        let mut conversations = self
            .conversations
            .lock()
            .expect("conversation map mutex poisoned");
        let Some(entry) = conversations.get_mut(id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        *entry = turns;
        Ok(())
    }

    async fn load_conversation(&self, id: &str) -> StoreResult<Vec<Value>> {
        self.conversations
            .lock()
            .expect("conversation map mutex poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test(flavor = "current_thread")]
    async fn update_then_load_roundtrips_turns() {
        let store = MemoryConversationStore::new();
        let id = store.create_conversation().await.expect("create");

        store
            .update_conversation(&id, vec![json!({"role":"user","content":"hi"})])
            .await
            .expect("update");

        let turns = store.load_conversation(&id).await.expect("load");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0]["content"], "hi");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn updating_unknown_conversation_is_not_found() {
        let store = MemoryConversationStore::new();
        let error = store
            .update_conversation("missing", Vec::new())
            .await
            .expect_err("should fail");
        assert!(matches!(error, StoreError::NotFound(_)));
    }
}
