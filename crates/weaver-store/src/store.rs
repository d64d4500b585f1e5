use serde_json::Value;

pub type ConversationId = String;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("conversation not found: {0}")]
    NotFound(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator for conversations.
///
/// The engine mirrors its in-memory conversation here after every appended
/// turn; the store never drives the engine.
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create an empty conversation record and return its id.
    async fn create_conversation(&self) -> StoreResult<ConversationId>;

    /// Create a conversation seeded with the given turns.
    async fn start_conversation(&self, turns: Vec<Value>) -> StoreResult<ConversationId>;

    /// Replace the stored turns for an existing conversation.
    async fn update_conversation(&self, id: &str, turns: Vec<Value>) -> StoreResult<()>;

    /// Read back the stored turns.
    async fn load_conversation(&self, id: &str) -> StoreResult<Vec<Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_messages_name_the_conversation() {
        let error = StoreError::NotFound("conv-1".to_string());
        assert_eq!(error.to_string(), "conversation not found: conv-1");
    }
}
