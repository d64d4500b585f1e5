use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::memory::MemoryConversationStore;
use crate::store::{ConversationId, ConversationStore, StoreError, StoreResult};

const STATE_FILE_NAME: &str = "conversations.json";

/// File-backed store: all conversations live in one JSON state file under the
/// given root, rewritten atomically (tmp write + rename) on every mutation.
pub struct FsConversationStore {
    state_file: PathBuf,
    inner: MemoryConversationStore,
}

impl FsConversationStore {
    pub fn new<P: AsRef<Path>>(root: P) -> StoreResult<Self> {
        fs::create_dir_all(root.as_ref())
            .map_err(|err| StoreError::Backend(format!("create store root failed: {err}")))?;
        let state_file = root.as_ref().join(STATE_FILE_NAME);
        let state = if state_file.exists() {
            let raw = fs::read(&state_file)
                .map_err(|err| StoreError::Backend(format!("read state file failed: {err}")))?;
            serde_json::from_slice::<HashMap<ConversationId, Vec<Value>>>(&raw)
                .map_err(|err| StoreError::Serialization(err.to_string()))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            state_file,
            inner: MemoryConversationStore::from_state(state),
        })
    }

    fn persist(&self) -> StoreResult<()> {
        let snapshot = self.inner.snapshot();
        let raw = serde_json::to_vec_pretty(&snapshot)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;
        let tmp = self.state_file.with_extension("json.tmp");
        fs::write(&tmp, raw)
            .map_err(|err| StoreError::Backend(format!("write state file failed: {err}")))?;
        fs::rename(&tmp, &self.state_file)
            .map_err(|err| StoreError::Backend(format!("rename state file failed: {err}")))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ConversationStore for FsConversationStore {
    async fn create_conversation(&self) -> StoreResult<ConversationId> {
        let id = self.inner.create_conversation().await?;
        self.persist()?;
        Ok(id)
    }

    async fn start_conversation(&self, turns: Vec<Value>) -> StoreResult<ConversationId> {
        let id = self.inner.start_conversation(turns).await?;
        self.persist()?;
        Ok(id)
    }

    async fn update_conversation(&self, id: &str, turns: Vec<Value>) -> StoreResult<()> {
        self.inner.update_conversation(id, turns).await?;
        self.persist()
    }

    async fn load_conversation(&self, id: &str) -> StoreResult<Vec<Value>> {
        self.inner.load_conversation(id).await
    }
}
