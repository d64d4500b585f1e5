//! Conversation persistence for the weaver engine.
//!
//! Stores are domain-agnostic: a conversation is an ordered list of JSON turn
//! payloads keyed by a string id. The engine crate owns the typed `Turn`
//! shape and serializes it before handing turns to a store.

pub mod fs;
pub mod memory;
pub mod store;

pub use fs::FsConversationStore;
pub use memory::MemoryConversationStore;
pub use store::{ConversationId, ConversationStore, StoreError, StoreResult};
