//! Completion-provider contract for the weaver engine.
//!
//! Defines the wire types exchanged with a language model, the
//! `CompletionProvider` adapter trait, a `Client` that routes requests to a
//! named provider, and one concrete OpenAI-compatible HTTP adapter.

pub mod client;
pub mod errors;
pub mod openai;
pub mod provider;
pub mod types;

pub use client::Client;
pub use errors::LlmError;
pub use openai::OpenAiCompatProvider;
pub use provider::CompletionProvider;
pub use types::{Message, Request, Response, Role};
