//! Tag-protocol interpreter and task-orchestration engine.
//!
//! A language model drives work by emitting a tag-delimited text protocol;
//! this crate scans that output into fragments, classifies each fragment as a
//! control directive or a tool invocation, executes the corresponding action,
//! and iterates the conversation to completion. It also supports suspending on
//! a follow-up question until an external answer arrives, and fanning out a
//! batch of prompts across independent engines.

pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod protocol;
pub mod tools;
pub mod turn;

pub use config::*;
pub use engine::*;
pub use errors::*;
pub use events::*;
pub use protocol::*;
pub use tools::*;
pub use turn::*;
