use thiserror::Error;

/// Top-level error type for the weaver-agent crate.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Store(#[from] weaver_store::StoreError),
    #[error(transparent)]
    Llm(#[from] weaver_llm::LlmError),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },
    #[error("iteration limit of {limit} reached before completion")]
    IterationLimit { limit: usize },
    #[error("unrecognized directive tag '{0}'")]
    UnknownDirective(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("tool execution failed: {0}")]
    Execution(String),
}
