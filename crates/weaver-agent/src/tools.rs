use crate::errors::{AgentError, ToolError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// A fragment resolved against the tool set: tag name plus decoded parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub parameters: Map<String, Value>,
}

/// What a tool reports back. A failed outcome is ordinary data — it is
/// surfaced to the model through the synthesized conversation turn, not
/// through the error channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub success: bool,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl ToolOutcome {
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Execution contract for one tool. A returned `Err` is treated as an
/// unguarded fault and terminates the engine run; recoverable problems belong
/// in a failed `ToolOutcome`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, parameters: Map<String, Value>) -> Result<ToolOutcome, AgentError>;
}

/// The tool set one engine dispatches against. Injected at construction; there
/// is no ambient global registry.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub async fn dispatch(&self, invocation: &ToolInvocation) -> Result<ToolOutcome, AgentError> {
        let Some(tool) = self.tools.get(&invocation.name) else {
            return Err(ToolError::UnknownTool(invocation.name.clone()).into());
        };
        tool.execute(invocation.parameters.clone()).await
    }
}
