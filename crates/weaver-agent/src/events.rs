use crate::errors::AgentError;
use crate::protocol::FollowupQuestion;
use crate::tools::ToolInvocation;
use crate::turn::current_timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub type EventData = HashMap<String, Value>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Thinking,
    QuestionFromAssistant,
    ToolCallFromAssistant,
    AnswerFromAssistant,
    SubAgentStarted,
    SubAgentCompleted,
    SubAgentFailed,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    pub kind: EventKind,
    pub timestamp: String,
    pub conversation_id: String,
    pub data: EventData,
}

impl AgentEvent {
    pub fn new(kind: EventKind, conversation_id: String, data: EventData) -> Self {
        Self {
            kind,
            timestamp: current_timestamp(),
            conversation_id,
            data,
        }
    }

    pub fn thinking(conversation_id: String, text: impl Into<String>) -> Self {
        Self::new(
            EventKind::Thinking,
            conversation_id,
            HashMap::from([("text".to_string(), Value::String(text.into()))]),
        )
    }

    pub fn question(conversation_id: String, question: &FollowupQuestion) -> Self {
        Self::new(
            EventKind::QuestionFromAssistant,
            conversation_id,
            HashMap::from([
                (
                    "question".to_string(),
                    Value::String(question.question.clone()),
                ),
                ("options".to_string(), json!(question.options)),
            ]),
        )
    }

    pub fn tool_call(conversation_id: String, invocation: &ToolInvocation) -> Self {
        Self::new(
            EventKind::ToolCallFromAssistant,
            conversation_id,
            HashMap::from([
                ("tool".to_string(), Value::String(invocation.name.clone())),
                (
                    "parameters".to_string(),
                    Value::Object(invocation.parameters.clone()),
                ),
            ]),
        )
    }

    pub fn answer(conversation_id: String, text: impl Into<String>) -> Self {
        Self::new(
            EventKind::AnswerFromAssistant,
            conversation_id,
            HashMap::from([("text".to_string(), Value::String(text.into()))]),
        )
    }

    pub fn warning(conversation_id: String, message: impl Into<String>) -> Self {
        Self::new(
            EventKind::Warning,
            conversation_id,
            HashMap::from([("message".to_string(), Value::String(message.into()))]),
        )
    }

    pub fn error(conversation_id: String, message: impl Into<String>) -> Self {
        Self::new(
            EventKind::Error,
            conversation_id,
            HashMap::from([("message".to_string(), Value::String(message.into()))]),
        )
    }

    pub fn sub_agent_started(
        conversation_id: String,
        subagent_id: String,
        prompt: String,
        started_at: String,
    ) -> Self {
        Self::new(
            EventKind::SubAgentStarted,
            conversation_id,
            HashMap::from([
                ("id".to_string(), Value::String(subagent_id)),
                ("prompt".to_string(), Value::String(prompt)),
                ("started_at".to_string(), Value::String(started_at)),
            ]),
        )
    }

    pub fn sub_agent_completed(
        conversation_id: String,
        subagent_id: String,
        prompt: String,
        started_at: String,
        result: String,
    ) -> Self {
        Self::new(
            EventKind::SubAgentCompleted,
            conversation_id,
            HashMap::from([
                ("id".to_string(), Value::String(subagent_id)),
                ("prompt".to_string(), Value::String(prompt)),
                ("started_at".to_string(), Value::String(started_at)),
                (
                    "finished_at".to_string(),
                    Value::String(current_timestamp()),
                ),
                ("result".to_string(), Value::String(result)),
            ]),
        )
    }

    pub fn sub_agent_failed(
        conversation_id: String,
        subagent_id: String,
        prompt: String,
        started_at: String,
        error: String,
    ) -> Self {
        Self::new(
            EventKind::SubAgentFailed,
            conversation_id,
            HashMap::from([
                ("id".to_string(), Value::String(subagent_id)),
                ("prompt".to_string(), Value::String(prompt)),
                ("started_at".to_string(), Value::String(started_at)),
                (
                    "finished_at".to_string(),
                    Value::String(current_timestamp()),
                ),
                ("error".to_string(), Value::String(error)),
            ]),
        )
    }
}

/// Observer interface the engine emits through. Delivery is synchronous and
/// best-effort; the engine makes no redelivery guarantees.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: AgentEvent) -> Result<(), AgentError>;
}

#[derive(Default)]
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit(&self, _event: AgentEvent) -> Result<(), AgentError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct BufferedEventEmitter {
    inner: Arc<Mutex<Vec<AgentEvent>>>,
}

impl BufferedEventEmitter {
    pub fn snapshot(&self) -> Vec<AgentEvent> {
        let guard = self.inner.lock().expect("buffered emitter mutex poisoned");
        guard.clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.snapshot().into_iter().map(|event| event.kind).collect()
    }
}

impl EventEmitter for BufferedEventEmitter {
    fn emit(&self, event: AgentEvent) -> Result<(), AgentError> {
        let mut guard = self.inner.lock().expect("buffered emitter mutex poisoned");
        guard.push(event);
        Ok(())
    }
}
