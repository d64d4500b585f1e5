use crate::config::{EngineConfig, ExhaustionPolicy, UnknownTagPolicy};
use crate::errors::{AgentError, EngineError};
use crate::events::{AgentEvent, EventEmitter};
use crate::protocol::{
    COMPLETION_TAG, FOLLOWUP_QUESTION_TAG, Fragment, THINKING_TAG, decode_completion,
    decode_followup_question, decode_parameters, decode_thought, extract_fragments,
};
use crate::tools::{ToolInvocation, ToolOutcome, ToolRegistry};
use crate::turn::Turn;
use serde_json::Value;
use std::fmt::{self, Display};
use std::sync::Arc;
use uuid::Uuid;
use weaver_llm::{Client, Request, Response};
use weaver_store::{ConversationId, ConversationStore, StoreError};

mod fanout;
mod gate;
pub use fanout::{FanOutCoordinator, FanOutReport, PromptOutcome};
pub use gate::{AnswerGate, AnswerHandle};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    Running,
    AwaitingAnswer,
    Completed,
    Exhausted,
    Failed,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::AwaitingAnswer => "AWAITING_ANSWER",
            Self::Completed => "COMPLETED",
            Self::Exhausted => "EXHAUSTED",
            Self::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Exhausted | Self::Failed)
    }

    pub fn can_transition_to(&self, next: &EngineState) -> bool {
        if self == next {
            return true;
        }

        match self {
            Self::Running => matches!(
                next,
                Self::AwaitingAnswer | Self::Completed | Self::Exhausted | Self::Failed
            ),
            Self::AwaitingAnswer => matches!(next, Self::Running | Self::Failed),
            Self::Completed | Self::Exhausted | Self::Failed => false,
        }
    }
}

impl Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum StepOutcome {
    Continue,
    Done,
}

/// Drives one conversation to a terminal state.
///
/// Each iteration asks the completion collaborator for the next assistant
/// turn, scans it into fragments, and executes them in document order. A
/// response with no fragments at all is taken as the final answer. The
/// iteration budget is fixed per instance and is consumed on every step,
/// including the step after an answered follow-up question.
pub struct ConversationEngine {
    conversation_id: ConversationId,
    client: Arc<Client>,
    tools: ToolRegistry,
    event_emitter: Arc<dyn EventEmitter>,
    store: Option<Arc<dyn ConversationStore>>,
    config: EngineConfig,
    history: Vec<Turn>,
    state: EngineState,
    gate: Arc<AnswerGate>,
    final_answer: Option<String>,
}

impl ConversationEngine {
    pub fn new(
        client: Arc<Client>,
        tools: ToolRegistry,
        event_emitter: Arc<dyn EventEmitter>,
        config: EngineConfig,
    ) -> Self {
        Self::build(
            client,
            tools,
            event_emitter,
            config,
            None,
            Uuid::new_v4().to_string(),
        )
    }

    /// Bind the engine to an existing conversation record; every appended turn
    /// is mirrored into the store.
    pub fn with_store(
        client: Arc<Client>,
        tools: ToolRegistry,
        event_emitter: Arc<dyn EventEmitter>,
        config: EngineConfig,
        store: Arc<dyn ConversationStore>,
        conversation_id: ConversationId,
    ) -> Self {
        Self::build(
            client,
            tools,
            event_emitter,
            config,
            Some(store),
            conversation_id,
        )
    }

    fn build(
        client: Arc<Client>,
        tools: ToolRegistry,
        event_emitter: Arc<dyn EventEmitter>,
        config: EngineConfig,
        store: Option<Arc<dyn ConversationStore>>,
        conversation_id: ConversationId,
    ) -> Self {
        Self {
            conversation_id,
            client,
            tools,
            event_emitter,
            store,
            config,
            history: Vec::new(),
            state: EngineState::Running,
            gate: Arc::new(AnswerGate::new()),
            final_answer: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.conversation_id
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn final_answer(&self) -> Option<&str> {
        self.final_answer.as_deref()
    }

    /// Satisfies the outstanding follow-up question, if any.
    pub fn answer_from_user(&self, answer: impl Into<String>) {
        self.gate.submit(answer);
    }

    pub fn answer_handle(&self) -> AnswerHandle {
        AnswerHandle::new(self.gate.clone())
    }

    pub fn transition_to(&mut self, next_state: EngineState) -> Result<(), AgentError> {
        if !self.state.can_transition_to(&next_state) {
            return Err(EngineError::InvalidStateTransition {
                from: self.state.to_string(),
                to: next_state.to_string(),
            }
            .into());
        }
        self.state = next_state;
        Ok(())
    }

    /// Run the conversation from the task prompt to a terminal state. Results
    /// are delivered through the event emitter; the returned error carries any
    /// unrecoverable collaborator failure.
    pub async fn run(&mut self, task: impl Into<String>) -> Result<(), AgentError> {
        match self.run_to_terminal(task.into()).await {
            Ok(()) => Ok(()),
            Err(error) => {
                if !self.state.is_terminal() {
                    self.state = EngineState::Failed;
                }
                let _ = self.event_emitter.emit(AgentEvent::error(
                    self.conversation_id.clone(),
                    error.to_string(),
                ));
                Err(error)
            }
        }
    }

    async fn run_to_terminal(&mut self, task: String) -> Result<(), AgentError> {
        self.append_turn(Turn::user(task)).await?;

        let mut iterations = 0usize;
        loop {
            if iterations >= self.config.max_iterations {
                self.transition_to(EngineState::Exhausted)?;
                tracing::warn!(
                    conversation_id = %self.conversation_id,
                    limit = self.config.max_iterations,
                    "iteration budget exhausted before completion"
                );
                return match self.config.exhaustion_policy {
                    // Historical behavior: stop without any terminal event.
                    ExhaustionPolicy::Silent => Ok(()),
                    ExhaustionPolicy::FailFast => Err(EngineError::IterationLimit {
                        limit: self.config.max_iterations,
                    }
                    .into()),
                };
            }
            iterations += 1;

            let response = self.complete_turn().await?;
            self.append_turn(Turn::assistant(response.text.clone()))
                .await?;

            let fragments = extract_fragments(&response.text);
            if fragments.is_empty() {
                // No directives at all: the raw output is the final answer.
                self.finish(response.text)?;
                return Ok(());
            }

            if self.process_fragments(fragments).await? == StepOutcome::Done {
                return Ok(());
            }
        }
    }

    async fn process_fragments(
        &mut self,
        fragments: Vec<Fragment>,
    ) -> Result<StepOutcome, AgentError> {
        for fragment in fragments {
            match fragment.tag_name.as_str() {
                THINKING_TAG => {
                    self.emit(AgentEvent::thinking(
                        self.conversation_id.clone(),
                        decode_thought(&fragment.content),
                    ))?;
                }
                FOLLOWUP_QUESTION_TAG => {
                    self.ask_followup_question(&fragment).await?;
                    // Remaining fragments from this response are abandoned;
                    // the answer feeds the next model step.
                    return Ok(StepOutcome::Continue);
                }
                COMPLETION_TAG => {
                    let directive = decode_completion(&fragment.content);
                    self.finish(directive.display_text())?;
                    return Ok(StepOutcome::Done);
                }
                name if self.tools.contains(name) => {
                    self.dispatch_tool(&fragment).await?;
                }
                other => self.handle_unknown_tag(other)?,
            }
        }
        Ok(StepOutcome::Continue)
    }

    async fn ask_followup_question(&mut self, fragment: &Fragment) -> Result<(), AgentError> {
        let question = decode_followup_question(&fragment.content);
        self.transition_to(EngineState::AwaitingAnswer)?;
        self.emit(AgentEvent::question(
            self.conversation_id.clone(),
            &question,
        ))?;
        let answer = self.gate.wait().await;
        self.transition_to(EngineState::Running)?;
        self.append_turn(Turn::user(answer)).await
    }

    async fn dispatch_tool(&mut self, fragment: &Fragment) -> Result<(), AgentError> {
        let invocation = ToolInvocation {
            name: fragment.tag_name.clone(),
            parameters: decode_parameters(&fragment.content),
        };
        tracing::debug!(
            conversation_id = %self.conversation_id,
            tool = %invocation.name,
            "dispatching tool fragment"
        );
        self.emit(AgentEvent::tool_call(
            self.conversation_id.clone(),
            &invocation,
        ))?;
        // A tool that returns Err is unguarded and terminates the run; a
        // failed outcome is surfaced to the model through the turn below.
        let outcome = self.tools.dispatch(&invocation).await?;
        self.append_turn(Turn::user(summarize_tool_outcome(&invocation, &outcome)))
            .await
    }

    fn handle_unknown_tag(&self, tag_name: &str) -> Result<(), AgentError> {
        tracing::warn!(
            conversation_id = %self.conversation_id,
            tag = tag_name,
            "dropping unrecognized tag"
        );
        match self.config.unknown_tag_policy {
            UnknownTagPolicy::Ignore => self.emit(AgentEvent::warning(
                self.conversation_id.clone(),
                format!("unrecognized tag '{tag_name}' ignored"),
            )),
            UnknownTagPolicy::FailFast => {
                Err(EngineError::UnknownDirective(tag_name.to_string()).into())
            }
        }
    }

    fn finish(&mut self, answer: String) -> Result<(), AgentError> {
        self.emit(AgentEvent::answer(
            self.conversation_id.clone(),
            answer.clone(),
        ))?;
        self.final_answer = Some(answer);
        self.transition_to(EngineState::Completed)
    }

    async fn complete_turn(&self) -> Result<Response, AgentError> {
        let messages = self.history.iter().map(Turn::to_message).collect();
        let request = Request::new(
            self.config.model.clone(),
            self.config.system_prompt.clone(),
            messages,
        );
        Ok(self.client.complete(request).await?)
    }

    async fn append_turn(&mut self, turn: Turn) -> Result<(), AgentError> {
        self.history.push(turn);
        self.sync_store().await
    }

    async fn sync_store(&self) -> Result<(), AgentError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let payloads = self
            .history
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()
            .map_err(|err| StoreError::Serialization(err.to_string()))?;
        store
            .update_conversation(&self.conversation_id, payloads)
            .await?;
        Ok(())
    }

    fn emit(&self, event: AgentEvent) -> Result<(), AgentError> {
        self.event_emitter.emit(event)
    }
}

fn summarize_tool_outcome(invocation: &ToolInvocation, outcome: &ToolOutcome) -> String {
    let arguments = Value::Object(invocation.parameters.clone()).to_string();
    if outcome.success {
        let result = outcome.result.as_deref().unwrap_or("(no output)");
        format!(
            "Tool '{}' was invoked with arguments {} and returned:\n{}",
            invocation.name, arguments, result
        )
    } else {
        let error = outcome.error.as_deref().unwrap_or("unspecified error");
        format!(
            "Tool '{}' was invoked with arguments {} and failed:\n{}",
            invocation.name, arguments, error
        )
    }
}
