use super::ConversationEngine;
use crate::config::EngineConfig;
use crate::errors::{AgentError, EngineError};
use crate::events::{AgentEvent, EventEmitter};
use crate::tools::ToolRegistry;
use crate::turn::current_timestamp;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use weaver_llm::Client;
use weaver_store::ConversationStore;

/// Outcome of one fanned-out prompt, in original prompt order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOutcome {
    pub prompt: String,
    pub output: String,
    pub success: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanOutReport {
    pub success: bool,
    pub output: String,
    pub outcomes: Vec<PromptOutcome>,
}

/// Runs one independent engine per prompt, concurrently, against a shared
/// read-only configuration, and reassembles the results in prompt order.
///
/// Engines share nothing mutable: each gets a freshly created conversation
/// record and writes only to it, so no locking discipline is needed between
/// them. There is no way to abort an individual sub-engine once started.
pub struct FanOutCoordinator {
    client: Arc<Client>,
    tools: ToolRegistry,
    event_emitter: Arc<dyn EventEmitter>,
    store: Arc<dyn ConversationStore>,
    config: EngineConfig,
}

impl FanOutCoordinator {
    pub fn new(
        client: Arc<Client>,
        tools: ToolRegistry,
        event_emitter: Arc<dyn EventEmitter>,
        store: Arc<dyn ConversationStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            client,
            tools,
            event_emitter,
            store,
            config,
        }
    }

    /// Overall success means at least one prompt produced a final answer; the
    /// report text lists successful answers first (tagged with ordinal and
    /// prompt), then one line per failure. All-failed reports failure with
    /// every error message.
    pub async fn execute(&self, prompts: Vec<String>) -> Result<FanOutReport, AgentError> {
        if prompts.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "fan-out requires at least one prompt".to_string(),
            )
            .into());
        }
        tracing::info!(prompts = prompts.len(), "fanning out sub-conversations");

        let tasks: Vec<_> = prompts
            .iter()
            .map(|prompt| {
                tokio::spawn(run_sub_engine(
                    self.client.clone(),
                    self.tools.clone(),
                    self.event_emitter.clone(),
                    self.store.clone(),
                    self.config.clone(),
                    prompt.clone(),
                ))
            })
            .collect();

        let mut outcomes = Vec::with_capacity(prompts.len());
        for (prompt, joined) in prompts.into_iter().zip(join_all(tasks).await) {
            outcomes.push(match joined {
                Ok(outcome) => outcome,
                Err(join_error) => PromptOutcome {
                    prompt,
                    output: format!("sub-engine task failed: {join_error}"),
                    success: false,
                },
            });
        }

        Ok(aggregate(outcomes))
    }
}

async fn run_sub_engine(
    client: Arc<Client>,
    tools: ToolRegistry,
    event_emitter: Arc<dyn EventEmitter>,
    store: Arc<dyn ConversationStore>,
    config: EngineConfig,
    prompt: String,
) -> PromptOutcome {
    let subagent_id = Uuid::new_v4().to_string();
    let started_at = current_timestamp();

    let conversation_id = match store.create_conversation().await {
        Ok(id) => id,
        Err(error) => {
            let message = error.to_string();
            let _ = event_emitter.emit(AgentEvent::sub_agent_failed(
                String::new(),
                subagent_id,
                prompt.clone(),
                started_at,
                message.clone(),
            ));
            return PromptOutcome {
                prompt,
                output: message,
                success: false,
            };
        }
    };

    let _ = event_emitter.emit(AgentEvent::sub_agent_started(
        conversation_id.clone(),
        subagent_id.clone(),
        prompt.clone(),
        started_at.clone(),
    ));

    let mut engine = ConversationEngine::with_store(
        client,
        tools,
        event_emitter.clone(),
        config,
        store,
        conversation_id.clone(),
    );
    match engine.run(prompt.clone()).await {
        Ok(()) => match engine.final_answer() {
            Some(answer) => {
                let answer = answer.to_string();
                let _ = event_emitter.emit(AgentEvent::sub_agent_completed(
                    conversation_id,
                    subagent_id,
                    prompt.clone(),
                    started_at,
                    answer.clone(),
                ));
                PromptOutcome {
                    prompt,
                    output: answer,
                    success: true,
                }
            }
            // Terminated without ever reaching a terminal event (exhaustion).
            None => {
                let message = "sub-conversation ended without a final answer".to_string();
                let _ = event_emitter.emit(AgentEvent::sub_agent_failed(
                    conversation_id,
                    subagent_id,
                    prompt.clone(),
                    started_at,
                    message.clone(),
                ));
                PromptOutcome {
                    prompt,
                    output: message,
                    success: false,
                }
            }
        },
        Err(error) => {
            let message = error.to_string();
            let _ = event_emitter.emit(AgentEvent::sub_agent_failed(
                conversation_id,
                subagent_id,
                prompt.clone(),
                started_at,
                message.clone(),
            ));
            PromptOutcome {
                prompt,
                output: message,
                success: false,
            }
        }
    }
}

fn aggregate(outcomes: Vec<PromptOutcome>) -> FanOutReport {
    if !outcomes.iter().any(|outcome| outcome.success) {
        let output = outcomes
            .iter()
            .enumerate()
            .map(|(index, outcome)| format!("[{}] {}: {}", index + 1, outcome.prompt, outcome.output))
            .collect::<Vec<_>>()
            .join("\n");
        return FanOutReport {
            success: false,
            output,
            outcomes,
        };
    }

    let mut sections = Vec::new();
    for (index, outcome) in outcomes.iter().enumerate() {
        if outcome.success {
            sections.push(format!("[{}] {}\n{}", index + 1, outcome.prompt, outcome.output));
        }
    }
    for (index, outcome) in outcomes.iter().enumerate() {
        if !outcome.success {
            sections.push(format!(
                "[{}] {} failed: {}",
                index + 1,
                outcome.prompt,
                outcome.output
            ));
        }
    }

    FanOutReport {
        success: true,
        output: sections.join("\n\n"),
        outcomes,
    }
}
