use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::LlmError;
use crate::provider::CompletionProvider;
use crate::types::{Message, Request, Response, Role};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions adapter for OpenAI-compatible endpoints.
pub struct OpenAiCompatProvider {
    name: String,
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from `OPENAI_API_KEY` (required) and `OPENAI_BASE_URL` (optional).
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Some(Self::new("openai", base_url, api_key))
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn build_wire_messages<'a>(system_prompt: &'a str, messages: &'a [Message]) -> Vec<WireMessage<'a>> {
    let mut wire = Vec::with_capacity(messages.len() + 1);
    if !system_prompt.is_empty() {
        wire.push(WireMessage {
            role: "system",
            content: system_prompt,
        });
    }
    wire.extend(messages.iter().map(|message| WireMessage {
        role: wire_role(message.role),
        content: message.content.as_str(),
    }));
    wire
}

#[async_trait]
impl CompletionProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: Request) -> Result<Response, LlmError> {
        let body = ChatRequest {
            model: &request.model,
            messages: build_wire_messages(&request.system_prompt, &request.messages),
        };

        let http_response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| LlmError::Transport(error.to_string()))?;

        let status = http_response.status();
        if !status.is_success() {
            let message = http_response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Auth(message),
                429 => LlmError::RateLimited(message),
                code => LlmError::Provider {
                    status: code,
                    message,
                },
            });
        }

        let parsed: ChatResponse = http_response
            .json()
            .await
            .map_err(|error| LlmError::MalformedResponse(error.to_string()))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::MalformedResponse("response carried no choices".to_string()))?;

        Ok(Response {
            text,
            model: parsed.model.unwrap_or(request.model),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_leads_the_wire_messages() {
        let messages = vec![Message::user("hi"), Message::assistant("hello")];
        let wire = build_wire_messages("be brief", &messages);
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[0].content, "be brief");
        assert_eq!(wire[1].role, "user");
        assert_eq!(wire[2].role, "assistant");
    }

    #[test]
    fn empty_system_prompt_is_omitted() {
        let messages = [Message::user("hi")];
        let wire = build_wire_messages("", &messages);
        assert_eq!(wire.len(), 1);
        assert_eq!(wire[0].role, "user");
    }

    #[test]
    fn chat_response_parses_first_choice() {
        let raw = r#"{"model":"m1","choices":[{"message":{"content":"answer"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.model.as_deref(), Some("m1"));
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("answer"));
    }
}
