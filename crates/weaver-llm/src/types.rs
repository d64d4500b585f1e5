use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One completion request: a system prompt plus the conversation so far.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub model: String,
    pub system_prompt: String,
    pub messages: Vec<Message>,
    /// Route to a specific registered provider; `None` uses the client default.
    pub provider: Option<String>,
}

impl Request {
    pub fn new(
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            messages,
            provider: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub text: String,
    pub model: String,
}
