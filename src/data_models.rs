use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> ChatMessage {
        ChatMessage {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> ChatMessage {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of a chat-completion call to the upstream API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub search_recency_filter: String,
}

/// Reply of the upstream API. Every field is kept as raw JSON: the upstream
/// may answer with an error object, and odd-shaped choices must not fail the
/// whole decode.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Option<Value>,
    #[serde(default)]
    pub citations: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ChatResponse {
    /// Content of the first choice, if it is a non-empty string.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .as_ref()?
            .pointer("/0/message/content")?
            .as_str()
            .filter(|c| !c.is_empty())
    }
}
