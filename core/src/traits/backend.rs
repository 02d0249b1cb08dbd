use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

/// A single turn handed to the backend: the new prompt plus every prior
/// exchange the session still holds.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub prompt: &'a str,
    pub history: &'a [ChatMessage],
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Send a prompt and return the assistant's reply text.
    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<String>;

    /// Names of the knowledge bases available on the backend.
    async fn list_knowledge_bases(&self) -> anyhow::Result<Vec<String>>;
}
