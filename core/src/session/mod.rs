pub mod history;

pub use history::History;

use crate::config::HistoryPolicy;
use crate::traits::{Backend, ChatMessage, ChatRequest};
use anyhow::Result;
use std::sync::Arc;

/// A conversation against one backend: forwards prompts together with the
/// retained history and records each successful exchange.
pub struct ChatSession {
    backend: Arc<dyn Backend>,
    history: History,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn Backend>, policy: HistoryPolicy) -> Self {
        Self {
            backend,
            history: History::new(policy),
        }
    }

    /// Send a prompt and return the assistant's reply. History is only
    /// updated when the backend answers successfully.
    pub async fn send(&mut self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            prompt,
            history: self.history.messages(),
        };

        let reply = self.backend.chat(request).await?;
        self.history.record(prompt, &reply);
        Ok(reply)
    }

    pub async fn list_knowledge_bases(&self) -> Result<Vec<String>> {
        self.backend.list_knowledge_bases().await
    }

    pub fn history(&self) -> &[ChatMessage] {
        self.history.messages()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
