use crate::config::{ChatMode, KnowledgeBaseParams, LlmParams, SearchEngineParams};
use crate::traits::{Backend, ChatMessage, ChatRequest};
use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const COMPLETIONS_PATH: &str = "/chat/chat/completions";
const KB_CHAT_PATH: &str = "/chat/kb_chat";
const KB_LIST_PATH: &str = "/knowledge_base/list_knowledge_bases";

#[derive(Debug, Serialize)]
struct CompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    r#type: &'a str,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct KbChatRequest<'a> {
    query: &'a str,
    mode: &'a str,
    kb_name: &'a str,
    top_k: u32,
    score_threshold: f64,
    history: Vec<WireMessage<'a>>,
    stream: bool,
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
    prompt_name: &'a str,
    return_direct: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KnowledgeBaseList {
    data: Option<Vec<String>>,
}

/// Client for a Langchain-Chatchat style HTTP backend. Model chat goes to the
/// OpenAI-compatible completions route; knowledge-base and search-engine chat
/// share the kb_chat route and differ only in the `mode` discriminator.
pub struct ChatchatBackend {
    client: reqwest::Client,
    base_url: String,
    mode: ChatMode,
    llm: LlmParams,
    knowledge_base: KnowledgeBaseParams,
    search_engine: SearchEngineParams,
}

impl ChatchatBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        let url = base_url.into();
        Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            mode: ChatMode::default(),
            llm: LlmParams::default(),
            knowledge_base: KnowledgeBaseParams::default(),
            search_engine: SearchEngineParams::default(),
        }
    }

    pub fn with_mode(mut self, mode: ChatMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_llm(mut self, llm: LlmParams) -> Self {
        self.llm = llm;
        self
    }

    pub fn with_knowledge_base(mut self, knowledge_base: KnowledgeBaseParams) -> Self {
        self.knowledge_base = knowledge_base;
        self
    }

    pub fn with_search_engine(mut self, search_engine: SearchEngineParams) -> Self {
        self.search_engine = search_engine;
        self
    }

    fn convert_history<'a>(history: &'a [ChatMessage]) -> Vec<WireMessage<'a>> {
        history
            .iter()
            .map(|m| WireMessage {
                role: &m.role,
                content: &m.content,
            })
            .collect()
    }

    fn completions_request<'a>(&'a self, request: &ChatRequest<'a>) -> CompletionsRequest<'a> {
        let mut messages = Self::convert_history(request.history);
        messages.push(WireMessage {
            role: "user",
            content: request.prompt,
        });

        CompletionsRequest {
            model: &self.llm.model,
            messages,
            max_tokens: self.llm.max_tokens,
            temperature: self.llm.temperature,
            stream: false,
            response_format: ResponseFormat { r#type: "text" },
        }
    }

    fn kb_chat_request<'a>(&'a self, request: &ChatRequest<'a>) -> KbChatRequest<'a> {
        let history = Self::convert_history(request.history);

        match self.mode {
            ChatMode::SearchEngine => KbChatRequest {
                query: request.prompt,
                mode: "search_engine",
                kb_name: &self.search_engine.engine,
                top_k: self.search_engine.top_k,
                score_threshold: self.search_engine.score_threshold,
                history,
                stream: false,
                model: &self.search_engine.model,
                temperature: self.search_engine.temperature,
                max_tokens: self.search_engine.max_tokens,
                prompt_name: &self.search_engine.prompt_name,
                return_direct: false,
            },
            _ => KbChatRequest {
                query: request.prompt,
                mode: "local_kb",
                kb_name: &self.knowledge_base.kb_name,
                top_k: self.knowledge_base.top_k,
                score_threshold: self.knowledge_base.score_threshold,
                history,
                stream: false,
                model: &self.knowledge_base.model,
                temperature: self.knowledge_base.temperature,
                max_tokens: self.knowledge_base.max_tokens,
                prompt_name: &self.knowledge_base.prompt_name,
                return_direct: false,
            },
        }
    }
}

#[async_trait]
impl Backend for ChatchatBackend {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<String> {
        let response = match self.mode {
            ChatMode::Model => {
                let body = self.completions_request(&request);
                debug!(
                    mode = %self.mode,
                    messages = body.messages.len(),
                    "sending chat request"
                );
                self.client
                    .post(format!("{}{}", self.base_url, COMPLETIONS_PATH))
                    .json(&body)
                    .send()
                    .await?
            }
            ChatMode::KnowledgeBase | ChatMode::SearchEngine => {
                let body = self.kb_chat_request(&request);
                debug!(
                    mode = %self.mode,
                    kb_name = body.kb_name,
                    history = body.history.len(),
                    "sending chat request"
                );
                self.client
                    .post(format!("{}{}", self.base_url, KB_CHAT_PATH))
                    .json(&body)
                    .send()
                    .await?
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Chat backend error {}: {}",
                status,
                error_text
            ));
        }

        let body = response.text().await?;
        reply_from_body(&body)
    }

    async fn list_knowledge_bases(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, KB_LIST_PATH))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Chat backend error {}: {}",
                status,
                error_text
            ));
        }

        let body = response.text().await?;
        let listing: KnowledgeBaseList = from_json_lenient(&body)?;
        let names = listing
            .data
            .ok_or_else(|| anyhow::anyhow!("Knowledge base listing has no data field: {}", body))?;

        info!("knowledge bases available: {:?}", names);
        Ok(names)
    }
}

fn reply_from_body(body: &str) -> Result<String> {
    let parsed: ChatCompletionResponse = from_json_lenient(body)?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("Empty reply from chat backend"))
}

/// Parse a response body that may wrap its JSON in extra framing (some
/// deployments answer with an SSE-style `data: {...}` line even when
/// streaming is off). Falls back to the span between the first `{` and the
/// last `}`.
fn from_json_lenient<T: DeserializeOwned>(body: &str) -> Result<T> {
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(err) => {
            if let (Some(start), Some(end)) = (body.find('{'), body.rfind('}'))
                && start < end
                && let Ok(value) = serde_json::from_str(&body[start..=end])
            {
                warn!("recovered JSON payload from wrapped response body");
                return Ok(value);
            }

            Err(anyhow::anyhow!("Invalid JSON in response body: {}", err))
        }
    }
}
