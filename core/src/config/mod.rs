use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const KBCHAT_DIR: &str = ".kbchat";

/// Which backend endpoint and payload shape a session uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    #[default]
    Model,
    KnowledgeBase,
    SearchEngine,
}

impl std::fmt::Display for ChatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::KnowledgeBase => write!(f, "knowledge_base"),
            Self::SearchEngine => write!(f, "search_engine"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmParams {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for LlmParams {
    fn default() -> Self {
        Self {
            model: "openai-api".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KnowledgeBaseParams {
    pub kb_name: String,
    pub top_k: u32,
    pub score_threshold: f64,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub prompt_name: String,
}

impl Default for KnowledgeBaseParams {
    fn default() -> Self {
        Self {
            kb_name: "samples".to_string(),
            top_k: 3,
            score_threshold: 1.0,
            model: "openai-api".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            prompt_name: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchEngineParams {
    pub engine: String,
    pub top_k: u32,
    pub score_threshold: f64,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub prompt_name: String,
}

impl Default for SearchEngineParams {
    fn default() -> Self {
        Self {
            engine: "duckduckgo".to_string(),
            top_k: 3,
            score_threshold: 1.0,
            model: "openai-api".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            prompt_name: "default".to_string(),
        }
    }
}

/// Caps the in-memory conversation history by cumulative content length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryPolicy {
    pub enabled: bool,
    pub max_chars: usize,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_chars: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub mode: ChatMode,
    pub llm: LlmParams,
    pub knowledge_base: KnowledgeBaseParams,
    pub search_engine: SearchEngineParams,
    pub history: HistoryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: "http://127.0.0.1:7861".to_string(),
            mode: ChatMode::default(),
            llm: LlmParams::default(),
            knowledge_base: KnowledgeBaseParams::default(),
            search_engine: SearchEngineParams::default(),
            history: HistoryPolicy::default(),
        }
    }
}

pub fn get_kbchat_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(KBCHAT_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_kbchat_dir().join("config.toml")
}

pub fn ensure_kbchat_dir() -> Result<PathBuf> {
    let kbchat_dir = get_kbchat_dir();

    if !kbchat_dir.exists() {
        std::fs::create_dir_all(&kbchat_dir).with_context(|| {
            format!(
                "Failed to create kbchat directory at {}",
                kbchat_dir.display()
            )
        })?;
    }

    Ok(kbchat_dir)
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }
}

pub fn load_config() -> Result<Config> {
    let config_path = get_config_path();

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!(
                "Config file not found. Run 'kbchat onboard' to set up your configuration."
            )
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", config_path.display(), e)
        }
    })?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    Ok(config)
}

pub fn save_config(config: &Config) -> Result<()> {
    ensure_kbchat_dir()?;

    let config_path = get_config_path();
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_conventions() {
        let config = Config::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:7861");
        assert_eq!(config.mode, ChatMode::Model);
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.knowledge_base.top_k, 3);
        assert_eq!(config.knowledge_base.prompt_name, "default");
        assert!(config.history.enabled);
        assert_eq!(config.history.max_chars, 300);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            endpoint = "http://10.0.0.5:7861"
            mode = "knowledge_base"

            [knowledge_base]
            kb_name = "astro"
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoint, "http://10.0.0.5:7861");
        assert_eq!(config.mode, ChatMode::KnowledgeBase);
        assert_eq!(config.knowledge_base.kb_name, "astro");
        assert_eq!(config.knowledge_base.top_k, 3);
        assert_eq!(config.llm.model, "openai-api");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config {
            mode: ChatMode::SearchEngine,
            search_engine: SearchEngineParams {
                engine: "bing".to_string(),
                ..Default::default()
            },
            history: HistoryPolicy {
                enabled: true,
                max_chars: 1200,
            },
            ..Default::default()
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn mode_names_are_snake_case() {
        assert_eq!(
            toml::from_str::<Config>("mode = \"search_engine\"")
                .unwrap()
                .mode,
            ChatMode::SearchEngine
        );
        assert!(toml::from_str::<Config>("mode = \"SearchEngine\"").is_err());
    }
}
