use crate::backends::ChatchatBackend;
use crate::config::Config;
use crate::traits::Backend;
use anyhow::{Result, anyhow};
use std::sync::Arc;

pub fn create_backend(config: &Config) -> Result<Arc<dyn Backend>> {
    if config.endpoint.trim().is_empty() {
        return Err(anyhow!(
            "Backend endpoint is not configured. Run 'kbchat onboard' to set one."
        ));
    }

    let backend = ChatchatBackend::new(config.endpoint.clone())
        .with_mode(config.mode)
        .with_llm(config.llm.clone())
        .with_knowledge_base(config.knowledge_base.clone())
        .with_search_engine(config.search_engine.clone());

    Ok(Arc::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_from_default_config() {
        let config = Config::default();
        assert!(create_backend(&config).is_ok());
    }

    #[test]
    fn factory_rejects_blank_endpoint() {
        let config = Config {
            endpoint: "   ".to_string(),
            ..Default::default()
        };
        assert!(create_backend(&config).is_err());
    }
}
