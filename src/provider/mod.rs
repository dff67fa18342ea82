use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::config::Config;
use crate::wire::ChatRequest;

pub mod openai;

/// External chat-completion service: one request in, one text completion out.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, req: &ChatRequest) -> Result<String>;
}

pub type DynProvider = Box<dyn ChatProvider>;

/// Builds the provider from explicit configuration. `None` means no API key
/// is configured; composing and previewing prompts still works without one.
pub fn make_provider(cfg: &Config) -> Result<Option<DynProvider>> {
    let Some(key) = cfg.api_key.clone() else {
        return Ok(None);
    };
    let provider = openai::OpenAIProvider::new(
        key,
        cfg.api_base.clone(),
        Duration::from_secs(cfg.timeout_secs),
    )?;
    Ok(Some(Box::new(provider)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_key_no_provider() {
        let cfg = Config::default();
        assert!(make_provider(&cfg).unwrap().is_none());
    }

    #[test]
    fn key_builds_provider() {
        let cfg = Config { api_key: Some("sk-test".into()), ..Config::default() };
        assert!(make_provider(&cfg).unwrap().is_some());
    }
}
