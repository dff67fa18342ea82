use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::errors::S2cError;
use crate::wire::{ChatRequest, ChatResponse};

/// OpenAI Chat Completions over HTTPS with bearer auth.
pub struct OpenAIProvider {
    api_key: String,
    api_base: String,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(api_key: String, api_base: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { api_key, api_base, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

/// Pulls the first choice's text out of a raw completion body.
pub(crate) fn parse_completion(status: StatusCode, body: &str) -> Result<String, S2cError> {
    if !status.is_success() {
        return Err(S2cError::Provider(format!("OpenAI API error ({status}): {body}")));
    }
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| S2cError::Provider(format!("failed to parse OpenAI response: {e}")))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();
    Ok(content.trim().to_string())
}

#[async_trait]
impl super::ChatProvider for OpenAIProvider {
    async fn complete(&self, req: &ChatRequest) -> Result<String> {
        let url = self.endpoint();
        let pretty = serde_json::to_string_pretty(req)?;
        tracing::debug!(%url, body = %pretty, "debug[openai]: HTTP POST");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await
            .map_err(|e| anyhow!("OpenAI request failed: {e}"))?;

        let status = resp.status();
        let text = resp.text().await.context("reading OpenAI response body")?;
        tracing::debug!(%status, raw = %text, "debug[openai]: raw response");

        Ok(parse_completion(status, &text)?)
    }
}
