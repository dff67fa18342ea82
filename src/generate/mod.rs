use serde::Serialize;

use crate::extract::{extract_csv_block, PortfolioExport};
use crate::prompt::ComposedPrompt;
use crate::provider::ChatProvider;
use crate::wire::{ChatRequest, ModelName};

pub const NOT_CONFIGURED_MESSAGE: &str =
    "⚠️ OpenAI client not initialized. Add your API key in Secrets or env.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    NotConfigured,
    Failed,
}

/// Result of one request cycle. Every failure has already been turned into
/// displayable text in `output`.
#[derive(Debug, Clone)]
pub struct Generation {
    pub outcome: Outcome,
    pub output: String,
    pub csv_block: String,
    pub export: Option<PortfolioExport>,
}

impl Generation {
    fn message(outcome: Outcome, output: String) -> Self {
        Self { outcome, output, csv_block: String::new(), export: None }
    }
}

pub async fn generate(
    provider: Option<&dyn ChatProvider>,
    prompt: &ComposedPrompt,
    model: ModelName,
    temperature: f32,
) -> Generation {
    let Some(provider) = provider else {
        tracing::info!("no API key configured; skipping model call");
        return Generation::message(Outcome::NotConfigured, NOT_CONFIGURED_MESSAGE.to_string());
    };

    let req = ChatRequest::new(model, temperature, prompt);
    tracing::info!(model = %model, temperature, "requesting completion");
    let output = match provider.complete(&req).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "completion failed");
            return Generation::message(Outcome::Failed, format!("⚠️ Error generating response: {e}"));
        }
    };

    let csv_block = extract_csv_block(Some(&output));
    let export = if csv_block.is_empty() {
        tracing::debug!("no portfolio table in model output");
        None
    } else {
        Some(PortfolioExport::from_block(&csv_block))
    };
    tracing::info!(output_chars = output.chars().count(), table = export.is_some(), "completion received");

    Generation { outcome: Outcome::Completed, output, csv_block, export }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::KNOWN_HEADERS;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Canned {
        reply: Result<String, String>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl Canned {
        fn ok(s: &str) -> Self {
            Self { reply: Ok(s.to_string()), seen: Mutex::new(Vec::new()) }
        }
        fn err(s: &str) -> Self {
            Self { reply: Err(s.to_string()), seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl ChatProvider for Canned {
        async fn complete(&self, req: &ChatRequest) -> Result<String> {
            self.seen.lock().unwrap().push(req.clone());
            self.reply.clone().map_err(|e| anyhow!(e))
        }
    }

    fn prompt() -> ComposedPrompt {
        ComposedPrompt { system: "sys".into(), user: "usr".into() }
    }

    #[tokio::test]
    async fn missing_provider_gives_advisory() {
        let g = generate(None, &prompt(), ModelName::default(), 0.2).await;
        assert_eq!(g.outcome, Outcome::NotConfigured);
        assert_eq!(g.output, NOT_CONFIGURED_MESSAGE);
        assert!(g.export.is_none());
    }

    #[tokio::test]
    async fn provider_error_becomes_warning() {
        let p = Canned::err("connection reset");
        let g = generate(Some(&p), &prompt(), ModelName::default(), 0.2).await;
        assert_eq!(g.outcome, Outcome::Failed);
        assert_eq!(g.output, "⚠️ Error generating response: connection reset");
        assert!(g.csv_block.is_empty());
        assert_eq!(p.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn table_is_extracted_and_parsed() {
        let text = format!(
            "5) PORTFOLIO TABLE\n{}\nP1,Billing,5,4,High,DMAIC Light,Finance Ops,2025-04-01\n\nDone.",
            KNOWN_HEADERS[2]
        );
        let p = Canned::ok(&text);
        let g = generate(Some(&p), &prompt(), ModelName::Gpt4o, 0.4).await;
        assert_eq!(g.outcome, Outcome::Completed);
        assert_eq!(g.output, text);
        assert!(g.csv_block.starts_with(KNOWN_HEADERS[2]));
        let table = g.export.as_ref().and_then(|e| e.table()).unwrap();
        assert_eq!(table.rows.len(), 1);

        let seen = p.seen.lock().unwrap();
        assert_eq!(seen[0].model, "gpt-4o");
        assert_eq!(seen[0].temperature, 0.4);
        assert_eq!(seen[0].messages[0].content, "sys");
        assert_eq!(seen[0].messages[1].content, "usr");
    }

    #[tokio::test]
    async fn prose_without_table_has_no_export() {
        let p = Canned::ok("Only prose here.");
        let g = generate(Some(&p), &prompt(), ModelName::default(), 0.2).await;
        assert_eq!(g.outcome, Outcome::Completed);
        assert!(g.csv_block.is_empty());
        assert!(g.export.is_none());
    }
}
