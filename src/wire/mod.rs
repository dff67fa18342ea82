use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::prompt::ComposedPrompt;

/// ========================================
/// Chat-completion wire types
/// ========================================

pub const DEFAULT_TEMPERATURE: f32 = 0.2;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelName {
    #[default]
    #[value(name = "gpt-4o-mini")]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[value(name = "gpt-4o")]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[value(name = "gpt-4.1-mini")]
    #[serde(rename = "gpt-4.1-mini")]
    Gpt41Mini,
    #[value(name = "gpt-4.1")]
    #[serde(rename = "gpt-4.1")]
    Gpt41,
    #[value(name = "gpt-3.5-turbo")]
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
}

impl ModelName {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelName::Gpt4oMini => "gpt-4o-mini",
            ModelName::Gpt4o => "gpt-4o",
            ModelName::Gpt41Mini => "gpt-4.1-mini",
            ModelName::Gpt41 => "gpt-4.1",
            ModelName::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a temperature and keeps it inside `[0, 1]`.
pub fn parse_temperature(s: &str) -> Result<f32, String> {
    let t: f32 = s.trim().parse().map_err(|_| format!("`{s}` is not a number"))?;
    if !(0.0..=1.0).contains(&t) {
        return Err(format!("temperature must be within 0.0..=1.0, got {t}"));
    }
    Ok(t)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn new(model: ModelName, temperature: f32, prompt: &ComposedPrompt) -> Self {
        Self {
            model: model.as_str().to_string(),
            temperature,
            messages: vec![
                ChatMessage { role: "system".into(), content: prompt.system.clone() },
                ChatMessage { role: "user".into(), content: prompt.user.clone() },
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}
