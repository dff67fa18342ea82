use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::S2cError;
use crate::wire::{ModelName, DEFAULT_TEMPERATURE};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: String,
    pub model: ModelName,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub api_base: String,
    pub out_dir: PathBuf,
    pub secrets_path: PathBuf,
    /// Resolved at load time, never read from the config file.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: "2025-10-01".into(),
            model: ModelName::default(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: 120,
            api_base: "https://api.openai.com".into(),
            out_dir: "s2c-out".into(),
            secrets_path: ".s2c/secrets.toml".into(),
            api_key: None,
        }
    }
}

/// Mirrors a secrets store with an optional `[openai]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    pub openai: Option<OpenAISecrets>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAISecrets {
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Secrets {
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(path)?;
        let secrets = toml::from_str(&s).with_context(|| format!("parsing secrets {}", path.display()))?;
        Ok(Some(secrets))
    }
}

/// A secrets file with an `[openai]` table wins over the environment, even
/// when its key is blank. Blank keys count as unconfigured.
pub fn resolve_api_key(secrets: Option<&Secrets>, env_key: Option<String>) -> Option<String> {
    let key = match secrets.and_then(|s| s.openai.as_ref()) {
        Some(table) => table.api_key.clone(),
        None => env_key,
    };
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, S2cError> {
        let cfg: Config = toml::from_str(s).map_err(|e| S2cError::Config(e.to_string()))?;
        if !(0.0..=1.0).contains(&cfg.temperature) {
            return Err(S2cError::Config(format!(
                "temperature must be within 0.0..=1.0, got {}",
                cfg.temperature
            )));
        }
        Ok(cfg)
    }

    /// Defaults, overlaid by the optional TOML file, with the API key resolved
    /// from `.env`, the secrets file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenv::dotenv();
        let mut cfg = match path {
            Some(p) => {
                let s = fs::read_to_string(p)?;
                Self::from_toml_str(&s).with_context(|| format!("reading config {}", p.display()))?
            }
            None => Config::default(),
        };
        let secrets = match Secrets::load(&cfg.secrets_path) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable secrets file");
                None
            }
        };
        cfg.api_key = resolve_api_key(secrets.as_ref(), std::env::var(API_KEY_ENV).ok());
        tracing::debug!(
            model = %cfg.model,
            api_base = %cfg.api_base,
            key_present = cfg.api_key.is_some(),
            "configuration loaded"
        );
        Ok(cfg)
    }
}
