//! LLM configuration persistence and provider selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use vnlegal_core::{Error, Result};

use crate::types::{LLMConfigResponse, LLMConfigUpdate, LLMProvider};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1000;

pub const OPENAI_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo"];
pub const ANTHROPIC_MODELS: &[&str] = &[
    "claude-3-5-haiku-20241022",
    "claude-3-5-sonnet-20241022",
    "claude-sonnet-4-20250514",
];
pub const GROQ_MODELS: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "gemma2-9b-it",
];
pub const GEMINI_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-2.0-flash", "gemini-1.5-pro"];

/// A provider with the model and key to call it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub provider: LLMProvider,
    pub model: String,
    pub api_key: String,
}

/// Stored LLM configuration (persisted to llm-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}
fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.into()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: default_preferred(),
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            gemini_api_key: None,
            openai_model: default_openai_model(),
            anthropic_model: default_anthropic_model(),
            groq_model: default_groq_model(),
            gemini_model: default_gemini_model(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            config_path: PathBuf::new(),
        }
    }
}

/// Blank keys count as unset.
fn non_empty(key: &str) -> Option<String> {
    let key = key.trim();
    (!key.is_empty()).then(|| key.to_string())
}

fn env_key(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().and_then(|v| non_empty(&v)))
}

impl LLMConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config: LLMConfig = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        config.config_path = config_path.to_path_buf();

        if config.openai_api_key.is_none() {
            config.openai_api_key = env_key(&["OPENAI_API_KEY"]);
        }
        if config.anthropic_api_key.is_none() {
            config.anthropic_api_key = env_key(&["ANTHROPIC_API_KEY"]);
        }
        if config.groq_api_key.is_none() {
            config.groq_api_key = env_key(&["GROQ_API_KEY"]);
        }
        if config.gemini_api_key.is_none() {
            config.gemini_api_key = env_key(&["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
        }

        config
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.config_path, json)?;
        info!("Saved LLM config to {}", self.config_path.display());
        Ok(())
    }

    /// Apply an update, merging with existing config. An empty key clears it.
    pub fn apply_update(&mut self, update: &LLMConfigUpdate) -> Result<()> {
        if let Some(p) = &update.preferred_provider {
            if p != "auto" {
                p.parse::<LLMProvider>().map_err(Error::Config)?;
            }
            self.preferred_provider = p.to_lowercase();
        }
        if let Some(k) = &update.openai_api_key {
            self.openai_api_key = non_empty(k);
        }
        if let Some(k) = &update.anthropic_api_key {
            self.anthropic_api_key = non_empty(k);
        }
        if let Some(k) = &update.groq_api_key {
            self.groq_api_key = non_empty(k);
        }
        if let Some(k) = &update.gemini_api_key {
            self.gemini_api_key = non_empty(k);
        }
        if let Some(m) = &update.openai_model {
            self.openai_model = m.clone();
        }
        if let Some(m) = &update.anthropic_model {
            self.anthropic_model = m.clone();
        }
        if let Some(m) = &update.groq_model {
            self.groq_model = m.clone();
        }
        if let Some(m) = &update.gemini_model {
            self.gemini_model = m.clone();
        }
        if let Some(t) = update.timeout_secs {
            if t == 0 {
                return Err(Error::Config("timeoutSecs must be positive".into()));
            }
            self.timeout_secs = t;
        }
        Ok(())
    }

    fn configured(&self, provider: LLMProvider) -> Option<ResolvedProvider> {
        let (key, model) = match provider {
            LLMProvider::OpenAI => (&self.openai_api_key, &self.openai_model),
            LLMProvider::Anthropic => (&self.anthropic_api_key, &self.anthropic_model),
            LLMProvider::Groq => (&self.groq_api_key, &self.groq_model),
            LLMProvider::Gemini => (&self.gemini_api_key, &self.gemini_model),
        };
        key.as_ref().map(|k| ResolvedProvider {
            provider,
            model: model.clone(),
            api_key: k.clone(),
        })
    }

    /// Resolve which provider and model to use.
    pub fn resolve_provider(&self) -> Option<ResolvedProvider> {
        if self.preferred_provider != "auto" {
            return self
                .preferred_provider
                .parse::<LLMProvider>()
                .ok()
                .and_then(|p| self.configured(p));
        }

        // Auto mode: Anthropic > Groq > OpenAI > Gemini
        [
            LLMProvider::Anthropic,
            LLMProvider::Groq,
            LLMProvider::OpenAI,
            LLMProvider::Gemini,
        ]
        .into_iter()
        .find_map(|p| self.configured(p))
    }

    /// Build the public config response (no API keys exposed).
    pub fn to_response(&self) -> LLMConfigResponse {
        LLMConfigResponse {
            preferred_provider: self.preferred_provider.clone(),
            openai_configured: self.openai_api_key.is_some(),
            anthropic_configured: self.anthropic_api_key.is_some(),
            groq_configured: self.groq_api_key.is_some(),
            gemini_configured: self.gemini_api_key.is_some(),
            openai_model: self.openai_model.clone(),
            anthropic_model: self.anthropic_model.clone(),
            groq_model: self.groq_model.clone(),
            gemini_model: self.gemini_model.clone(),
            timeout_secs: self.timeout_secs,
            active_provider: self.resolve_provider().map(|r| r.provider.to_string()),
            available_models: self.available_models(),
        }
    }

    /// Get available models for the active provider.
    pub fn available_models(&self) -> Vec<String> {
        let models = match self.resolve_provider().map(|r| r.provider) {
            Some(LLMProvider::OpenAI) => OPENAI_MODELS,
            Some(LLMProvider::Anthropic) => ANTHROPIC_MODELS,
            Some(LLMProvider::Groq) => GROQ_MODELS,
            Some(LLMProvider::Gemini) => GEMINI_MODELS,
            None => &[],
        };
        models.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_auto_preference_order() {
        let mut config = LLMConfig {
            gemini_api_key: Some("g".into()),
            openai_api_key: Some("o".into()),
            ..LLMConfig::default()
        };
        assert_eq!(config.resolve_provider().unwrap().provider, LLMProvider::OpenAI);

        config.groq_api_key = Some("q".into());
        assert_eq!(config.resolve_provider().unwrap().provider, LLMProvider::Groq);

        config.anthropic_api_key = Some("a".into());
        let resolved = config.resolve_provider().unwrap();
        assert_eq!(resolved.provider, LLMProvider::Anthropic);
        assert_eq!(resolved.model, DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(resolved.api_key, "a");
    }

    #[test]
    fn test_explicit_provider_requires_key() {
        let config = LLMConfig {
            preferred_provider: "gemini".into(),
            openai_api_key: Some("o".into()),
            ..LLMConfig::default()
        };
        assert!(config.resolve_provider().is_none());
        assert!(config.available_models().is_empty());
        assert!(config.to_response().active_provider.is_none());
    }

    #[test]
    fn test_apply_update() {
        let mut config = LLMConfig {
            groq_api_key: Some("old".into()),
            ..LLMConfig::default()
        };
        config
            .apply_update(&LLMConfigUpdate {
                preferred_provider: Some("Gemini".into()),
                gemini_api_key: Some("new".into()),
                groq_api_key: Some("  ".into()),
                gemini_model: Some("gemini-2.0-flash".into()),
                ..LLMConfigUpdate::default()
            })
            .unwrap();

        assert_eq!(config.preferred_provider, "gemini");
        assert!(config.groq_api_key.is_none());
        let resolved = config.resolve_provider().unwrap();
        assert_eq!(resolved.provider, LLMProvider::Gemini);
        assert_eq!(resolved.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_apply_update_rejects_bad_values() {
        let mut config = LLMConfig::default();
        let bad_provider = LLMConfigUpdate {
            preferred_provider: Some("ollama".into()),
            ..LLMConfigUpdate::default()
        };
        assert!(matches!(config.apply_update(&bad_provider), Err(Error::Config(_))));
        assert_eq!(config.preferred_provider, "auto");

        let zero_timeout = LLMConfigUpdate {
            timeout_secs: Some(0),
            ..LLMConfigUpdate::default()
        };
        assert!(config.apply_update(&zero_timeout).is_err());
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("llm-config.json");

        let mut config = LLMConfig::load(&path);
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        config.anthropic_api_key = Some("sk-ant".into());
        config.timeout_secs = 30;
        config.save().unwrap();

        let loaded = LLMConfig::load(&path);
        assert_eq!(loaded.anthropic_api_key.as_deref(), Some("sk-ant"));
        assert_eq!(loaded.timeout_secs, 30);
        assert_eq!(loaded.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
        assert_eq!(loaded.config_path, path);
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("llm-config.json");
        std::fs::write(&path, r#"{"preferred_provider":"groq","groq_model":"gemma2-9b-it"}"#).unwrap();

        let config = LLMConfig::load(&path);
        assert_eq!(config.preferred_provider, "groq");
        assert_eq!(config.groq_model, "gemma2-9b-it");
        assert_eq!(config.openai_model, DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn test_response_masks_keys() {
        let config = LLMConfig {
            groq_api_key: Some("secret".into()),
            ..LLMConfig::default()
        };
        let json = serde_json::to_string(&config.to_response()).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"groqConfigured\":true"));
        assert!(json.contains("\"activeProvider\":\"groq\""));
    }
}
