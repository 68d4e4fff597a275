//! Blocking HTTP clients for the supported providers.
//!
//! OpenAI and Groq share the chat-completions format. Anthropic and Gemini
//! each have their own request and response shapes.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::{debug, info};
use vnlegal_core::{CategoryVerdict, Error, LlmCapability, Result};

use crate::config::{LLMConfig, ResolvedProvider};
use crate::prompt;
use crate::types::LLMProvider;

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Output budget for keyword requests.
const KEYWORD_MAX_TOKENS: u32 = 64;

/// LLM capability calling one external provider.
///
/// A blocking client is built per request, so values of this type may be
/// created and dropped on async threads; only the calls must run off them.
pub struct HttpLlm {
    timeout: Duration,
    provider: LLMProvider,
    model: String,
    api_key: String,
    max_output_tokens: u32,
}

impl HttpLlm {
    pub fn new(resolved: ResolvedProvider, timeout: Duration, max_output_tokens: u32) -> Self {
        Self {
            timeout,
            provider: resolved.provider,
            model: resolved.model,
            api_key: resolved.api_key,
            max_output_tokens,
        }
    }

    /// Capability for the provider the config resolves to, if any.
    pub fn from_config(config: &LLMConfig) -> Option<Self> {
        config.resolve_provider().map(|resolved| {
            Self::new(
                resolved,
                Duration::from_secs(config.timeout_secs),
                config.max_output_tokens,
            )
        })
    }

    fn client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))
    }

    pub fn provider(&self) -> LLMProvider {
        self.provider
    }

    fn request_body(&self, prompt: &str, max_tokens: u32) -> Value {
        match self.provider {
            LLMProvider::OpenAI | LLMProvider::Groq => json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
                "temperature": 0.0,
                "top_p": 1.0,
                "max_tokens": max_tokens,
            }),
            LLMProvider::Anthropic => json!({
                "model": self.model,
                "max_tokens": max_tokens,
                "temperature": 0.0,
                "messages": [{"role": "user", "content": prompt}],
            }),
            LLMProvider::Gemini => json!({
                "contents": [{"role": "user", "parts": [{"text": prompt}]}],
                "generationConfig": {
                    "temperature": 0.0,
                    "topP": 1.0,
                    "maxOutputTokens": max_tokens,
                },
            }),
        }
    }

    /// Send one prompt and return the text of the reply.
    pub fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let client = self.client()?;
        let body = self.request_body(prompt, max_tokens);
        let request = match self.provider {
            LLMProvider::OpenAI => client.post(OPENAI_URL).bearer_auth(&self.api_key),
            LLMProvider::Groq => client.post(GROQ_URL).bearer_auth(&self.api_key),
            LLMProvider::Anthropic => client
                .post(ANTHROPIC_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            LLMProvider::Gemini => client
                .post(format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model))
                .query(&[("key", self.api_key.as_str())]),
        };

        let resp = request
            .json(&body)
            .send()
            .map_err(|e| Error::Http(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().unwrap_or_default();
            return Err(Error::Http(format!(
                "{} returned {}: {}",
                self.provider,
                status,
                detail.chars().take(200).collect::<String>()
            )));
        }
        let value: Value = resp.json().map_err(|e| Error::Http(e.to_string()))?;
        let text = extract_text(self.provider, &value)?;
        debug!("{} replied with {} chars", self.provider, text.len());
        Ok(text)
    }
}

/// Pull the reply text out of a provider response.
pub fn extract_text(provider: LLMProvider, value: &Value) -> Result<String> {
    let text = match provider {
        LLMProvider::OpenAI | LLMProvider::Groq => value["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string),
        LLMProvider::Anthropic => value["content"].as_array().map(|blocks| {
            blocks
                .iter()
                .filter_map(|b| b["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        }),
        LLMProvider::Gemini => value["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            }),
    };
    text.filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::Inference(format!("{} returned no text", provider)))
}

impl LlmCapability for HttpLlm {
    fn is_available(&self) -> bool {
        true
    }

    fn generate_keyword_from_title(&self, title: &str) -> Result<String> {
        let reply = self.complete(&prompt::keyword_prompt(title), KEYWORD_MAX_TOKENS)?;
        let keyword = prompt::clean_keyword(&reply)?;
        info!("Generated keyword from title: '{}'", keyword);
        Ok(keyword)
    }

    fn classify_category(&self, content: &str, filename: &str) -> Result<CategoryVerdict> {
        let reply = self.complete(
            &prompt::category_prompt(content, filename),
            self.max_output_tokens,
        )?;
        prompt::parse_category_response(&reply)
    }

    fn name(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }
}

/// Check that an API key is accepted by its provider.
pub fn test_api_key(provider: &str, api_key: &str) -> std::result::Result<(), String> {
    let provider: LLMProvider = provider.parse()?;
    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| e.to_string())?;

    let resp = match provider {
        LLMProvider::OpenAI => client
            .get("https://api.openai.com/v1/models")
            .bearer_auth(api_key)
            .send(),
        LLMProvider::Groq => client
            .get("https://api.groq.com/openai/v1/models")
            .bearer_auth(api_key)
            .send(),
        LLMProvider::Anthropic => client
            .post(ANTHROPIC_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": crate::config::DEFAULT_ANTHROPIC_MODEL,
                "max_tokens": 1,
                "messages": [{"role": "user", "content": "Hi"}],
            }))
            .send(),
        LLMProvider::Gemini => client
            .get(GEMINI_BASE_URL)
            .query(&[("key", api_key)])
            .send(),
    }
    .map_err(|e| e.to_string())?;

    // Anthropic answers 400 for a valid key with quota or model problems.
    if resp.status().is_success()
        || (provider == LLMProvider::Anthropic && resp.status().as_u16() == 400)
    {
        Ok(())
    } else {
        Err(format!("API returned status {}", resp.status()))
    }
}
