//! LLM capability backed by external HTTP APIs (OpenAI/Anthropic/Groq/Gemini).
//!
//! Calls are blocking and bounded by a per-request timeout. Nothing here is
//! required for splitting: without a configured key, [`create_llm`] hands
//! back a [`NoopLlm`] and the splitter stays rule-based.

pub mod config;
pub mod prompt;
pub mod providers;
pub mod types;

use std::sync::Arc;

use tracing::info;
use vnlegal_core::{LlmCapability, NoopLlm};

pub use config::LLMConfig;
pub use providers::{test_api_key, HttpLlm};
pub use types::*;

/// Build the capability for the resolved provider, or the no-op one.
pub fn create_llm(config: &LLMConfig) -> Arc<dyn LlmCapability> {
    match HttpLlm::from_config(config) {
        Some(llm) => {
            info!("LLM capability: {}", llm.name());
            Arc::new(llm)
        }
        None => {
            info!("No LLM provider configured, using rule-based fallbacks");
            Arc::new(NoopLlm::new())
        }
    }
}
