//! LLM capability seam.
//!
//! The splitter only ever talks to an LLM through [`LlmCapability`]. Every
//! implementation must have an "unavailable" state the caller can detect,
//! and callers must keep working when a call fails.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a category was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    RuleBased,
    Llm,
}

impl std::fmt::Display for ClassificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RuleBased => write!(f, "rule_based"),
            Self::Llm => write!(f, "llm"),
        }
    }
}

/// Category decision with its confidence and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVerdict {
    pub category: String,
    pub confidence: f64,
    pub method: ClassificationMethod,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub keywords_found: Vec<String>,
}

/// Narrow LLM interface used by the splitter.
pub trait LlmCapability: Send + Sync {
    /// Whether a backend is configured and calls may succeed.
    fn is_available(&self) -> bool;

    /// Distill a 3-5 word Vietnamese keyword phrase from a document title.
    fn generate_keyword_from_title(&self, title: &str) -> Result<String>;

    /// Classify a block into the fixed category taxonomy.
    fn classify_category(&self, content: &str, filename: &str) -> Result<CategoryVerdict>;

    /// Human-readable backend name for logs and status endpoints.
    fn name(&self) -> String {
        "llm".to_string()
    }
}

/// Capability used when no provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLlm;

impl NoopLlm {
    pub fn new() -> Self {
        Self
    }
}

impl LlmCapability for NoopLlm {
    fn is_available(&self) -> bool {
        false
    }

    fn generate_keyword_from_title(&self, _title: &str) -> Result<String> {
        Err(Error::LlmUnavailable)
    }

    fn classify_category(&self, _content: &str, _filename: &str) -> Result<CategoryVerdict> {
        Err(Error::LlmUnavailable)
    }

    fn name(&self) -> String {
        "none".to_string()
    }
}
