//! Title keyword generation with a per-title cache.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};
use vnlegal_core::LlmCapability;

/// Words kept by the rule-based fallback.
const FALLBACK_WORDS: usize = 5;

#[derive(Debug, Clone)]
struct CachedKeyword {
    title: String,
    keyword: String,
}

/// Produces the keyword phrase used in the Markdown block titles.
///
/// The last `(title, keyword)` pair is cached, so rendering a document asks
/// the LLM at most once; a different title recomputes.
pub struct KeywordGenerator {
    llm: Arc<dyn LlmCapability>,
    use_llm: bool,
    cache: Mutex<Option<CachedKeyword>>,
}

impl KeywordGenerator {
    pub fn new(llm: Arc<dyn LlmCapability>, use_llm: bool) -> Self {
        Self {
            llm,
            use_llm,
            cache: Mutex::new(None),
        }
    }

    /// First words of the title.
    pub fn fallback_keyword(title: &str) -> String {
        title
            .split_whitespace()
            .take(FALLBACK_WORDS)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Keyword for `title`, from the cache when the title is unchanged.
    pub fn generate(&self, title: &str) -> String {
        if let Some(cached) = self.cache.lock().as_ref() {
            if cached.title == title {
                return cached.keyword.clone();
            }
        }

        let keyword = self.compute(title);
        *self.cache.lock() = Some(CachedKeyword {
            title: title.to_string(),
            keyword: keyword.clone(),
        });
        keyword
    }

    fn compute(&self, title: &str) -> String {
        if title.trim().is_empty() {
            return String::new();
        }
        if !self.use_llm || !self.llm.is_available() {
            return Self::fallback_keyword(title);
        }

        match self.llm.generate_keyword_from_title(title) {
            Ok(keyword) if !keyword.trim().is_empty() => {
                debug!(backend = %self.llm.name(), "LLM keyword generated");
                keyword.trim().to_string()
            }
            Ok(_) => {
                warn!("LLM returned an empty keyword, using fallback");
                Self::fallback_keyword(title)
            }
            Err(e) => {
                warn!("Keyword generation failed, using fallback: {}", e);
                Self::fallback_keyword(title)
            }
        }
    }

    /// Forget the cached keyword.
    pub fn reset(&self) {
        *self.cache.lock() = None;
    }
}
