//! The splitting pipeline: metadata, preamble, decision, hierarchy, categories.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};
use vnlegal_core::{
    CategoryVerdict, LegalBlock, LlmCapability, NoopLlm, SplitterSettings, TYPE_DATA_MARKDOWN,
};

use crate::classify::{classify_by_content, classify_by_filename, is_valid_category};
use crate::decision;
use crate::hierarchy::{self, BlockType, HierarchyOptions, Section};
use crate::keyword::KeywordGenerator;
use crate::legal_basis;
use crate::lines::index_lines;
use crate::markdown;
use crate::metadata::{self, DocumentMetadata, DEFAULT_TITLE};
use crate::patterns::FOOTER;
use crate::source::SourceLocator;

/// Title remembered from the last split, keyed by document number.
#[derive(Debug, Clone)]
struct LastDocument {
    doc_id: String,
    title: String,
}

/// Everything produced for one document.
#[derive(Debug, Clone, Serialize)]
pub struct SplitOutput {
    pub title: String,
    pub keyword: String,
    pub blocks: Vec<LegalBlock>,
    pub markdown: String,
}

/// Intermediate result of the rule pipeline, before categories are attached.
#[derive(Debug, Clone)]
pub struct DocumentPlan {
    pub metadata: DocumentMetadata,
    pub title: String,
    pub sections: Vec<Section>,
}

/// Splits Vietnamese legal documents into metadata-tagged blocks.
///
/// Each instance owns its keyword cache. Share one instance per document
/// run, or build a fresh one per request; construction is cheap.
pub struct LegalSplitter {
    llm: Arc<dyn LlmCapability>,
    settings: SplitterSettings,
    keywords: KeywordGenerator,
    last_document: Mutex<Option<LastDocument>>,
}

impl LegalSplitter {
    pub fn new(llm: Arc<dyn LlmCapability>, settings: SplitterSettings) -> Self {
        Self {
            keywords: KeywordGenerator::new(llm.clone(), settings.use_llm),
            llm,
            settings,
            last_document: Mutex::new(None),
        }
    }

    /// Splitter that never calls an LLM.
    pub fn rule_based() -> Self {
        Self::new(
            Arc::new(NoopLlm::new()),
            SplitterSettings {
                use_llm: false,
                llm_category: false,
                ..SplitterSettings::default()
            },
        )
    }

    pub fn settings(&self) -> SplitterSettings {
        self.settings
    }

    /// Name of the LLM backend in use.
    pub fn llm_name(&self) -> String {
        self.llm.name()
    }

    /// Run the rule pipeline without classification.
    pub fn plan(&self, text: &str) -> DocumentPlan {
        let text = normalize_newlines(text);
        let metadata = metadata::extract(&text);

        let footer_at = index_lines(&text)
            .iter()
            .find(|l| FOOTER.is_match(l.text))
            .map_or(text.len(), |l| l.start);
        let basis = legal_basis::extract(&text[..footer_at]);

        let start_at = hierarchy::start_offset(&text, hierarchy::find_start_point(&text));
        let span = decision::find_span(&text).map(|s| s.clip_to(&text, start_at));
        let decision_content = span
            .as_ref()
            .map(|s| decision::content_of(&text, s))
            .unwrap_or_default();

        let mut sections = Vec::new();
        if !basis.is_empty() {
            sections.push(Section::new(BlockType::CanCu, SourceLocator::LegalBasis, basis));
        }
        let title = metadata::extract_document_title(
            &text,
            (!decision_content.is_empty()).then_some(decision_content.as_str()),
        );
        if !decision_content.is_empty() {
            sections.push(Section::new(
                BlockType::QuyetDinh,
                SourceLocator::Decision,
                decision_content,
            ));
        }

        let opts = HierarchyOptions {
            emit_chapters: self.settings.emit_chapters,
            split_points: self.settings.split_points,
        };
        sections.extend(hierarchy::split(&text, span.as_ref(), opts));

        DocumentPlan {
            metadata,
            title,
            sections,
        }
    }

    fn category_for(&self, content: &str, filename: &str, by_filename: &CategoryVerdict) -> String {
        if self.settings.llm_category && self.llm.is_available() {
            match self.llm.classify_category(content, filename) {
                Ok(v) if v.confidence > 0.0 && is_valid_category(&v.category) => {
                    return v.category;
                }
                Ok(v) => debug!(category = %v.category, "LLM category rejected"),
                Err(e) => warn!("LLM category classification failed: {}", e),
            }
        }
        if by_filename.confidence > 0.0 {
            return by_filename.category.clone();
        }
        classify_by_content(content).category
    }

    /// Split a document into ordered legal blocks.
    ///
    /// Empty or whitespace-only text yields no blocks.
    pub fn split_document(&self, text: &str, filename: &str) -> Vec<LegalBlock> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let plan = self.plan(text);
        let by_filename = classify_by_filename(filename);
        let meta = &plan.metadata;

        let blocks: Vec<LegalBlock> = plan
            .sections
            .iter()
            .map(|section| LegalBlock {
                doc_id: meta.doc_id.clone(),
                department: meta.department.clone(),
                type_data: TYPE_DATA_MARKDOWN.to_string(),
                category: self.category_for(&section.content, filename, &by_filename),
                date: meta.date.clone(),
                source: section.locator.to_string(),
                content: section.content.clone(),
            })
            .collect();

        info!(
            "Split '{}' into {} blocks (doc_id: {:?})",
            filename,
            blocks.len(),
            meta.doc_id
        );

        *self.last_document.lock() = Some(LastDocument {
            doc_id: plan.metadata.doc_id,
            title: plan.title,
        });
        blocks
    }

    /// Title for a block list: the last split document's title when the
    /// numbers agree, otherwise the quoted name in the decision block.
    fn title_for(&self, blocks: &[LegalBlock]) -> String {
        let doc_id = blocks.first().map(|b| b.doc_id.as_str()).unwrap_or_default();
        if let Some(last) = self.last_document.lock().as_ref() {
            if last.doc_id == doc_id {
                return last.title.clone();
            }
        }
        blocks
            .iter()
            .find(|b| b.is_decision())
            .and_then(|b| metadata::title_from_decision(&b.content))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    /// Render blocks to Markdown.
    pub fn to_markdown(&self, blocks: &[LegalBlock]) -> String {
        if blocks.is_empty() {
            return String::new();
        }
        let keyword = self.keywords.generate(&self.title_for(blocks));
        markdown::render(blocks, &keyword)
    }

    /// Split and render in one call.
    pub fn split_to_markdown(&self, text: &str, filename: &str) -> SplitOutput {
        let blocks = self.split_document(text, filename);
        if blocks.is_empty() {
            return SplitOutput {
                title: String::new(),
                keyword: String::new(),
                blocks,
                markdown: String::new(),
            };
        }
        let title = self.title_for(&blocks);
        let keyword = self.keywords.generate(&title);
        let markdown = markdown::render(&blocks, &keyword);
        SplitOutput {
            title,
            keyword,
            blocks,
            markdown,
        }
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
