//! Row types for documents and stored blocks.

use serde::{Deserialize, Serialize};
use vnlegal_core::LegalBlock;

/// A document row from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Rendered Markdown from the last split, if the document was processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_markdown: Option<String>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Document {
    pub fn is_processed(&self) -> bool {
        self.metadata_markdown.is_some()
    }
}

/// Listing entry without the document text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub filename: String,
    pub text_length: i64,
    pub block_count: i64,
    pub processed: bool,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// A legal block as stored, with its owning document and position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlock {
    pub id: i64,
    pub document_id: i64,
    pub position: i64,
    #[serde(flatten)]
    pub block: LegalBlock,
}

/// Store-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_documents: i64,
    pub processed_documents: i64,
    pub total_blocks: i64,
    pub db_path: String,
    pub db_size_mb: f64,
}

/// Options for adding a document.
#[derive(Debug, Clone, Default)]
pub struct AddDocumentOptions {
    pub content_hash: Option<String>,
    pub created_at: Option<i64>,
}
