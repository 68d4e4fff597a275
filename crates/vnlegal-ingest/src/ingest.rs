//! Document ingestion pipeline: file → text → store, then store → blocks.

use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use vnlegal_core::{Error, LegalBlock, Result};
use vnlegal_splitter::LegalSplitter;
use vnlegal_store::{AddDocumentOptions, SqliteStore};

use crate::file;
use crate::normalize::normalize_text;

/// Outcome of splitting one stored document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReport {
    pub document_id: i64,
    pub filename: String,
    pub title: String,
    pub keyword: String,
    pub block_count: usize,
    pub blocks: Vec<LegalBlock>,
    pub markdown: String,
}

/// Handles document ingestion: text extraction, dedup, storage and splitting.
pub struct Ingester<'a> {
    store: &'a SqliteStore,
    splitter: &'a LegalSplitter,
}

impl<'a> Ingester<'a> {
    pub fn new(store: &'a SqliteStore, splitter: &'a LegalSplitter) -> Self {
        Self { store, splitter }
    }

    /// Ingest a file: extract and normalize its text, then store it.
    /// Returns the document ID.
    pub fn ingest_file(&self, path: &Path, filename: &str) -> Result<i64> {
        let raw = file::extract_text(path)?;
        self.ingest_text(filename, &raw)
    }

    /// Ingest already-extracted text.
    pub fn ingest_text(&self, filename: &str, raw: &str) -> Result<i64> {
        let text = normalize_text(raw);
        if text.is_empty() {
            return Err(Error::Extraction(format!("no text extracted from {}", filename)));
        }

        let content_hash = content_hash(&text);
        if self.store.find_document_by_hash(&content_hash)?.is_some() {
            debug!("Duplicate content, skipping: {}", filename);
            return Err(Error::DuplicateContent(content_hash));
        }

        let id = self.store.add_document(
            filename,
            &text,
            AddDocumentOptions {
                content_hash: Some(content_hash),
                ..Default::default()
            },
        )?;
        info!("Ingested document {} ({}, {} chars)", id, filename, text.chars().count());
        Ok(id)
    }

    /// Replace a document's text with a corrected version.
    ///
    /// The text is stored as given, apart from line endings, so manual
    /// corrections survive; the old split is discarded.
    pub fn update_text(&self, id: i64, text: &str) -> Result<()> {
        let text = text.replace("\r\n", "\n");
        if text.trim().is_empty() {
            return Err(Error::Ingest("document text cannot be empty".into()));
        }
        let hash = content_hash(&text);
        if !self.store.update_document_text(id, &text, Some(&hash))? {
            return Err(Error::NotFound(format!("document {}", id)));
        }
        info!("Replaced text of document {}", id);
        Ok(())
    }

    /// Split a stored document, replace its blocks and store its Markdown.
    pub fn process_document(&self, id: i64) -> Result<ProcessReport> {
        let doc = self.store.require_document(id)?;
        let output = self.splitter.split_to_markdown(&doc.text, &doc.filename);

        self.store.save_blocks(id, &output.blocks)?;
        self.store.set_metadata_markdown(id, &output.markdown)?;
        info!(
            "Processed document {} ({}): {} blocks",
            id,
            doc.filename,
            output.blocks.len()
        );

        Ok(ProcessReport {
            document_id: id,
            filename: doc.filename,
            title: output.title,
            keyword: output.keyword,
            block_count: output.blocks.len(),
            blocks: output.blocks,
            markdown: output.markdown,
        })
    }
}

/// Compute SHA-256 content hash.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash() {
        let h = content_hash("Điều 1");
        assert_eq!(h.len(), 64);
        assert_eq!(h, content_hash("Điều 1"));
        assert_ne!(h, content_hash("Điều 2"));
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
