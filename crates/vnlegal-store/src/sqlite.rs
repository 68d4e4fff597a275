//! SQLite store for uploaded documents and the blocks split from them.
//!
//! Blocks are always replaced as a whole for one document, inside a
//! transaction, so a document never shows a half-written split.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use vnlegal_core::{Error, LegalBlock, Result};

use crate::schema::SCHEMA_SQL;
use crate::types::*;

const DB_FILE: &str = "vnlegal.db";

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::Database(e.to_string())
}

/// Map a UNIQUE violation on the content hash to `DuplicateContent`.
fn insert_err(e: rusqlite::Error, content_hash: Option<&str>) -> Error {
    if e.to_string().contains("UNIQUE constraint") {
        Error::DuplicateContent(content_hash.unwrap_or_default().to_string())
    } else {
        db_err(e)
    }
}

/// SQLite store behind a single connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create the store.
    ///
    /// `db_dir` is the directory (e.g., `data/db/`). The file will be `db_dir/vnlegal.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join(DB_FILE);

        let conn = Self::create_connection(&db_path)?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        info!(
            "SqliteStore initialized: {} documents, {} blocks, path={}",
            store.count_documents()?,
            store.count_blocks()?,
            store.db_path.display()
        );
        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(db_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(db_err)?;
        Ok(conn)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ---------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------

    /// Insert a document. Returns the new document ID.
    pub fn add_document(&self, filename: &str, text: &str, opts: AddDocumentOptions) -> Result<i64> {
        let now = opts.created_at.unwrap_or_else(now_millis);

        let conn = self.conn.lock();
        let id = conn
            .prepare_cached(
                "INSERT INTO documents (filename, text, content_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(db_err)?
            .insert(params![filename, text, opts.content_hash, now])
            .map_err(|e| insert_err(e, opts.content_hash.as_deref()))?;
        debug!("Added document {} ({})", id, filename);
        Ok(id)
    }

    /// Find a document by content hash.
    pub fn find_document_by_hash(&self, content_hash: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        let doc = conn
            .prepare_cached("SELECT * FROM documents WHERE content_hash = ?1")
            .map_err(db_err)?
            .query_row(params![content_hash], Self::row_to_document)
            .optional()
            .map_err(db_err)?;
        Ok(doc)
    }

    /// Get a document by ID.
    pub fn get_document(&self, id: i64) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        let doc = conn
            .prepare_cached("SELECT * FROM documents WHERE id = ?1")
            .map_err(db_err)?
            .query_row(params![id], Self::row_to_document)
            .optional()
            .map_err(db_err)?;
        Ok(doc)
    }

    /// Get a document by ID or fail with `NotFound`.
    pub fn require_document(&self, id: i64) -> Result<Document> {
        self.get_document(id)?
            .ok_or_else(|| Error::NotFound(format!("document {}", id)))
    }

    /// Page of document summaries, newest first. Pages are 1-based.
    pub fn get_documents_paginated(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<(Vec<DocumentSummary>, i64)> {
        let total = self.count_documents()?;
        let offset = page.saturating_sub(1) * page_size;

        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT d.id, d.filename, length(d.text), d.metadata_markdown IS NOT NULL,
                        d.created_at, d.updated_at,
                        (SELECT COUNT(*) FROM legal_blocks b WHERE b.document_id = d.id)
                 FROM documents d
                 ORDER BY d.created_at DESC, d.id DESC
                 LIMIT ?1 OFFSET ?2",
            )
            .map_err(db_err)?;
        let docs = stmt
            .query_map(params![page_size as i64, offset as i64], |row| {
                Ok(DocumentSummary {
                    id: row.get(0)?,
                    filename: row.get(1)?,
                    text_length: row.get(2)?,
                    processed: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                    block_count: row.get(6)?,
                })
            })
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;
        Ok((docs, total))
    }

    /// Replace a document's text, e.g. after a user corrects OCR output.
    ///
    /// Its blocks and rendered Markdown are cleared since they no longer
    /// describe the text.
    pub fn update_document_text(
        &self,
        id: i64,
        text: &str,
        content_hash: Option<&str>,
    ) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err)?;
        let count = tx
            .execute(
                "UPDATE documents SET text = ?1, content_hash = ?2, metadata_markdown = NULL, updated_at = ?3
                 WHERE id = ?4",
                params![text, content_hash, now_millis(), id],
            )
            .map_err(|e| insert_err(e, content_hash))?;
        if count == 0 {
            return Ok(false);
        }
        tx.execute("DELETE FROM legal_blocks WHERE document_id = ?1", params![id])
            .map_err(db_err)?;
        tx.commit().map_err(db_err)?;
        debug!("Updated text of document {}", id);
        Ok(true)
    }

    /// Delete a document and its blocks (cascade).
    pub fn delete_document(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute("DELETE FROM documents WHERE id = ?1", params![id])
            .map_err(db_err)?;
        Ok(count > 0)
    }

    /// Store the rendered Markdown of a processed document.
    pub fn set_metadata_markdown(&self, id: i64, markdown: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .prepare_cached(
                "UPDATE documents SET metadata_markdown = ?1, updated_at = ?2 WHERE id = ?3",
            )
            .map_err(db_err)?
            .execute(params![markdown, now_millis(), id])
            .map_err(db_err)?;
        Ok(count > 0)
    }

    pub fn count_documents(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(count)
    }

    // ---------------------------------------------------------------
    // Blocks
    // ---------------------------------------------------------------

    /// Replace all blocks of a document. Positions follow list order from 0.
    pub fn save_blocks(&self, document_id: i64, blocks: &[LegalBlock]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err)?;

        let exists: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM documents WHERE id = ?1)",
                params![document_id],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        if !exists {
            return Err(Error::NotFound(format!("document {}", document_id)));
        }

        tx.execute(
            "DELETE FROM legal_blocks WHERE document_id = ?1",
            params![document_id],
        )
        .map_err(db_err)?;

        let now = now_millis();
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO legal_blocks
                     (document_id, position, doc_id, department, type_data, category, date, source, content, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )
                .map_err(db_err)?;
            for (position, b) in blocks.iter().enumerate() {
                stmt.execute(params![
                    document_id,
                    position as i64,
                    b.doc_id,
                    b.department,
                    b.type_data,
                    b.category,
                    b.date,
                    b.source,
                    b.content,
                    now
                ])
                .map_err(db_err)?;
            }
        }
        tx.commit().map_err(db_err)?;

        info!("Saved {} blocks for document {}", blocks.len(), document_id);
        Ok(blocks.len())
    }

    /// Blocks of a document in position order.
    pub fn get_blocks(&self, document_id: i64) -> Result<Vec<StoredBlock>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM legal_blocks WHERE document_id = ?1 ORDER BY position",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![document_id], Self::row_to_block)
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;
        Ok(rows)
    }

    pub fn count_blocks(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM legal_blocks", [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(count)
    }

    pub fn get_stats(&self) -> Result<StoreStats> {
        let total_documents = self.count_documents()?;
        let total_blocks = self.count_blocks()?;

        let conn = self.conn.lock();
        let processed_documents: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM documents WHERE metadata_markdown IS NOT NULL",
                [],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        drop(conn);

        let db_size = std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(StoreStats {
            total_documents,
            processed_documents,
            total_blocks,
            db_path: self.db_path.to_string_lossy().to_string(),
            db_size_mb: db_size as f64 / (1024.0 * 1024.0),
        })
    }

    // ---------------------------------------------------------------
    // Row mapping
    // ---------------------------------------------------------------

    fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
        Ok(Document {
            id: row.get("id")?,
            filename: row.get("filename")?,
            text: row.get("text")?,
            content_hash: row.get("content_hash")?,
            metadata_markdown: row.get("metadata_markdown")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn row_to_block(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredBlock> {
        Ok(StoredBlock {
            id: row.get("id")?,
            document_id: row.get("document_id")?,
            position: row.get("position")?,
            block: LegalBlock {
                doc_id: row.get("doc_id")?,
                department: row.get("department")?,
                type_data: row.get("type_data")?,
                category: row.get("category")?,
                date: row.get("date")?,
                source: row.get("source")?,
                content: row.get("content")?,
            },
        })
    }
}
