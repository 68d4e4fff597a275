//! VnLegal Ingest: file text extraction, normalization, and the
//! store-then-split pipeline.

pub mod file;
pub mod ingest;
pub mod normalize;

pub use file::{extract_text, FileType};
pub use ingest::{content_hash, Ingester, ProcessReport};
pub use normalize::normalize_text;
