//! VnLegal Splitter: turns Vietnamese legal documents into metadata-tagged blocks.
//!
//! Handles the document header (number, issue date, department), the `Căn cứ`
//! preamble, the `QUYẾT ĐỊNH` statement, and the `Chương` / `Điều` / `Khoản` /
//! `Điểm` / `Phụ lục` hierarchy. Each block carries its category and a
//! source locator; [`LegalSplitter::to_markdown`] renders the result.

pub mod classify;
pub mod decision;
pub mod fold;
pub mod hierarchy;
pub mod keyword;
pub mod legal_basis;
mod lines;
pub mod markdown;
pub mod metadata;
pub mod patterns;
pub mod source;
pub mod splitter;

pub use classify::{classify_by_content, classify_by_filename, classify_department, CATEGORIES};
pub use decision::DecisionSpan;
pub use hierarchy::{should_split_by_khoan, BlockType, Section};
pub use keyword::KeywordGenerator;
pub use metadata::DocumentMetadata;
pub use source::{ParseSourceError, SourceLocator};
pub use splitter::{DocumentPlan, LegalSplitter, SplitOutput};
