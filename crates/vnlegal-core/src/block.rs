//! The legal block: one metadata-tagged unit of a split document.

use serde::{Deserialize, Serialize};

/// Department used when no department keyword is found.
pub const DEFAULT_DEPARTMENT: &str = "Training Department";
/// Category used when no category keyword is found.
pub const DEFAULT_CATEGORY: &str = "training_and_regulations";
/// Format marker carried by every block.
pub const TYPE_DATA_MARKDOWN: &str = "markdown";

/// The closed category taxonomy.
pub const CATEGORIES: [&str; 10] = [
    "training_and_regulations",
    "academic_affairs",
    "admissions",
    "finance_and_tuition",
    "examination",
    "postgraduate_training",
    "internship",
    "student_affairs",
    "human_resources",
    "distance_learning",
];

/// Whether `category` belongs to the taxonomy.
pub fn is_valid_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

/// A single legal unit (legal basis, decision statement, article, clause, ...)
/// with the document-level metadata it inherits.
///
/// `content` is the original wording of the unit with only markdown emphasis
/// and surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalBlock {
    pub doc_id: String,
    pub department: String,
    pub type_data: String,
    pub category: String,
    pub date: String,
    pub source: String,
    pub content: String,
}

impl LegalBlock {
    /// Whether this block is the grouped legal-basis preamble.
    pub fn is_legal_basis(&self) -> bool {
        self.source == "Căn cứ"
    }

    /// Whether this block is the decision-issuance statement.
    pub fn is_decision(&self) -> bool {
        self.source == "Quyết định"
    }

    /// Whether this block starts a new top-level article (`Điều ...`).
    pub fn starts_article(&self) -> bool {
        self.source.starts_with("Điều")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(source: &str) -> LegalBlock {
        LegalBlock {
            doc_id: "12/QĐ-ĐHTN".into(),
            department: DEFAULT_DEPARTMENT.into(),
            type_data: TYPE_DATA_MARKDOWN.into(),
            category: DEFAULT_CATEGORY.into(),
            date: String::new(),
            source: source.into(),
            content: "x".into(),
        }
    }

    #[test]
    fn test_source_predicates() {
        assert!(block("Căn cứ").is_legal_basis());
        assert!(block("Quyết định").is_decision());
        assert!(block("Điều 4, Khoản 2").starts_article());
        assert!(!block("Phụ lục 1").starts_article());
    }

    #[test]
    fn test_default_category_in_taxonomy() {
        assert!(is_valid_category(DEFAULT_CATEGORY));
        assert!(!is_valid_category("Training Department"));
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(block("Điều 1")).unwrap();
        assert_eq!(json["type_data"], "markdown");
        assert_eq!(json["source"], "Điều 1");
    }
}
