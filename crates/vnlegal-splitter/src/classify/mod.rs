//! Keyword-table classifiers for category and department.
//!
//! Tables are ordered; the first entry with a matching keyword wins.

mod category;
mod department;

pub use category::{
    classify_by_content, classify_by_filename, is_valid_category, CATEGORIES,
};
pub use department::{classify_department, DEPARTMENTS};

use crate::fold::fold_str;

/// One row of an ordered keyword table.
pub(crate) type Rule = (&'static str, &'static [&'static str]);

/// Folded keywords shorter than this are too ambiguous for the accent-free pass.
const MIN_FOLDED_KEYWORD_LEN: usize = 5;

/// First `(label, keyword)` whose keyword occurs in `haystack`.
///
/// `haystack` must already be lowercased. When no accented keyword matches,
/// the folded haystack is tried against folded keywords.
pub(crate) fn match_rules(haystack: &str, rules: &[Rule]) -> Option<(&'static str, &'static str)> {
    for (label, keywords) in rules {
        if let Some(kw) = keywords.iter().find(|kw| haystack.contains(*kw)) {
            return Some((*label, *kw));
        }
    }

    let folded = fold_str(haystack);
    for (label, keywords) in rules {
        for kw in keywords.iter() {
            let folded_kw = fold_str(kw);
            if folded_kw.len() >= MIN_FOLDED_KEYWORD_LEN && folded.contains(&folded_kw) {
                return Some((*label, *kw));
            }
        }
    }
    None
}
