//! The `Căn cứ` preamble, grouped into a single block.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::patterns::{classify_line, Marker, DECISION_COLON, LEGAL_BASIS_START};

static LEADING_HASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s*").expect("valid heading regex"));

/// Collect the legal-basis lines of `text`.
///
/// `text` should already be cut at the first `Nơi nhận`. Returns an empty
/// string when no `Căn cứ` / `Theo` line precedes the decision or the first
/// article.
pub fn extract(text: &str) -> String {
    let mut collected: Vec<&str> = Vec::new();
    let mut inside = false;

    for line in text.lines() {
        let ends_preamble =
            DECISION_COLON.is_match(line) || classify_line(line) == Some(Marker::Article);
        if ends_preamble {
            break;
        }
        if inside {
            collected.push(line.trim_end());
        } else if LEGAL_BASIS_START.is_match(line) {
            inside = true;
            collected.push(line.trim_end());
        }
    }

    clean(&collected.join("\n"))
}

/// Drop emphasis and heading markers.
pub(crate) fn clean(raw: &str) -> String {
    let no_stars = raw.replace('*', "");
    LEADING_HASHES.replace_all(&no_stars, "").trim().to_string()
}
