//! The decision-issuance statement (`QUYẾT ĐỊNH: ...`).

use serde::{Deserialize, Serialize};

use crate::legal_basis;
use crate::lines::{index_lines, line_of, Line};
use crate::patterns::{
    classify_line, Marker, DECISION_COLON, DECISION_HEADING, FOOTER, LEGAL_BASIS_START, SIGNATURE,
};

/// Location of the decision statement in the normalized text.
///
/// `start` and `end` are byte offsets; `end` is exclusive. The line numbers
/// are inclusive and are used by the hierarchy scanner to skip the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionSpan {
    pub start: usize,
    pub end: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl DecisionSpan {
    fn new(text: &str, start: usize, end: usize) -> Self {
        let start_line = line_of(text, start);
        let end_line = if end >= text.len() && !text.ends_with('\n') {
            line_of(text, text.len())
        } else {
            line_of(text, end).saturating_sub(1)
        };
        Self {
            start,
            end,
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    /// End the span at `offset` when it falls strictly inside it.
    pub fn clip_to(self, text: &str, offset: usize) -> Self {
        if offset > self.start && offset < self.end {
            Self::new(text, self.start, offset)
        } else {
            self
        }
    }

    pub fn contains_line(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

fn find_opener(lines: &[Line<'_>]) -> Option<usize> {
    if let Some(line) = lines.iter().find(|l| DECISION_COLON.is_match(l.text)) {
        return Some(line.start);
    }

    // A bare heading only counts once the legal basis has started.
    let basis_idx = lines
        .iter()
        .position(|l| LEGAL_BASIS_START.is_match(l.text))
        .unwrap_or(0);
    lines[basis_idx..]
        .iter()
        .find(|l| DECISION_HEADING.is_match(l.text))
        .map(|l| l.start)
}

fn find_end(text: &str, lines: &[Line<'_>], start: usize) -> usize {
    let after: Vec<&Line<'_>> = lines.iter().filter(|l| l.start > start).collect();

    after
        .iter()
        .find(|l| FOOTER.is_match(l.text))
        .or_else(|| after.iter().find(|l| SIGNATURE.is_match(l.text)))
        .or_else(|| {
            after.iter().find(|l| {
                matches!(
                    classify_line(l.text),
                    Some(Marker::Article | Marker::Chapter | Marker::Appendix)
                )
            })
        })
        .map_or(text.len(), |l| l.start)
}

/// Locate the decision statement.
pub fn find_span(text: &str) -> Option<DecisionSpan> {
    let lines = index_lines(text);
    let start = find_opener(&lines)?;
    let end = find_end(text, &lines, start);
    Some(DecisionSpan::new(text, start, end))
}

/// Cleaned content of a span.
pub fn content_of(text: &str, span: &DecisionSpan) -> String {
    legal_basis::clean(&text[span.start..span.end])
}

/// Cleaned decision statement, or an empty string.
pub fn extract(text: &str) -> String {
    find_span(text)
        .map(|span| content_of(text, &span))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Căn cứ Luật;\nQUYẾT ĐỊNH:\nĐiều 1. Ban hành kèm theo Quyết định này Quy định.\nĐiều 2. Hiệu lực.\nNơi nhận:\n- Lưu VT.";

    #[test]
    fn test_span_ends_at_footer() {
        let span = find_span(DOC).unwrap();
        assert!(DOC[span.start..].starts_with("QUYẾT ĐỊNH:"));
        assert!(DOC[span.end..].starts_with("Nơi nhận:"));
        assert_eq!(span.start_line, 1);
        assert_eq!(span.end_line, 3);
        assert!(span.contains_line(2));
        assert!(!span.contains_line(4));
    }

    #[test]
    fn test_signature_then_markers() {
        let text = "QUYẾT ĐỊNH:\nĐiều 1. Ban hành.\nHIỆU TRƯỞNG\nNguyễn Văn A";
        let span = find_span(text).unwrap();
        assert!(text[span.end..].starts_with("HIỆU TRƯỞNG"));

        let text = "QUYẾT ĐỊNH:\nBan hành quy định.\nĐiều 1. Phạm vi";
        let span = find_span(text).unwrap();
        assert!(text[span.end..].starts_with("Điều 1"));
        assert_eq!(span.end_line, 1);
    }

    #[test]
    fn test_eof_includes_last_line() {
        let text = "QUYẾT ĐỊNH:\nBan hành quy định.";
        let span = find_span(text).unwrap();
        assert_eq!(span.end, text.len());
        assert_eq!(span.end_line, 1);
    }

    #[test]
    fn test_bare_heading_after_basis() {
        let text = "QUYẾT ĐỊNH\nVề việc ban hành quy chế\nCăn cứ Luật;\n**QUYẾT ĐỊNH**\nBan hành quy chế.\nNơi nhận:";
        let span = find_span(text).unwrap();
        assert_eq!(span.start_line, 3);
        assert_eq!(content_of(text, &span), "QUYẾT ĐỊNH\nBan hành quy chế.");
    }

    #[test]
    fn test_clip_to() {
        let span = find_span(DOC).unwrap();
        let article2 = DOC.find("Điều 2").unwrap();
        let clipped = span.clip_to(DOC, article2);
        assert_eq!(clipped.end, article2);
        assert_eq!(clipped.end_line, 2);
        // outside the span: unchanged
        assert_eq!(span.clip_to(DOC, 0), span);
    }

    #[test]
    fn test_absent() {
        assert_eq!(find_span("Điều 1. Phạm vi"), None);
        assert_eq!(extract("Điều 1. Phạm vi"), "");
    }

    #[test]
    fn test_extract_cleans_markup() {
        let text = "## **QUYẾT ĐỊNH:**\n**Điều 1.** Ban hành.\nNơi nhận:";
        assert_eq!(extract(text), "QUYẾT ĐỊNH:\nĐiều 1. Ban hành.");
    }
}
