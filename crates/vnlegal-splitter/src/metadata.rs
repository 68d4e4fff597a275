//! Document-level metadata: number, issue date, department and title.
//!
//! Computed once per document and copied onto every block.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::classify::classify_department;
use crate::patterns::{
    DATE_BARE, DATE_NUMERIC, DATE_WITH_LOCATION, DECISION_HEADING, DOC_ID_FALLBACKS,
    DOC_ID_HEADER, LEGAL_BASIS_START, SIGNATURE,
};

/// Characters of the header region searched for the `Số:` line.
const HEADER_REGION_CHARS: usize = 2000;
/// Lines scanned for the document title.
const TITLE_SCAN_LINES: usize = 15;
/// Title used when nothing better is found.
pub const DEFAULT_TITLE: &str = "Tài liệu pháp lý";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub doc_id: String,
    pub date: String,
    pub department: String,
}

/// Extract doc_id, date and department in one pass over the text.
pub fn extract(text: &str) -> DocumentMetadata {
    DocumentMetadata {
        doc_id: extract_doc_id(text),
        date: extract_date(text),
        department: classify_department(text).to_string(),
    }
}

/// Document number, or an empty string.
pub fn extract_doc_id(text: &str) -> String {
    let header_end = text
        .char_indices()
        .nth(HEADER_REGION_CHARS)
        .map_or(text.len(), |(i, _)| i);

    if let Some(caps) = DOC_ID_HEADER.captures(&text[..header_end]) {
        return caps[1].trim().to_string();
    }

    DOC_ID_FALLBACKS
        .iter()
        .find_map(|re| re.captures(text).map(|c| c[1].trim().to_string()))
        .unwrap_or_default()
}

/// Issue date as `YYYY-MM-DD`, or an empty string when absent or invalid.
pub fn extract_date(text: &str) -> String {
    let parts = DATE_WITH_LOCATION
        .captures(text)
        .map(|c| (c[2].to_string(), c[3].to_string(), c[4].to_string()))
        .or_else(|| {
            DATE_BARE
                .captures(text)
                .or_else(|| DATE_NUMERIC.captures(text))
                .map(|c| (c[1].to_string(), c[2].to_string(), c[3].to_string()))
        });

    let Some((day, month, year)) = parts else {
        return String::new();
    };

    let (Ok(day), Ok(month), Ok(year)) = (day.parse::<u32>(), month.parse::<u32>(), year.parse::<i32>())
    else {
        return String::new();
    };

    NaiveDate::from_ymd_opt(normalize_year(year), month, day)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Two-digit years: below 50 is 20xx, otherwise 19xx.
pub fn normalize_year(year: i32) -> i32 {
    match year {
        y if y >= 100 => y,
        y if y < 50 => y + 2000,
        y => y + 1900,
    }
}

/// School name, number, date line or national motto.
fn is_header_line(line: &str) -> bool {
    let upper = line.to_uppercase();
    ["ĐẠI HỌC", "TRƯỜNG", "BỘ ", "SỐ", "NGÀY", "CỘNG HÒA", "CỘNG HOÀ", "ĐỘC LẬP"]
        .iter()
        .any(|h| upper.starts_with(h))
        || upper.contains(", NGÀY")
}

/// Lines that are never a title even when they are long.
fn is_body_line(line: &str) -> bool {
    LEGAL_BASIS_START.is_match(line)
        || crate::patterns::classify_line(line).is_some()
        || SIGNATURE.is_match(line)
        || crate::patterns::DECISION_COLON.is_match(line)
}

fn strip_markup(line: &str) -> &str {
    line.trim().trim_start_matches('#').trim().trim_matches('*').trim()
}

/// Human title of the document, used as the keyword source.
///
/// Looks at the first lines for a `Về việc` line, the line after a bare
/// `QUYẾT ĐỊNH` heading, then the quoted regulation name inside the decision
/// statement, then the first long mixed-case line.
pub fn extract_document_title(text: &str, decision_content: Option<&str>) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(strip_markup)
        .filter(|l| !l.is_empty())
        .take(TITLE_SCAN_LINES)
        .collect();

    for line in &lines {
        let lower = line.to_lowercase();
        if lower.starts_with("về việc") || lower.starts_with("v/v") {
            return line.to_string();
        }
    }

    for pair in lines.windows(2) {
        if DECISION_HEADING.is_match(pair[0]) && !is_header_line(pair[1]) && !is_body_line(pair[1]) {
            return pair[1].to_string();
        }
    }

    if let Some(title) = decision_content.and_then(title_from_decision) {
        return title;
    }

    let candidates: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|l| !is_header_line(l) && !is_body_line(l) && !DECISION_HEADING.is_match(l))
        .collect();

    candidates
        .iter()
        .find(|l| l.chars().count() > 20 && l.to_uppercase() != **l)
        .or_else(|| candidates.first())
        .map(|l| l.to_string())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// Quoted regulation name in a decision statement, e.g.
/// `Ban hành kèm theo Quyết định này "Quy định về công tác sinh viên"`.
pub fn title_from_decision(content: &str) -> Option<String> {
    for (open, close) in [('“', '”'), ('"', '"')] {
        if let Some(start) = content.find(open) {
            let rest = &content[start + open.len_utf8()..];
            if let Some(end) = rest.find(close) {
                let quoted = rest[..end].trim();
                if quoted.chars().count() > 5 {
                    return Some(quoted.to_string());
                }
            }
        }
    }
    None
}
