//! Cleanup of extracted text before it is stored and split.

use once_cell::sync::Lazy;
use regex::Regex;

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());
static PAGE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\d{1,4}|-\s*\d{1,4}\s*-|trang\s+\d{1,4}(?:\s*/\s*\d{1,4})?)$").unwrap()
});
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Recurring OCR misreads in Vietnamese scans.
const OCR_FIXES: &[(&str, &str)] = &[
    ("ngàỵ", "ngày"),
    ("Điều 1O", "Điều 10"),
    ("Điều 2O", "Điều 20"),
    ("Khoản 1O", "Khoản 10"),
    ("tháng 1O", "tháng 10"),
    ("năm 2O", "năm 20"),
];

fn is_noise_char(c: char) -> bool {
    c.is_control() && c != '\n' && c != '\t'
}

/// Normalize extracted text.
///
/// Line endings become `\n`, control characters go, space runs collapse,
/// page-number-only lines are dropped, blank runs shrink to one empty line.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut text: String = text.chars().filter(|c| !is_noise_char(*c)).collect();
    for (wrong, right) in OCR_FIXES {
        if text.contains(wrong) {
            text = text.replace(wrong, right);
        }
    }

    let lines: Vec<String> = text
        .split('\n')
        .map(|line| SPACE_RUNS.replace_all(line, " ").trim().to_string())
        .filter(|line| !PAGE_NUMBER.is_match(line))
        .collect();

    BLANK_RUNS
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}
