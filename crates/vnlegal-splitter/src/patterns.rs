//! Boundary grammar of Vietnamese legal documents.
//!
//! Every regex lives in a lazily compiled static. Line-anchored structural
//! markers are exposed through [`Marker`] and [`classify_line`] so the
//! hierarchy scanner never re-matches raw regexes itself.

use once_cell::sync::Lazy;
use regex::Regex;

// ---- Metadata ----

/// `Số: 429/QĐ-ĐHCNTT&TT` alone on a header line.
pub static DOC_ID_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[ \t]*\*{0,2}Số\s*:\s*\*{0,2}\s*([A-Z0-9ĐƠƯ/.\-–&]+)\s*\*{0,2}[ \t]*$")
        .expect("valid doc id header regex")
});

/// Fallback document-number shapes, most specific first.
pub static DOC_ID_FALLBACKS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\d+/QĐ-[A-ZĐƠƯ&]+)",
        r"(?i)(\d+/\d+/TT-[A-ZĐƠƯ&]+)",
        r"(?i)(\d+/\d+/NĐ-CP)",
        r"(?i)(\d+/NQ-[A-ZĐƠƯ&]+)",
        r"(?i)(QD-DHCNTT&?TT)",
        r"(?i)(\d+[/\-]\d+[/\-]?\d*[/\-]?[A-ZĐƠƯ\-&]*)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid doc id fallback regex"))
    .collect()
});

/// `Thái Nguyên, ngày 22 tháng 6 năm 2022`.
pub static DATE_WITH_LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([^,\n]+),\s*ngày\s+(\d{1,2})\s+tháng\s+(\d{1,2})\s+năm\s+(\d{4}|\d{2})\b")
        .expect("valid dated location regex")
});

/// `ngày 22 tháng 6 năm 2022` without a location.
pub static DATE_BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)ngày\s+(\d{1,2})\s+tháng\s+(\d{1,2})\s+năm\s+(\d{4}|\d{2})\b")
        .expect("valid bare date regex")
});

/// `ngày 22/6/2022`.
pub static DATE_NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)ngày\s+(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4})\b").expect("valid numeric date regex")
});

// ---- Preamble and decision ----

/// A line opening the legal basis (`Căn cứ ...` / `Theo ...`).
pub static LEGAL_BASIS_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*[*#]*\s*(Căn\s*cứ|Theo)\b").expect("valid legal basis regex")
});

/// `QUYẾT ĐỊNH:` with a colon, any case, tolerating leading markdown.
pub static DECISION_COLON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[ \t]*#*\s*\*{0,2}\s*QUYẾT\s*ĐỊNH\s*\*{0,2}\s*:").expect("valid decision regex")
});

/// A bare uppercase `QUYẾT ĐỊNH` heading line.
pub static DECISION_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*#*\s*\*{0,2}\s*QUYẾT\s*ĐỊNH\s*\*{0,2}\s*:?\s*\*{0,2}\s*$")
        .expect("valid decision heading regex")
});

/// Signature block that closes the operative text.
pub static SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*\*{0,2}\s*(KT\.\s*HIỆU TRƯỞNG|HIỆU TRƯỞNG|TM\.|GIÁM ĐỐC|CHỦ TỊCH)")
        .expect("valid signature regex")
});

/// `Ký`, `(Ký, ghi rõ họ tên)` or `(đã ký)`.
pub static SIGNED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*\(?\s*(?:đã\s+)?ký\b").expect("valid signed regex")
});

// ---- Structure ----

/// `Điều 5. Title`, optionally bold or behind a markdown heading.
pub static ARTICLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*#*\s*\*{0,2}\s*Điều\s+(\d+)\s*[.:]?\s*\*{0,2}\s*(.*)$")
        .expect("valid article regex")
});

/// `1. text`, the numbered khoản. Four-digit numbers are years, not clauses.
pub static CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\*{0,2}(\d{1,3})\.\*{0,2}\s+(.*)$").expect("valid clause regex")
});

/// `a) text` or `Điểm a. text`.
pub static POINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\*{0,2}(?:([a-zđ])\)|(?i:Điểm)\s+([a-zđ])\b[.:)]?)\s*(.*)$")
        .expect("valid point regex")
});

/// `Chương I` / `Chương 2. Title`.
pub static CHAPTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#*\s*\*{0,2}\s*(?i:Chương)\s+([IVXLC]+|\d+)\b\s*[.:\-–—]?\s*\*{0,2}\s*(.*)$")
        .expect("valid chapter regex")
});

/// `Phụ lục 1` / `PHỤ LỤC II`.
pub static APPENDIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#*\s*\*{0,2}\s*(?i:Phụ\s*lục)\s+([IVXLC]+|\d+)\b\s*[.:\-–—]?\s*\*{0,2}\s*(.*)$")
        .expect("valid appendix regex")
});

/// `Nơi nhận:` that opens the distribution list.
pub static FOOTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[ \t]*[\*\-\u{2022}]?\s*\*{0,2}\s*N[ơo]i\s+nh[aăâậạ]n\s*\*{0,2}\s*:?")
        .expect("valid footer regex")
});

/// Markdown heading line.
pub static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#{1,6}\s").expect("valid heading regex"));

/// `***`, `---` or `___` horizontal rule.
pub static SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\*{3,}|-{3,}|_{3,})\s*$").expect("valid separator regex")
});

/// `## QUY ĐỊNH` heading, matched against folded text.
pub static REGULATION_HEADING_FOLDED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#{1,6}\s*\**\s*quy dinh\b").expect("valid regulation heading regex")
});

/// Structural line markers. Each one also ends the body of an open article or appendix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Footer,
    Article,
    Chapter,
    Appendix,
}

/// Priority order in which line markers are tested.
pub static LINE_MARKERS: &[(Marker, &Lazy<Regex>)] = &[
    (Marker::Footer, &FOOTER),
    (Marker::Article, &ARTICLE),
    (Marker::Chapter, &CHAPTER),
    (Marker::Appendix, &APPENDIX),
];

/// Classify a single line against the structural markers.
pub fn classify_line(line: &str) -> Option<Marker> {
    LINE_MARKERS
        .iter()
        .find(|(_, re)| re.is_match(line))
        .map(|(marker, _)| *marker)
}

/// Whether the line is a markdown heading or a horizontal rule.
pub fn is_decoration(line: &str) -> bool {
    HEADING.is_match(line) || SEPARATOR.is_match(line)
}

/// Parsed `Điều` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub number: String,
    pub title: String,
}

fn heading_from(re: &Regex, line: &str) -> Option<Heading> {
    let caps = re.captures(line)?;
    Some(Heading {
        number: caps.get(1)?.as_str().to_string(),
        title: clean_title(caps.get(2).map_or("", |m| m.as_str())),
    })
}

pub fn parse_article(line: &str) -> Option<Heading> {
    heading_from(&ARTICLE, line)
}

pub fn parse_chapter(line: &str) -> Option<Heading> {
    heading_from(&CHAPTER, line)
}

pub fn parse_appendix(line: &str) -> Option<Heading> {
    heading_from(&APPENDIX, line)
}

/// Khoản number of a clause line.
pub fn parse_clause(line: &str) -> Option<String> {
    CLAUSE.captures(line).map(|c| c[1].to_string())
}

/// Letter of a point line (`a)` or `Điểm a`).
pub fn parse_point(line: &str) -> Option<String> {
    let caps = POINT.captures(line)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_lowercase())
}

/// Strip emphasis and trailing punctuation from a heading title.
fn clean_title(raw: &str) -> String {
    raw.replace("**", "")
        .trim()
        .trim_end_matches(['.', ':', ';'])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_variants() {
        let h = parse_article("Điều 1. Phạm vi điều chỉnh").unwrap();
        assert_eq!(h.number, "1");
        assert_eq!(h.title, "Phạm vi điều chỉnh");

        let h = parse_article("**Điều 12.** Tổ chức thực hiện").unwrap();
        assert_eq!(h.number, "12");
        assert_eq!(h.title, "Tổ chức thực hiện");

        let h = parse_article("### ĐIỀU 3: Hiệu lực").unwrap();
        assert_eq!(h.number, "3");
        assert_eq!(h.title, "Hiệu lực");

        assert!(parse_article("Theo Điều 5 của Luật").is_none());
    }

    #[test]
    fn test_chapter_is_not_program() {
        assert!(parse_chapter("Chương trình đào tạo").is_none());
        assert!(parse_chapter("Chương lớp học").is_none());
        let h = parse_chapter("Chương II. TỔ CHỨC ĐÀO TẠO").unwrap();
        assert_eq!(h.number, "II");
        assert_eq!(h.title, "TỔ CHỨC ĐÀO TẠO");
        let h = parse_chapter("## Chương I").unwrap();
        assert_eq!(h.title, "");
    }

    #[test]
    fn test_appendix() {
        let h = parse_appendix("PHỤ LỤC 2 - Mẫu đơn").unwrap();
        assert_eq!(h.number, "2");
        assert_eq!(h.title, "Mẫu đơn");
        assert!(parse_appendix("Phụ lục kèm theo").is_none());
    }

    #[test]
    fn test_clause_and_point() {
        assert_eq!(parse_clause("1. Văn bản này quy định"), Some("1".to_string()));
        assert_eq!(parse_clause("**2.** Sinh viên"), Some("2".to_string()));
        assert_eq!(parse_clause("120. Sinh viên"), Some("120".to_string()));
        assert_eq!(parse_clause("2022. năm học mới"), None);
        assert_eq!(parse_clause("1.5 tín chỉ"), None);
        assert_eq!(parse_point("a) Điểm rèn luyện"), Some("a".to_string()));
        assert_eq!(parse_point("Điểm đ. Hồ sơ"), Some("đ".to_string()));
        assert_eq!(parse_point("ab) nope"), None);
    }

    #[test]
    fn test_footer_and_signature() {
        assert_eq!(classify_line("Nơi nhận:"), Some(Marker::Footer));
        assert_eq!(classify_line("**Nơi nhận:**"), Some(Marker::Footer));
        assert_eq!(classify_line("- Noi nhan"), Some(Marker::Footer));
        assert_eq!(classify_line("Nơi nhận"), Some(Marker::Footer));
        assert_eq!(classify_line("NƠI NHẬN:"), Some(Marker::Footer));
        assert_eq!(classify_line("* **Nơi nhận:**"), Some(Marker::Footer));
        assert!(SIGNATURE.is_match("KT. HIỆU TRƯỞNG"));
        assert!(!SIGNATURE.is_match("Hiệu trưởng quyết định việc"));
        assert!(SIGNED.is_match("(Ký, ghi rõ họ tên)"));
        assert!(!SIGNED.is_match("Kỳ thi kết thúc học phần"));
    }

    #[test]
    fn test_decision_openers() {
        assert!(DECISION_COLON.is_match("QUYẾT ĐỊNH:"));
        assert!(DECISION_COLON.is_match("**Quyết định:** Điều 1"));
        assert!(DECISION_COLON.is_match("## QUYẾT ĐỊNH :"));
        assert!(!DECISION_COLON.is_match("Căn cứ Quyết định số 12"));
        assert!(DECISION_HEADING.is_match("**QUYẾT ĐỊNH**"));
        assert!(!DECISION_HEADING.is_match("QUYẾT ĐỊNH số 12 năm 2020"));
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify_line("Điều 4. Học phí"), Some(Marker::Article));
        assert_eq!(classify_line("Chương III"), Some(Marker::Chapter));
        assert_eq!(classify_line("Phụ lục 1"), Some(Marker::Appendix));
        assert_eq!(classify_line("1. Sinh viên"), None);
    }

    #[test]
    fn test_decoration() {
        assert!(is_decoration("## QUY ĐỊNH"));
        assert!(is_decoration("***"));
        assert!(is_decoration(" --- "));
        assert!(!is_decoration("#hashtag"));
    }
}
