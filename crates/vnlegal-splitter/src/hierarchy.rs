//! Hierarchical split of the operative text into articles, clauses and appendices.
//!
//! The scanner walks lines from the detected start point up to the first
//! `Nơi nhận` after it. Lines inside the decision span are skipped so the
//! decision statement never reappears as an article.

use serde::{Deserialize, Serialize};

use crate::decision::DecisionSpan;
use crate::fold::{fold_str, FoldedText};
use crate::lines::{index_lines, line_of, Line};
use crate::patterns::{
    self, classify_line, Marker, HEADING, REGULATION_HEADING_FOLDED, SEPARATOR, SIGNED,
};
use crate::source::SourceLocator;

/// Lines around a "phạm vi điều chỉnh" hit searched for `Điều 1`.
const SCOPE_WINDOW: usize = 3;

/// Kind of a produced section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    CanCu,
    QuyetDinh,
    Chuong,
    Dieu,
    Khoan,
    Diem,
    Appendix,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CanCu => "can_cu",
            Self::QuyetDinh => "quyet_dinh",
            Self::Chuong => "chuong",
            Self::Dieu => "dieu",
            Self::Khoan => "khoan",
            Self::Diem => "diem",
            Self::Appendix => "appendix",
        }
    }
}

/// One unit produced by the splitter before metadata is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub block_type: BlockType,
    pub locator: SourceLocator,
    pub content: String,
}

impl Section {
    pub fn new(block_type: BlockType, locator: SourceLocator, content: String) -> Self {
        Self {
            block_type,
            locator,
            content,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HierarchyOptions {
    pub emit_chapters: bool,
    pub split_points: bool,
}

// ---- Article title predicates ----

/// "Phạm vi điều chỉnh và đối tượng áp dụng".
pub fn is_scope_and_subject(title: &str) -> bool {
    let t = fold_str(title);
    t.contains("pham vi dieu chinh") && t.contains("doi tuong ap dung")
}

/// "Phạm vi điều chỉnh".
pub fn is_scope_only(title: &str) -> bool {
    let t = fold_str(title);
    t.contains("pham vi dieu chinh") && !t.contains("doi tuong ap dung")
}

/// "Đối tượng áp dụng".
pub fn is_subject_only(title: &str) -> bool {
    let t = fold_str(title);
    t.contains("doi tuong ap dung") && !t.contains("pham vi dieu chinh")
}

/// Whether an article is emitted per khoản instead of as a whole.
///
/// Scope and subject articles stay whole. Other articles split when the
/// title joins several topics with "và".
pub fn should_split_by_khoan(title: &str) -> bool {
    if is_scope_and_subject(title) || is_scope_only(title) || is_subject_only(title) {
        return false;
    }
    title
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .any(|w| w == "và")
}

// ---- Start point ----

fn is_article_one(line: &str) -> bool {
    patterns::parse_article(line).is_some_and(|h| h.number == "1")
}

/// Move back onto a `Chương` heading sitting just above `start`.
fn back_to_chapter(lines: &[Line<'_>], start: usize) -> usize {
    lines[..start]
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, l)| !l.text.trim().is_empty())
        .take(2)
        .find(|(_, l)| classify_line(l.text) == Some(Marker::Chapter))
        .map_or(start, |(i, _)| i)
}

fn scope_start(text: &str, folded: &FoldedText, lines: &[Line<'_>]) -> Option<usize> {
    let mut from = 0;
    while let Some(hit) = folded.find_from("pham vi dieu chinh", from) {
        from = hit + 1;
        let idx = line_of(text, hit);
        let lo = idx.saturating_sub(SCOPE_WINDOW);
        let hi = (idx + SCOPE_WINDOW).min(lines.len() - 1);
        let Some(article_one) = (lo..=hi).find(|&i| is_article_one(lines[i].text)) else {
            continue;
        };
        let start = if classify_line(lines[idx].text) == Some(Marker::Article) {
            idx
        } else {
            article_one
        };
        return Some(start);
    }
    None
}

/// Decision first, regulation attached after the signature.
fn attached_regulation_start(lines: &[Line<'_>]) -> Option<usize> {
    let footer = lines
        .iter()
        .position(|l| classify_line(l.text) == Some(Marker::Footer))?;
    let signed = footer + lines[footer..].iter().position(|l| SIGNED.is_match(l.text))?;
    let rule = signed + lines[signed..].iter().position(|l| SEPARATOR.is_match(l.text))?;
    let heading = rule
        + lines[rule..]
            .iter()
            .position(|l| REGULATION_HEADING_FOLDED.is_match(&fold_str(l.text)))?;
    Some(heading + 1)
}

fn regulation_heading_start(lines: &[Line<'_>]) -> Option<usize> {
    lines
        .iter()
        .position(|l| REGULATION_HEADING_FOLDED.is_match(&fold_str(l.text)))
        .map(|i| i + 1)
}

/// Line index where article scanning begins.
pub fn find_start_point(text: &str) -> usize {
    let lines = index_lines(text);
    if lines.is_empty() {
        return 0;
    }
    let folded = FoldedText::new(text);

    let start = scope_start(text, &folded, &lines)
        .or_else(|| attached_regulation_start(&lines))
        .or_else(|| folded.find("nhung quy dinh chung").map(|pos| line_of(text, pos)))
        .or_else(|| regulation_heading_start(&lines))
        .unwrap_or(0)
        .min(lines.len());

    back_to_chapter(&lines, start)
}

/// Byte offset of a start line.
pub fn start_offset(text: &str, start_line: usize) -> usize {
    index_lines(text)
        .get(start_line)
        .map_or(text.len(), |l| l.start)
}

// ---- Scanner ----

/// Remove emphasis and heading markers, then trim.
pub(crate) fn clean_content(raw: &str) -> String {
    raw.replace("**", "")
        .lines()
        .map(|l| {
            if HEADING.is_match(l) {
                l.trim_start().trim_start_matches('#').trim_start()
            } else {
                l
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

struct Scanner<'a, 'b> {
    lines: &'b [Line<'a>],
    end: usize,
    decision: Option<&'b DecisionSpan>,
    opts: HierarchyOptions,
    out: Vec<Section>,
}

impl<'a, 'b> Scanner<'a, 'b> {
    fn in_decision(&self, idx: usize) -> bool {
        self.decision.is_some_and(|d| d.contains_line(idx))
    }

    fn is_boundary(&self, idx: usize) -> bool {
        self.in_decision(idx) || classify_line(self.lines[idx].text).is_some()
    }

    fn run(mut self, start: usize) -> Vec<Section> {
        let mut i = start;
        while i < self.end {
            if self.in_decision(i) {
                i += 1;
                continue;
            }
            i = match classify_line(self.lines[i].text) {
                Some(Marker::Article) => self.article(i),
                Some(Marker::Appendix) => self.appendix(i),
                Some(Marker::Chapter) => self.chapter(i),
                _ => i + 1,
            };
        }
        self.out
    }

    /// Body lines after `header` up to the next boundary; returns them and the boundary index.
    fn body(&self, header: usize, keep_headings: bool) -> (Vec<&'a str>, usize) {
        let mut body = Vec::new();
        let mut j = header + 1;
        while j < self.end && !self.is_boundary(j) {
            let line = self.lines[j].text;
            j += 1;
            if SEPARATOR.is_match(line) {
                continue;
            }
            if HEADING.is_match(line) && !keep_headings {
                let stripped = line.trim_start().trim_start_matches('#').trim_start();
                if patterns::parse_clause(stripped).is_some() {
                    body.push(stripped);
                }
                continue;
            }
            body.push(line);
        }
        (body, j)
    }

    fn push(&mut self, block_type: BlockType, locator: SourceLocator, raw: &str) {
        let content = clean_content(raw);
        if !content.is_empty() {
            self.out.push(Section::new(block_type, locator, content));
        }
    }

    fn article(&mut self, i: usize) -> usize {
        let header_line = self.lines[i].text;
        let Some(heading) = patterns::parse_article(header_line) else {
            return i + 1;
        };
        let (body, next) = self.body(i, false);

        let clause_starts: Vec<usize> = body
            .iter()
            .enumerate()
            .filter(|(_, l)| patterns::parse_clause(l).is_some())
            .map(|(idx, _)| idx)
            .collect();

        if !should_split_by_khoan(&heading.title) || clause_starts.is_empty() {
            let mut raw = vec![header_line];
            raw.extend(body.iter().copied());
            self.push(
                BlockType::Dieu,
                SourceLocator::Article {
                    article: heading.number,
                },
                &raw.join("\n"),
            );
            return next;
        }

        for (n, &from) in clause_starts.iter().enumerate() {
            let to = clause_starts.get(n + 1).copied().unwrap_or(body.len());
            let clause = patterns::parse_clause(body[from]).unwrap_or_default();
            self.clause(&heading.number, &clause, &body[from..to]);
        }
        next
    }

    fn clause(&mut self, article: &str, clause: &str, lines: &[&str]) {
        let point_starts: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| patterns::parse_point(l).is_some())
            .map(|(idx, _)| idx)
            .collect();

        if !self.opts.split_points || point_starts.len() < 2 {
            self.push(
                BlockType::Khoan,
                SourceLocator::Clause {
                    article: article.to_string(),
                    clause: clause.to_string(),
                },
                &lines.join("\n"),
            );
            return;
        }

        for (n, &from) in point_starts.iter().enumerate() {
            // the lead-in stays with the first point
            let from = if n == 0 { 0 } else { from };
            let to = point_starts.get(n + 1).copied().unwrap_or(lines.len());
            let point = patterns::parse_point(lines[point_starts[n]]).unwrap_or_default();
            self.push(
                BlockType::Diem,
                SourceLocator::Point {
                    article: article.to_string(),
                    clause: clause.to_string(),
                    point,
                },
                &lines[from..to].join("\n"),
            );
        }
    }

    fn appendix(&mut self, i: usize) -> usize {
        let header_line = self.lines[i].text;
        let Some(heading) = patterns::parse_appendix(header_line) else {
            return i + 1;
        };
        let (body, next) = self.body(i, true);
        let mut raw = vec![header_line];
        raw.extend(body);
        self.push(
            BlockType::Appendix,
            SourceLocator::Appendix {
                number: heading.number,
            },
            &raw.join("\n"),
        );
        next
    }

    fn chapter(&mut self, i: usize) -> usize {
        if !self.opts.emit_chapters {
            return i + 1;
        }
        let header_line = self.lines[i].text;
        let Some(heading) = patterns::parse_chapter(header_line) else {
            return i + 1;
        };

        let mut raw = vec![header_line];
        let mut title = heading.title;
        let mut next = i + 1;
        if title.is_empty() {
            let candidate = (i + 1..self.end)
                .find(|&j| !self.lines[j].text.trim().is_empty())
                .filter(|&j| !self.is_boundary(j));
            if let Some(j) = candidate {
                let line = self.lines[j].text;
                title = clean_content(line);
                raw.push(line);
                next = j + 1;
            }
        }

        self.push(
            BlockType::Chuong,
            SourceLocator::Chapter {
                number: heading.number,
                title,
            },
            &raw.join("\n"),
        );
        next
    }
}

/// Split the operative text into ordered sections.
///
/// Scanning starts at [`find_start_point`] and stops at the first `Nơi nhận`
/// at or after it. Lines inside `decision` are skipped.
pub fn split(text: &str, decision: Option<&DecisionSpan>, opts: HierarchyOptions) -> Vec<Section> {
    let lines = index_lines(text);
    let start = find_start_point(text);
    let end = lines
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, l)| classify_line(l.text) == Some(Marker::Footer))
        .map_or(lines.len(), |(i, _)| i);

    let scanner = Scanner {
        lines: &lines,
        end,
        decision,
        opts,
        out: Vec::new(),
    };
    scanner.run(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(sections: &[Section]) -> Vec<String> {
        sections.iter().map(|s| s.locator.to_string()).collect()
    }

    #[test]
    fn test_title_predicates() {
        assert!(is_scope_and_subject("Phạm vi điều chỉnh và đối tượng áp dụng"));
        assert!(is_scope_only("PHẠM VI ĐIỀU CHỈNH"));
        assert!(is_subject_only("Đối tượng áp dụng"));
        assert!(!should_split_by_khoan("Phạm vi điều chỉnh và đối tượng áp dụng"));
        assert!(should_split_by_khoan("Quyền và nghĩa vụ của sinh viên"));
        assert!(!should_split_by_khoan("Học phí"));
        // "vào" is not the conjunction
        assert!(!should_split_by_khoan("Điều kiện vào học"));
    }

    #[test]
    fn test_start_point_scope_line() {
        let text = "QUYẾT ĐỊNH:\nĐiều 1. Ban hành quy định.\nĐiều 2. Phạm vi điều chỉnh\n1. A";
        assert_eq!(find_start_point(text), 2);

        let text = "Chương I\nQUY ĐỊNH CHUNG\nĐiều 1. Phạm vi điều chỉnh\n1. A";
        assert_eq!(find_start_point(text), 0);
    }

    #[test]
    fn test_start_point_attached_regulation() {
        let text = "QUYẾT ĐỊNH:\nĐiều 1. Ban hành.\nNơi nhận:\n- Lưu VT.\n(Ký)\n***\n## QUY ĐỊNH\nĐiều 1. Giải thích từ ngữ";
        assert_eq!(find_start_point(text), 7);
    }

    #[test]
    fn test_start_point_general_provisions_and_default() {
        let text = "Căn cứ Luật;\nNHỮNG QUY ĐỊNH CHUNG\nĐiều 1. X";
        assert_eq!(find_start_point(text), 1);
        assert_eq!(find_start_point("Điều 1. X"), 0);
        assert_eq!(find_start_point(""), 0);
    }

    #[test]
    fn test_split_by_clause_when_title_has_va() {
        let text = "Điều 5. Quyền và nghĩa vụ\nMở đầu.\n1. Được học tập.\n2. Phải đóng học phí.\nĐiều 6. Hiệu lực\nCó hiệu lực.";
        let sections = split(text, None, HierarchyOptions::default());
        assert_eq!(
            sources(&sections),
            vec!["Điều 5, Khoản 1", "Điều 5, Khoản 2", "Điều 6"]
        );
        assert_eq!(sections[0].content, "1. Được học tập.");
        assert_eq!(sections[2].content, "Điều 6. Hiệu lực\nCó hiệu lực.");
        assert_eq!(sections[2].block_type, BlockType::Dieu);
    }

    #[test]
    fn test_scope_article_is_whole() {
        let text = "Điều 1. Phạm vi điều chỉnh và đối tượng áp dụng\n1. Quy định này.\n2. Áp dụng cho.";
        let sections = split(text, None, HierarchyOptions::default());
        assert_eq!(sources(&sections), vec!["Điều 1"]);
        assert!(sections[0].content.ends_with("2. Áp dụng cho."));
    }

    #[test]
    fn test_footer_and_decision_are_respected() {
        let text = "QUYẾT ĐỊNH:\nĐiều 1. Ban hành.\nĐiều 2. Thi hành.\nNơi nhận:\nĐiều 9. Không phải điều";
        let span = crate::decision::find_span(text).unwrap();
        let sections = split(text, Some(&span), HierarchyOptions::default());
        assert!(sections.is_empty());
    }

    #[test]
    fn test_chapters_optional() {
        let text = "Chương I\nNHỮNG QUY ĐỊNH CHUNG\nĐiều 1. Giải thích\nNội dung.\nChương II. TỔ CHỨC\nĐiều 2. Tổ chức\nNội dung.";
        let off = split(text, None, HierarchyOptions::default());
        assert_eq!(sources(&off), vec!["Điều 1", "Điều 2"]);

        let on = split(
            text,
            None,
            HierarchyOptions {
                emit_chapters: true,
                ..Default::default()
            },
        );
        assert_eq!(
            sources(&on),
            vec![
                "Chương I — NHỮNG QUY ĐỊNH CHUNG",
                "Điều 1",
                "Chương II — TỔ CHỨC",
                "Điều 2"
            ]
        );
        assert_eq!(on[0].block_type, BlockType::Chuong);
    }

    #[test]
    fn test_points_optional() {
        let text = "Điều 4. Hồ sơ và thủ tục\n1. Hồ sơ gồm:\na) Đơn;\nb) Bản sao;\n2. Nộp tại phòng.";
        let plain = split(text, None, HierarchyOptions::default());
        assert_eq!(sources(&plain), vec!["Điều 4, Khoản 1", "Điều 4, Khoản 2"]);

        let points = split(
            text,
            None,
            HierarchyOptions {
                split_points: true,
                ..Default::default()
            },
        );
        assert_eq!(
            sources(&points),
            vec!["Điều 4, Khoản 1, Điểm a", "Điều 4, Khoản 1, Điểm b", "Điều 4, Khoản 2"]
        );
        assert_eq!(points[0].content, "1. Hồ sơ gồm:\na) Đơn;");
        assert_eq!(points[1].content, "b) Bản sao;");
    }

    #[test]
    fn test_appendix_and_decorations() {
        let text = "Điều 1. Học phí\n### Ghi chú\n***\nMức thu.\nPhụ lục 1. Biểu mẫu\n## Mẫu đơn\nHọ tên:";
        let sections = split(text, None, HierarchyOptions::default());
        assert_eq!(sources(&sections), vec!["Điều 1", "Phụ lục 1"]);
        assert_eq!(sections[0].content, "Điều 1. Học phí\nMức thu.");
        assert_eq!(sections[1].content, "Phụ lục 1. Biểu mẫu\nMẫu đơn\nHọ tên:");
        assert_eq!(sections[1].block_type, BlockType::Appendix);
    }

    #[test]
    fn test_heading_clause_kept() {
        let text = "Điều 3. Quyền và nghĩa vụ\n#### 1. Quyền\n#### 2. Nghĩa vụ";
        let sections = split(text, None, HierarchyOptions::default());
        assert_eq!(sources(&sections), vec!["Điều 3, Khoản 1", "Điều 3, Khoản 2"]);
        assert_eq!(sections[1].content, "2. Nghĩa vụ");
    }

    #[test]
    fn test_block_type_names() {
        assert_eq!(BlockType::CanCu.as_str(), "can_cu");
        assert_eq!(BlockType::Khoan.as_str(), "khoan");
    }
}
