//! End-to-end behaviour of `LegalSplitter` on realistic documents.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vnlegal_core::{
    CategoryVerdict, ClassificationMethod, Error, LegalBlock, LlmCapability, Result,
    SplitterSettings, DEFAULT_CATEGORY,
};
use vnlegal_splitter::{LegalSplitter, SourceLocator};

const DECISION_429: &str = "Số: 429/QĐ-ĐHCNTT&TT
Thái Nguyên, ngày 22 tháng 6 năm 2022
Căn cứ Quyết định số 468/QĐ-TTg ...;
Theo đề nghị của Trưởng phòng Đào tạo,
QUYẾT ĐỊNH:
Điều 1. Ban hành kèm theo Quyết định này \"Quy định ...\".
Điều 2. Phạm vi điều chỉnh và đối tượng áp dụng
1. Văn bản này quy định ...
2. Quy định này áp dụng ...
Nơi nhận:
- Như trên;
";

/// Fake LLM that answers with fixed values and counts calls.
struct FixedLlm {
    keyword: String,
    category: String,
    keyword_calls: AtomicUsize,
    category_calls: AtomicUsize,
}

impl FixedLlm {
    fn new(keyword: &str, category: &str) -> Arc<Self> {
        Arc::new(Self {
            keyword: keyword.to_string(),
            category: category.to_string(),
            keyword_calls: AtomicUsize::new(0),
            category_calls: AtomicUsize::new(0),
        })
    }
}

impl LlmCapability for FixedLlm {
    fn is_available(&self) -> bool {
        true
    }

    fn generate_keyword_from_title(&self, _title: &str) -> Result<String> {
        self.keyword_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.keyword.clone())
    }

    fn classify_category(&self, _content: &str, _filename: &str) -> Result<CategoryVerdict> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CategoryVerdict {
            category: self.category.clone(),
            confidence: 0.9,
            method: ClassificationMethod::Llm,
            reasoning: String::new(),
            keywords_found: Vec::new(),
        })
    }

    fn name(&self) -> String {
        "fixed".to_string()
    }
}

/// Fake LLM whose every call fails.
struct BrokenLlm;

impl LlmCapability for BrokenLlm {
    fn is_available(&self) -> bool {
        true
    }

    fn generate_keyword_from_title(&self, _title: &str) -> Result<String> {
        Err(Error::Http("connection reset".into()))
    }

    fn classify_category(&self, _content: &str, _filename: &str) -> Result<CategoryVerdict> {
        Err(Error::Inference("malformed JSON".into()))
    }
}

fn sources(blocks: &[LegalBlock]) -> Vec<String> {
    blocks.iter().map(|b| b.source.clone()).collect()
}

fn squash(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn test_decision_429_scenario() {
    let splitter = LegalSplitter::rule_based();
    let blocks = splitter.split_document(DECISION_429, "429-QD.pdf");

    assert_eq!(sources(&blocks), vec!["Căn cứ", "Quyết định", "Điều 2"]);
    for b in &blocks {
        assert_eq!(b.doc_id, "429/QĐ-ĐHCNTT&TT");
        assert_eq!(b.date, "2022-06-22");
        assert_eq!(b.type_data, "markdown");
        assert!(!b.content.contains("Nơi nhận"));
        assert!(!b.content.contains("Như trên"));
    }

    assert_eq!(
        blocks[0].content,
        "Căn cứ Quyết định số 468/QĐ-TTg ...;\nTheo đề nghị của Trưởng phòng Đào tạo,"
    );
    assert!(blocks[1].content.starts_with("QUYẾT ĐỊNH:"));
    assert!(blocks[1].content.contains("Điều 1. Ban hành kèm theo Quyết định này"));
    assert!(!blocks[1].content.contains("Điều 2"));
    assert!(blocks[2].content.starts_with("Điều 2. Phạm vi điều chỉnh"));
    assert!(blocks[2].content.ends_with("2. Quy định này áp dụng ..."));
}

#[test]
fn test_footer_cut_from_last_clause() {
    for footer in ["**Nơi nhận:**", "Nơi nhận", "NƠI NHẬN:"] {
        let text = format!(
            "Điều 1. Phạm vi điều chỉnh\nVăn bản này quy định.\nĐiều 2. Trách nhiệm và hiệu lực\n1. A.\n2. B.\n{footer}\n- Như trên;\n- Lưu VT."
        );
        let blocks = LegalSplitter::rule_based().split_document(&text, "a.pdf");
        assert_eq!(
            sources(&blocks),
            vec!["Điều 1", "Điều 2, Khoản 1", "Điều 2, Khoản 2"],
            "footer {footer}"
        );
        assert_eq!(blocks[2].content, "2. B.");
        assert!(blocks.iter().all(|b| !b.content.contains("Như trên")));
    }
}

#[test]
fn test_content_is_contiguous_source_text() {
    let splitter = LegalSplitter::rule_based();
    let original = squash(DECISION_429);
    for b in splitter.split_document(DECISION_429, "a.pdf") {
        assert!(original.contains(&squash(&b.content)), "not contiguous: {}", b.source);
    }
}

#[test]
fn test_metadata_is_idempotent() {
    let first = vnlegal_splitter::metadata::extract(DECISION_429);
    let second = vnlegal_splitter::metadata::extract(DECISION_429);
    assert_eq!(first, second);
}

#[test]
fn test_articles_cover_region_without_gaps() {
    let text = "Điều 1. Giải thích từ ngữ\nNội dung một.\nĐiều 2. Học phí\nNội dung hai.\nTiếp tục hai.\nĐiều 3. Hiệu lực thi hành\nNội dung ba.";
    let blocks = LegalSplitter::rule_based().split_document(text, "a.pdf");
    assert_eq!(sources(&blocks), vec!["Điều 1", "Điều 2", "Điều 3"]);
    let joined: Vec<&str> = blocks.iter().map(|b| b.content.as_str()).collect();
    assert_eq!(joined.join("\n"), text);
}

#[test]
fn test_khoan_split_trigger() {
    let text = "Điều 7. Quyền và nghĩa vụ của sinh viên\n1. Được tôn trọng.\n2. Được cung cấp thông tin.\n3. Thực hiện nghĩa vụ.";
    let blocks = LegalSplitter::rule_based().split_document(text, "a.pdf");
    assert_eq!(
        sources(&blocks),
        vec!["Điều 7, Khoản 1", "Điều 7, Khoản 2", "Điều 7, Khoản 3"]
    );
    assert_eq!(blocks[1].content, "2. Được cung cấp thông tin.");

    let no_numbers = "Điều 7. Quyền và nghĩa vụ\nSinh viên có quyền và nghĩa vụ theo luật.";
    let blocks = LegalSplitter::rule_based().split_document(no_numbers, "a.pdf");
    assert_eq!(sources(&blocks), vec!["Điều 7"]);
}

#[test]
fn test_legal_basis_aggregation() {
    let text = "Căn cứ Luật Giáo dục đại học;\nCăn cứ Nghị định 99/2019/NĐ-CP;\nCăn cứ Quy chế tổ chức;\nQUYẾT ĐỊNH:\nBan hành quy định.";
    let blocks = LegalSplitter::rule_based().split_document(text, "a.pdf");
    assert_eq!(blocks[0].source, "Căn cứ");
    assert_eq!(
        blocks[0].content,
        "Căn cứ Luật Giáo dục đại học;\nCăn cứ Nghị định 99/2019/NĐ-CP;\nCăn cứ Quy chế tổ chức;"
    );
    assert!(!blocks[0].content.contains("QUYẾT ĐỊNH"));
}

#[test]
fn test_no_markers_yields_no_blocks() {
    let blocks = LegalSplitter::rule_based().split_document("Thông báo nghỉ lễ.", "a.pdf");
    assert!(blocks.is_empty());
}

#[test]
fn test_category_default_is_never_empty() {
    let blocks = LegalSplitter::rule_based().split_document("Điều 1. Hiệu lực\nCó hiệu lực từ ngày ký.", "scan.pdf");
    assert_eq!(blocks[0].category, DEFAULT_CATEGORY);
}

#[test]
fn test_markdown_round_trip_structure() {
    let splitter = LegalSplitter::rule_based();
    let blocks = splitter.split_document(DECISION_429, "a.pdf");
    let md = splitter.to_markdown(&blocks);

    assert_eq!(md.matches("## Metadata").count(), blocks.len());
    assert_eq!(md.matches("## Nội dung").count(), blocks.len());

    let mut cursor = 0;
    for b in &blocks {
        let needle = format!("- **source:** {}", b.source);
        let found = md[cursor..].find(&needle).expect("source in order");
        cursor += found + needle.len();
    }
    // keyword from the quoted regulation name
    assert!(md.contains("Các căn cứ pháp lý để ban hành quy định liên quan đến Quy định ..."));
}

#[test]
fn test_llm_keyword_used_and_cached() {
    let llm = FixedLlm::new("quy định đào tạo", "academic_affairs");
    let splitter = LegalSplitter::new(llm.clone(), SplitterSettings::default());
    let out = splitter.split_to_markdown(DECISION_429, "a.pdf");

    assert_eq!(out.keyword, "quy định đào tạo");
    assert!(out
        .markdown
        .contains("QUYẾT ĐỊNH ban hành các quy định liên quan đến quy định đào tạo"));

    splitter.to_markdown(&out.blocks);
    assert_eq!(llm.keyword_calls.load(Ordering::SeqCst), 1);
    // category stays rule-based unless enabled
    assert_eq!(llm.category_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_llm_category_when_enabled() {
    let llm = FixedLlm::new("x", "examination");
    let settings = SplitterSettings {
        llm_category: true,
        ..SplitterSettings::default()
    };
    let splitter = LegalSplitter::new(llm.clone(), settings);
    let blocks = splitter.split_document(DECISION_429, "quy_che_tuyen_sinh.pdf");
    assert!(blocks.iter().all(|b| b.category == "examination"));
    assert_eq!(llm.category_calls.load(Ordering::SeqCst), blocks.len());
}

#[test]
fn test_llm_category_outside_taxonomy_is_ignored() {
    let llm = FixedLlm::new("x", "sports");
    let settings = SplitterSettings {
        llm_category: true,
        ..SplitterSettings::default()
    };
    let blocks = LegalSplitter::new(llm, settings).split_document(DECISION_429, "quy_che_tuyen_sinh.pdf");
    assert!(blocks.iter().all(|b| b.category == "admissions"));
}

#[test]
fn test_broken_llm_degrades_to_rules() {
    let settings = SplitterSettings {
        use_llm: true,
        llm_category: true,
        ..SplitterSettings::default()
    };
    let splitter = LegalSplitter::new(Arc::new(BrokenLlm), settings);
    let out = splitter.split_to_markdown(DECISION_429, "hoc_phi.pdf");

    assert_eq!(out.blocks.len(), 3);
    assert!(out.blocks.iter().all(|b| b.category == "finance_and_tuition"));
    // fallback keyword: first five words of the title
    assert_eq!(out.keyword, "Quy định ...");
}

#[test]
fn test_attached_regulation_document() {
    let text = "Số: 15/QĐ-ĐHTN
Căn cứ Luật Giáo dục đại học;
QUYẾT ĐỊNH:
Điều 1. Ban hành kèm theo Quyết định này “Quy định về học bổng khuyến khích học tập”.
Điều 2. Quyết định có hiệu lực kể từ ngày ký.
Nơi nhận:
- Như Điều 2;
(Ký)
***
## QUY ĐỊNH
Chương I
NHỮNG QUY ĐỊNH CHUNG
Điều 1. Đối tượng áp dụng
Sinh viên hệ chính quy.
Điều 2. Điều kiện và mức học bổng
1. Điều kiện xét.
2. Mức học bổng.
Nơi nhận lưu trữ:
- Lưu VT.";

    let settings = SplitterSettings {
        use_llm: false,
        emit_chapters: true,
        ..SplitterSettings::default()
    };
    let splitter = LegalSplitter::new(Arc::new(vnlegal_core::NoopLlm::new()), settings);
    let out = splitter.split_to_markdown(text, "hoc_bong.pdf");

    assert_eq!(
        sources(&out.blocks),
        vec![
            "Căn cứ",
            "Quyết định",
            "Chương I — NHỮNG QUY ĐỊNH CHUNG",
            "Điều 1",
            "Điều 2, Khoản 1",
            "Điều 2, Khoản 2"
        ]
    );
    assert!(out.blocks[1].content.contains("Điều 2. Quyết định có hiệu lực"));
    assert!(out.blocks.iter().all(|b| b.category == "student_affairs"));
    assert_eq!(out.title, "Quy định về học bổng khuyến khích học tập");
    assert_eq!(out.keyword, "Quy định về học bổng");
    assert!(!out.markdown.contains("Lưu VT"));
}

#[test]
fn test_sources_parse_back() {
    let blocks = LegalSplitter::rule_based().split_document(DECISION_429, "a.pdf");
    for b in blocks {
        let locator: SourceLocator = b.source.parse().expect("closed grammar");
        assert_eq!(locator.to_string(), b.source);
    }
}
