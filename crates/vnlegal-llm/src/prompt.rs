//! Prompts sent to the provider and parsing of what comes back.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use vnlegal_core::{
    is_valid_category, CategoryVerdict, ClassificationMethod, Error, Result, CATEGORIES,
    DEFAULT_CATEGORY,
};

/// Characters of content included in a category prompt.
pub const CATEGORY_CONTENT_CHARS: usize = 2000;
/// Longest keyword phrase accepted from a provider.
pub const MAX_KEYWORD_WORDS: usize = 8;

static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());
static KEYWORD_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(từ khóa|từ khoá|keyword)\s*:\s*").unwrap());

const CATEGORY_HINTS: &str = r#"- "tuyển sinh/xét tuyển/điều kiện dự tuyển" → admissions
- "tiến sĩ/thạc sĩ/đào tạo sau đại học/TS/ThS" → postgraduate_training
- "học phí/miễn giảm/thu/chi/quy định phí" → finance_and_tuition
- "kỳ thi/thi cử/đánh giá/kiểm tra" → examination
- "thực tập/TTTN/doanh nghiệp/internship" → internship
- "đào tạo từ xa/e-learning/online/qua mạng" → distance_learning
- "công tác sinh viên/khen thưởng/kỷ luật/học bổng/rèn luyện" → student_affairs
- "tổ chức cán bộ/nhân sự/CBVC" → human_resources
- "phòng đào tạo/chương trình học/tín chỉ/kế hoạch giảng dạy/GDTC/thể chất/quy chế" → academic_affairs
- Khác → training_and_regulations"#;

/// Prompt asking for a short keyword phrase summarizing a title.
pub fn keyword_prompt(title: &str) -> String {
    format!(
        "Bạn là chuyên gia về văn bản pháp lý Việt Nam.\n\
         Hãy tóm tắt tiêu đề văn bản sau thành một cụm từ khóa tiếng Việt dài 3-5 từ.\n\
         Chỉ trả về cụm từ khóa, không giải thích, không dùng dấu ngoặc kép.\n\n\
         Tiêu đề: {title}\n\n\
         Từ khóa:"
    )
}

/// Prompt asking for one category of the fixed taxonomy as JSON.
pub fn category_prompt(content: &str, filename: &str) -> String {
    let taxonomy = serde_json::to_string(&CATEGORIES).unwrap_or_default();
    let excerpt: String = content.chars().take(CATEGORY_CONTENT_CHARS).collect();
    format!(
        "Bạn là một chuyên gia phân loại văn bản pháp lý Việt Nam. \
         Phân tích nội dung văn bản và phân loại vào đúng category.\n\n\
         DANH SÁCH CATEGORY CHO PHÉP:\n{taxonomy}\n\n\
         HƯỚNG DẪN PHÂN LOẠI:\n{CATEGORY_HINTS}\n\n\
         Filename: {filename}\n\n\
         Content: {excerpt}\n\n\
         Trả về JSON với format:\n\
         {{\"category\": \"tên_category\", \"confidence\": 0.95, \
         \"reasoning\": \"lý do phân loại\", \"keywords_found\": [\"từ_khóa_1\"]}}"
    )
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    category: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    keywords_found: Vec<String>,
}

/// Parse the first JSON object in a category response.
///
/// A category outside the taxonomy becomes the default with zero confidence,
/// so callers treat it as "no opinion".
pub fn parse_category_response(response: &str) -> Result<CategoryVerdict> {
    let json = JSON_OBJECT
        .find(response)
        .ok_or_else(|| Error::Inference("no JSON object in category response".into()))?;
    let raw: RawVerdict = serde_json::from_str(json.as_str())
        .map_err(|e| Error::Inference(format!("invalid category JSON: {}", e)))?;

    let category = raw.category.trim();
    let (category, confidence) = if is_valid_category(category) {
        (category.to_string(), raw.confidence.clamp(0.0, 1.0))
    } else {
        (DEFAULT_CATEGORY.to_string(), 0.0)
    };

    Ok(CategoryVerdict {
        category,
        confidence,
        method: ClassificationMethod::Llm,
        reasoning: raw.reasoning,
        keywords_found: raw.keywords_found,
    })
}

fn is_wrapping(c: char) -> bool {
    matches!(
        c,
        '"' | '\'' | '“' | '”' | '‘' | '’' | '*' | '`' | '.' | ',' | ':' | ';' | '-' | '«' | '»'
    ) || c.is_whitespace()
}

/// Reduce a keyword response to a bare phrase of at most eight words.
pub fn clean_keyword(response: &str) -> Result<String> {
    let line = response
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    let line = KEYWORD_LABEL.replace(line, "");
    let phrase = line
        .trim_matches(is_wrapping)
        .split_whitespace()
        .take(MAX_KEYWORD_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    let phrase = phrase.trim_end_matches(is_wrapping).to_string();

    if phrase.is_empty() {
        return Err(Error::Inference("empty keyword response".into()));
    }
    Ok(phrase)
}
