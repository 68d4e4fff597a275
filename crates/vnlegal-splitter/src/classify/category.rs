//! Category classifier over filenames and block content.

pub use vnlegal_core::{is_valid_category, CATEGORIES};
use vnlegal_core::{CategoryVerdict, ClassificationMethod, DEFAULT_CATEGORY};

use super::{match_rules, Rule};

/// Confidence reported for a keyword hit.
const RULE_CONFIDENCE: f64 = 0.8;

const FILENAME_EXTENSIONS: [&str; 7] = [".pdf", ".docx", ".doc", ".xlsx", ".xls", ".txt", ".md"];

/// Ordered filename table. `distance_learning` precedes the generic "đào tạo".
const FILENAME_RULES: &[Rule] = &[
    ("admissions", &["tuyển sinh", "xét tuyển", "dự tuyển"]),
    (
        "postgraduate_training",
        &["thạc sĩ", "tiến sĩ", "sau đại học", "thạc sỹ", "tiến sỹ"],
    ),
    (
        "distance_learning",
        &["đào tạo từ xa", "e-learning", "trực tuyến", "online"],
    ),
    (
        "academic_affairs",
        &[
            "đào tạo",
            "tín chỉ",
            "ctđt",
            "gdtc",
            "giảng dạy",
            "học tập",
            "giáo trình",
            "chuẩn đầu ra",
            "tin học",
            "ngoại ngữ",
            "chương trình",
            "khung chương trình",
        ],
    ),
    (
        "internship",
        &["thực tập", "tttn", "đồ án", "khóa luận", "khoá luận"],
    ),
    (
        "finance_and_tuition",
        &["học phí", "tài chính", "miễn", "giảm", "phí"],
    ),
    (
        "examination",
        &["thi cử", "kiểm tra", "đánh giá", "kỳ thi", "kết quả học tập"],
    ),
    (
        "human_resources",
        &["cán bộ", "giảng viên", "cbvc", "nhân sự", "tuyển dụng"],
    ),
    (
        "student_affairs",
        &[
            "công tác sinh viên",
            "ngoại khóa",
            "hoạt động",
            "học bổng",
            "khen thưởng",
            "kỷ luật",
        ],
    ),
    (
        "training_and_regulations",
        &["quy chế", "quy định", "nội quy", "quy tắc"],
    ),
];

/// Ordered content table.
const CONTENT_RULES: &[Rule] = &[
    ("postgraduate_training", &["tiến sĩ", "thạc sĩ", "sau đại học"]),
    (
        "admissions",
        &["tuyển sinh", "xét tuyển", "điều kiện dự tuyển"],
    ),
    (
        "finance_and_tuition",
        &["học phí", "miễn giảm", "quy định phí", "thu chi"],
    ),
    ("examination", &["kỳ thi", "thi cử", "đánh giá", "kiểm tra"]),
    (
        "internship",
        &["thực tập", "tttn", "doanh nghiệp", "internship"],
    ),
    (
        "distance_learning",
        &["đào tạo từ xa", "e-learning", "online", "qua mạng"],
    ),
    (
        "student_affairs",
        &[
            "công tác sinh viên",
            "khen thưởng",
            "kỷ luật",
            "học bổng",
            "rèn luyện",
        ],
    ),
    ("human_resources", &["tổ chức cán bộ", "nhân sự", "cbvc"]),
    (
        "academic_affairs",
        &[
            "phòng đào tạo",
            "chương trình học",
            "tín chỉ",
            "kế hoạch giảng dạy",
            "gdtc",
            "thể chất",
            "quy chế",
        ],
    ),
];

fn verdict(hit: Option<(&'static str, &'static str)>) -> CategoryVerdict {
    match hit {
        Some((category, keyword)) => CategoryVerdict {
            category: category.to_string(),
            confidence: RULE_CONFIDENCE,
            method: ClassificationMethod::RuleBased,
            reasoning: format!("matched keyword '{keyword}'"),
            keywords_found: vec![keyword.to_string()],
        },
        None => CategoryVerdict {
            category: DEFAULT_CATEGORY.to_string(),
            confidence: 0.0,
            method: ClassificationMethod::RuleBased,
            reasoning: "no keyword matched".to_string(),
            keywords_found: Vec::new(),
        },
    }
}

/// Lowercase, drop a known extension, treat `_` and `-` as spaces.
fn normalize_filename(filename: &str) -> String {
    let mut name = filename.trim().to_lowercase();
    if let Some(ext) = FILENAME_EXTENSIONS.iter().find(|ext| name.ends_with(*ext)) {
        name.truncate(name.len() - ext.len());
    }
    name.replace(['_', '-'], " ")
}

/// Classify a document by its filename.
pub fn classify_by_filename(filename: &str) -> CategoryVerdict {
    let name = normalize_filename(filename);
    if name.trim().is_empty() {
        return verdict(None);
    }
    verdict(match_rules(&name, FILENAME_RULES))
}

/// Classify a single block by its content.
pub fn classify_by_content(content: &str) -> CategoryVerdict {
    verdict(match_rules(&content.to_lowercase(), CONTENT_RULES))
}
