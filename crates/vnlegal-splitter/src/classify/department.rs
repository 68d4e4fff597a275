//! Issuing-department classifier.

use vnlegal_core::DEFAULT_DEPARTMENT;

use super::{match_rules, Rule};

/// Ordered department table.
pub const DEPARTMENTS: &[Rule] = &[
    (
        "Training Department",
        &["đào tạo", "giảng dạy", "giáo trình", "học tập", "sinh viên"],
    ),
    (
        "Academic Affairs",
        &["học vụ", "đăng ký", "tín chỉ", "kết quả học tập"],
    ),
    (
        "Student Affairs",
        &["sinh viên", "học sinh", "quản lý sinh viên"],
    ),
    ("Finance", &["tài chính", "học phí", "ngân sách"]),
    ("Administration", &["hành chính", "quản lý", "tổ chức"]),
];

/// Department label for a document's text.
pub fn classify_department(text: &str) -> &'static str {
    match_rules(&text.to_lowercase(), DEPARTMENTS)
        .map(|(label, _)| label)
        .unwrap_or(DEFAULT_DEPARTMENT)
}
