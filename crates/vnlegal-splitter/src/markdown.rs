//! Markdown rendering of a block list.

use vnlegal_core::LegalBlock;

/// Separator written between two blocks.
pub const BLOCK_SEPARATOR: &str = "---";

/// Introductory sentence prepended to the legal-basis and decision blocks.
fn title_prefix(block: &LegalBlock, keyword: &str) -> Option<String> {
    let keyword = keyword.trim();
    if block.is_legal_basis() {
        return Some(if keyword.is_empty() {
            "Các căn cứ pháp lý để ban hành quy định".to_string()
        } else {
            format!("Các căn cứ pháp lý để ban hành quy định liên quan đến {keyword}")
        });
    }
    if block.is_decision() {
        return Some(if keyword.is_empty() {
            "QUYẾT ĐỊNH ban hành các quy định".to_string()
        } else {
            format!("QUYẾT ĐỊNH ban hành các quy định liên quan đến {keyword}")
        });
    }
    None
}

fn render_block(block: &LegalBlock, keyword: &str, out: &mut Vec<String>) {
    out.push("## Metadata".to_string());
    out.push(format!("- **doc_id:** {}", block.doc_id));
    out.push(format!("- **department:** {}", block.department));
    out.push(format!("- **type_data:** {}", block.type_data));
    out.push(format!("- **category:** {}", block.category));
    out.push(format!("- **date:** {}", block.date));
    out.push(format!("- **source:** {}", block.source));
    out.push(String::new());
    out.push("## Nội dung".to_string());
    out.push(String::new());
    if let Some(prefix) = title_prefix(block, keyword) {
        out.push(prefix);
        out.push(String::new());
    }
    out.push(block.content.clone());
}

/// Render blocks in order, separated by horizontal rules.
///
/// Blocks that start an article get one extra blank line before them.
pub fn render(blocks: &[LegalBlock], keyword: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push(String::new());
            out.push(BLOCK_SEPARATOR.to_string());
            out.push(String::new());
            if block.starts_article() {
                out.push(String::new());
            }
        }
        render_block(block, keyword, &mut out);
    }
    out.join("\n")
}
