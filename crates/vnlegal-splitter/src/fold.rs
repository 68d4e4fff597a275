//! Accent folding for position-finding.
//!
//! Folding lowercases, strips Vietnamese diacritics and collapses whitespace.
//! The folded string is only ever searched; every hit is mapped back to a
//! byte offset in the original text so slices keep the original wording.

/// Lowercase `c` and strip its diacritics. Returns `None` for combining marks.
fn fold_lower(c: char) -> Option<char> {
    if is_combining_mark(c) {
        return None;
    }
    let base = match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ' | 'ấ' | 'ẩ'
        | 'ẫ' | 'ậ' | 'ä' | 'å' => 'a',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' | 'ë' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ' | 'ớ' | 'ở'
        | 'ỡ' | 'ợ' | 'ö' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' | 'û' | 'ü' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' | 'ÿ' => 'y',
        'đ' => 'd',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    };
    Some(base)
}

/// Combining diacritical marks (decomposed input such as `a` + U+0301).
fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}')
}

/// Fold a string without keeping an index map.
pub fn fold_str(s: &str) -> String {
    FoldedText::new(s).folded
}

/// A folded copy of a text plus a folded-byte → original-byte index map.
#[derive(Debug, Clone)]
pub struct FoldedText {
    folded: String,
    /// `offsets[i]` is the original byte offset that produced folded byte `i`.
    /// One extra trailing entry maps the end of the folded text to the end of the original.
    offsets: Vec<usize>,
}

impl FoldedText {
    pub fn new(original: &str) -> Self {
        let mut folded = String::with_capacity(original.len());
        let mut offsets = Vec::with_capacity(original.len() + 1);
        let mut last_was_space = false;

        for (pos, c) in original.char_indices() {
            if c.is_whitespace() {
                if !last_was_space {
                    folded.push(' ');
                    offsets.push(pos);
                    last_was_space = true;
                }
                continue;
            }
            for lower in c.to_lowercase() {
                if let Some(base) = fold_lower(lower) {
                    let before = folded.len();
                    folded.push(base);
                    offsets.extend(std::iter::repeat(pos).take(folded.len() - before));
                    last_was_space = false;
                }
            }
        }
        offsets.push(original.len());

        Self { folded, offsets }
    }

    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// Map a byte index in the folded text back to the original text.
    pub fn to_original(&self, folded_idx: usize) -> usize {
        let last = self.offsets.len() - 1;
        self.offsets[folded_idx.min(last)]
    }

    /// Find an already-folded needle; returns the original byte offset of the hit.
    pub fn find(&self, needle: &str) -> Option<usize> {
        self.find_from(needle, 0)
    }

    /// Like [`find`](Self::find) but only considers hits at or after `original_from`.
    pub fn find_from(&self, needle: &str, original_from: usize) -> Option<usize> {
        let start = self.offsets.partition_point(|&o| o < original_from);
        if start > self.folded.len() {
            return None;
        }
        let mut search_from = start;
        while !self.folded.is_char_boundary(search_from) {
            search_from += 1;
        }
        self.folded[search_from..]
            .find(needle)
            .map(|i| self.to_original(search_from + i))
    }

    /// Whether the folded text contains `needle` (which must already be folded).
    pub fn contains(&self, needle: &str) -> bool {
        self.folded.contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_vietnamese() {
        assert_eq!(fold_str("Phạm vi điều chỉnh"), "pham vi dieu chinh");
        assert_eq!(fold_str("NHỮNG QUY ĐỊNH CHUNG"), "nhung quy dinh chung");
        assert_eq!(fold_str("Đối   tượng\náp dụng"), "doi tuong ap dung");
    }

    #[test]
    fn test_fold_decomposed_input() {
        // "Điều" written with combining marks
        let decomposed = "Đie\u{0302}\u{0300}u";
        assert_eq!(fold_str(decomposed), "dieu");
    }

    #[test]
    fn test_index_map_points_into_original() {
        let original = "Căn cứ Luật Giáo dục;\nQUYẾT ĐỊNH:";
        let folded = FoldedText::new(original);
        let pos = folded.find("quyet dinh").unwrap();
        assert!(original[pos..].starts_with("QUYẾT ĐỊNH"));
    }

    #[test]
    fn test_find_from_skips_earlier_hits() {
        let original = "Điều 1. A\nĐiều 2. B";
        let folded = FoldedText::new(original);
        let first = folded.find("dieu").unwrap();
        assert_eq!(first, 0);
        let second = folded.find_from("dieu", 1).unwrap();
        assert!(original[second..].starts_with("Điều 2"));
    }

    #[test]
    fn test_to_original_clamps() {
        let folded = FoldedText::new("ab");
        assert_eq!(folded.to_original(99), 2);
        assert!(folded.contains("ab"));
        assert_eq!(folded.find("zz"), None);
    }
}
