//! Line indexing with byte offsets.

/// A line of the source text and the byte offset where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub start: usize,
    pub text: &'a str,
}

/// Split on `\n`, keeping each line's starting offset.
pub fn index_lines(text: &str) -> Vec<Line<'_>> {
    let mut offset = 0;
    text.split('\n')
        .map(|piece| {
            let line = Line { start: offset, text: piece };
            offset += piece.len() + 1;
            line
        })
        .collect()
}

/// Line number containing byte `offset`.
pub fn line_of(text: &str, offset: usize) -> usize {
    text[..offset.min(text.len())].matches('\n').count()
}
