//! Code fence detection for the flow tokenizer.

use std::ops::Range;

/// An opening code fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FenceOpening {
    /// Fence marker character (backtick or tilde).
    pub marker: char,
    /// Length of the fence run.
    pub length: usize,
    /// First word of the info string, relative to the fence start.
    pub lang: Option<Range<usize>>,
    /// Rest of the info string, relative to the fence start.
    pub meta: Option<Range<usize>>,
    /// End of the fence line without trailing whitespace.
    pub end: usize,
}

/// Returns (visual_columns, byte_offset) for leading whitespace.
/// Visual columns expand tabs to 4-column boundaries per CommonMark.
pub(crate) fn leading_whitespace_info(line: &str) -> (usize, usize) {
    let mut col = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => {
                col += 1;
                bytes += 1;
            }
            b'\t' => {
                col += 4 - (col % 4); // Tab expands to next 4-column boundary
                bytes += 1;
            }
            _ => break,
        }
    }
    (col, bytes)
}

fn marker_run(after_indent: &str) -> Option<(char, usize)> {
    let first = after_indent.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run_len = after_indent.bytes().take_while(|b| *b == first as u8).count();
    (run_len >= 3).then_some((first, run_len))
}

/// Parse an opening fence from text that starts at the fence marker.
pub(crate) fn detect_fence_opening(after_indent: &str) -> Option<FenceOpening> {
    let (marker, length) = marker_run(after_indent)?;
    let info = after_indent[length..].trim_matches([' ', '\t']);
    // Backtick fences cannot carry backticks in their info string
    if marker == '`' && info.contains('`') {
        return None;
    }
    let end = after_indent.trim_end_matches([' ', '\t']).len();
    if info.is_empty() {
        return Some(FenceOpening { marker, length, lang: None, meta: None, end });
    }
    let info_start = end - info.len();
    let lang_len = info.find([' ', '\t']).unwrap_or(info.len());
    let rest = info[lang_len..].trim_start_matches([' ', '\t']);
    let meta = (!rest.is_empty()).then(|| (end - rest.len())..end);
    Some(FenceOpening {
        marker,
        length,
        lang: Some(info_start..info_start + lang_len),
        meta,
        end,
    })
}

/// Check if a line closes a fence opened with `marker` × `length`.
/// A closing fence has only fence markers followed by optional whitespace.
pub(crate) fn is_closing_fence(after_indent: &str, marker: char, length: usize) -> bool {
    match marker_run(after_indent) {
        Some((found, run)) if found == marker && run >= length => after_indent[run..]
            .bytes()
            .all(|b| b == b' ' || b == b'\t'),
        _ => false,
    }
}
