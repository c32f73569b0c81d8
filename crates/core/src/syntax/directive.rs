//! Directive grammar: names, labels, attribute blocks, and fences.
//!
//! Scanners work on byte offsets into a text and only report what they
//! found; the flow and text tokenizers turn the result into events.

use std::ops::Range;

/// A parsed directive head: `:name[label]{attributes}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Head {
    pub sequence: Range<usize>,
    pub name: Range<usize>,
    pub label: Option<Range<usize>>,
    pub attributes: Option<AttributeBlock>,
    pub end: usize,
}

/// `{...}` and its contents in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttributeBlock {
    pub range: Range<usize>,
    pub items: Vec<AttributeItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttributeItem {
    Id { marker: usize, value: Range<usize> },
    Class { marker: usize, value: Range<usize> },
    Named { name: Range<usize>, value: Option<(usize, ValueSpan)> },
    LineEnding(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ValueSpan {
    Quoted { open: usize, value: Range<usize>, close: usize },
    Unquoted(Range<usize>),
}

fn is_space(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// End of a directive name starting at `start`.
pub(crate) fn scan_name(text: &str, start: usize, end: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if start >= end || !bytes[start].is_ascii_alphabetic() {
        return None;
    }
    let mut index = start + 1;
    while index < end && (bytes[index].is_ascii_alphanumeric() || matches!(bytes[index], b'-' | b'_')) {
        index += 1;
    }
    if matches!(bytes[index - 1], b'-' | b'_') {
        return None;
    }
    Some(index)
}

/// End (after `]`) of a label opening at `start`.
pub(crate) fn scan_label(text: &str, start: usize, end: usize, allow_eol: bool) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut index = start + 1;
    while index < end {
        match bytes[index] {
            b'\\' if index + 1 < end && matches!(bytes[index + 1], b'[' | b'\\' | b']') => {
                index += 1;
            }
            b'[' => depth += 1,
            b']' if depth == 0 => return Some(index + 1),
            b']' => depth -= 1,
            b'\n' if !allow_eol => return None,
            _ => {}
        }
        index += 1;
    }
    None
}

fn is_shortcut_end(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'"' | b'#' | b'\'' | b'.' | b'<' | b'=' | b'>' | b'`' | b'}')
}

fn is_attribute_name_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b':' || byte == b'_'
}

fn is_attribute_name_rest(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b':' | b'_')
}

/// Attribute block opening at `start`.
pub(crate) fn scan_attributes(text: &str, start: usize, end: usize, allow_eol: bool) -> Option<AttributeBlock> {
    let bytes = text.as_bytes();
    let mut items = Vec::new();
    let mut index = start + 1;

    // Skips spaces and, where allowed, line endings.
    let skip_whitespace = |mut index: usize, items: &mut Vec<AttributeItem>| -> Option<usize> {
        while index < end {
            match bytes[index] {
                b' ' | b'\t' => index += 1,
                b'\n' if allow_eol => {
                    items.push(AttributeItem::LineEnding(index));
                    index += 1;
                }
                b'\n' => return None,
                _ => break,
            }
        }
        Some(index)
    };

    loop {
        index = skip_whitespace(index, &mut items)?;
        if index >= end {
            return None;
        }
        match bytes[index] {
            b'}' => {
                return Some(AttributeBlock { range: start..index + 1, items });
            }
            b'#' | b'.' => {
                // Shortcuts chain directly: `#a.b.c`
                loop {
                    let marker = index;
                    let value_start = marker + 1;
                    index = value_start;
                    while index < end && !is_shortcut_end(bytes[index]) {
                        index += 1;
                    }
                    if index == value_start {
                        return None;
                    }
                    let value = value_start..index;
                    items.push(if bytes[marker] == b'#' {
                        AttributeItem::Id { marker, value }
                    } else {
                        AttributeItem::Class { marker, value }
                    });
                    match bytes.get(index) {
                        Some(b'#' | b'.') if index < end => continue,
                        Some(b' ' | b'\t' | b'\n' | b'}') if index < end => break,
                        _ => return None,
                    }
                }
            }
            byte if is_attribute_name_start(byte) => {
                let name_start = index;
                index += 1;
                while index < end && is_attribute_name_rest(bytes[index]) {
                    index += 1;
                }
                let name = name_start..index;
                let mut between = Vec::new();
                let after_name = skip_whitespace(index, &mut between)?;
                if after_name < end && bytes[after_name] == b'=' {
                    let initializer = after_name;
                    let mut before_value = Vec::new();
                    let value_start = skip_whitespace(initializer + 1, &mut before_value)?;
                    let (value, next) = scan_value(bytes, value_start, end, allow_eol)?;
                    items.extend(between);
                    items.extend(before_value);
                    items.push(AttributeItem::Named { name, value: Some((initializer, value)) });
                    index = next;
                } else {
                    items.push(AttributeItem::Named { name, value: None });
                    items.extend(between);
                    index = after_name;
                }
            }
            _ => return None,
        }
    }
}

fn scan_value(bytes: &[u8], start: usize, end: usize, allow_eol: bool) -> Option<(ValueSpan, usize)> {
    if start >= end {
        return None;
    }
    match bytes[start] {
        quote @ (b'"' | b'\'') => {
            let mut index = start + 1;
            while index < end && bytes[index] != quote {
                if bytes[index] == b'\n' && !allow_eol {
                    return None;
                }
                index += 1;
            }
            if index >= end {
                return None;
            }
            let close = index;
            let next = close + 1;
            // A quoted value must be followed by whitespace or the closing brace.
            match bytes.get(next) {
                Some(b' ' | b'\t' | b'\n' | b'}') if next < end => {}
                _ => return None,
            }
            Some((ValueSpan::Quoted { open: start, value: start + 1..close, close }, next))
        }
        b'<' | b'=' | b'>' | b'`' | b'}' | b'\n' => None,
        _ => {
            let mut index = start;
            while index < end {
                match bytes[index] {
                    b'"' | b'\'' | b'<' | b'=' | b'>' | b'`' => return None,
                    b' ' | b'\t' | b'\n' | b'}' => break,
                    _ => index += 1,
                }
            }
            if index >= end {
                return None;
            }
            Some((ValueSpan::Unquoted(start..index), index))
        }
    }
}

/// Name, optional label, and optional attributes after the colon run.
fn scan_rest(text: &str, sequence: Range<usize>, end: usize, allow_eol: bool) -> Option<Head> {
    let bytes = text.as_bytes();
    let name_end = scan_name(text, sequence.end, end)?;
    let name = sequence.end..name_end;
    let mut cursor = name_end;

    let mut label = None;
    if cursor < end && bytes[cursor] == b'['
        && let Some(label_end) = scan_label(text, cursor, end, allow_eol)
    {
        label = Some(cursor..label_end);
        cursor = label_end;
    }

    let mut attributes = None;
    if cursor < end && bytes[cursor] == b'{'
        && let Some(block) = scan_attributes(text, cursor, end, allow_eol)
    {
        cursor = block.range.end;
        attributes = Some(block);
    }

    Some(Head { sequence, name, label, attributes, end: cursor })
}

/// Text directive at `start` (a `:`), ending no later than `end`.
pub(crate) fn scan_text(text: &str, start: usize, end: usize) -> Option<Head> {
    scan_rest(text, start..start + 1, end, true)
}

fn colon_run(text: &str, start: usize) -> usize {
    text.as_bytes()[start..].iter().take_while(|b| **b == b':').count()
}

fn only_whitespace_after(text: &str, index: usize) -> bool {
    text.as_bytes()[index..].iter().all(|b| is_space(*b))
}

/// Leaf directive filling a whole line; `text` starts at the first colon.
pub(crate) fn scan_leaf(text: &str) -> Option<Head> {
    if colon_run(text, 0) != 2 {
        return None;
    }
    let head = scan_rest(text, 0..2, text.len(), false)?;
    only_whitespace_after(text, head.end).then_some(head)
}

/// Container opening fence; `text` starts at the first colon.
pub(crate) fn scan_container_opening(text: &str) -> Option<Head> {
    let size = colon_run(text, 0);
    if size < 3 {
        return None;
    }
    let head = scan_rest(text, 0..size, text.len(), false)?;
    only_whitespace_after(text, head.end).then_some(head)
}

/// Whether `text` (starting at the first colon) closes a container opened
/// with `size` colons. Returns the colon run length.
pub(crate) fn scan_container_closing(text: &str, size: usize) -> Option<usize> {
    let run = colon_run(text, 0);
    (run >= size && only_whitespace_after(text, run)).then_some(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_start_alpha_and_do_not_end_in_punctuation() {
        assert_eq!(scan_name("abc-d_1 x", 0, 9), Some(7));
        assert_eq!(scan_name("1a", 0, 2), None);
        assert_eq!(scan_name("a-", 0, 2), None);
        assert_eq!(scan_name("a_", 0, 2), None);
    }

    #[test]
    fn labels_balance_brackets_and_escapes() {
        assert_eq!(scan_label("[a[b]c]d", 0, 8, false), Some(7));
        assert_eq!(scan_label(r"[a\]b]", 0, 6, false), Some(6));
        assert_eq!(scan_label("[a", 0, 2, false), None);
        assert_eq!(scan_label("[a\nb]", 0, 5, false), None);
        assert_eq!(scan_label("[a\nb]", 0, 5, true), Some(5));
    }

    #[test]
    fn attribute_shortcuts_chain() {
        let text = "{#a.b .c}";
        let block = scan_attributes(text, 0, text.len(), false).unwrap();
        assert_eq!(block.range, 0..9);
        assert_eq!(
            block.items,
            vec![
                AttributeItem::Id { marker: 1, value: 2..3 },
                AttributeItem::Class { marker: 3, value: 4..5 },
                AttributeItem::Class { marker: 6, value: 7..8 },
            ]
        );
    }

    #[test]
    fn attribute_values() {
        let text = r#"{a b="c d" e=f g = 'h'}"#;
        let block = scan_attributes(text, 0, text.len(), false).unwrap();
        assert_eq!(
            block.items,
            vec![
                AttributeItem::Named { name: 1..2, value: None },
                AttributeItem::Named {
                    name: 3..4,
                    value: Some((4, ValueSpan::Quoted { open: 5, value: 6..9, close: 9 })),
                },
                AttributeItem::Named { name: 11..12, value: Some((12, ValueSpan::Unquoted(13..14))) },
                AttributeItem::Named {
                    name: 15..16,
                    value: Some((17, ValueSpan::Quoted { open: 19, value: 20..21, close: 21 })),
                },
            ]
        );
    }

    #[test]
    fn invalid_attribute_blocks() {
        for text in ["{", "{#}", "{a=}", "{a=\"b\"c}", "{a=b\"}", "{1}", "{a", "{.a\"}"] {
            assert_eq!(scan_attributes(text, 0, text.len(), true), None, "{text}");
        }
    }

    #[test]
    fn line_endings_only_where_allowed() {
        let text = "{a\nb}";
        assert_eq!(scan_attributes(text, 0, text.len(), false), None);
        let block = scan_attributes(text, 0, text.len(), true).unwrap();
        assert_eq!(
            block.items,
            vec![
                AttributeItem::Named { name: 1..2, value: None },
                AttributeItem::LineEnding(2),
                AttributeItem::Named { name: 3..4, value: None },
            ]
        );
    }

    #[test]
    fn text_directive_drops_failing_parts() {
        let head = scan_text(":a[b{c", 0, 6).unwrap();
        assert_eq!(head.name, 1..2);
        assert_eq!(head.label, None);
        assert_eq!(head.attributes, None);
        assert_eq!(head.end, 2);
    }

    #[test]
    fn leaf_requires_exactly_two_colons_and_clean_end() {
        assert!(scan_leaf("::a[b]{c}  ").is_some());
        assert!(scan_leaf(":::a").is_none());
        assert!(scan_leaf(":a").is_none());
        assert!(scan_leaf("::a b").is_none());
        assert!(scan_leaf("::a[b").is_none());
    }

    #[test]
    fn container_fences() {
        let head = scan_container_opening("::::a[b]").unwrap();
        assert_eq!(head.sequence, 0..4);
        assert_eq!(head.label, Some(5..8));
        assert!(scan_container_opening(":::").is_none());
        assert_eq!(scan_container_closing(":::: ", 4), Some(4));
        assert_eq!(scan_container_closing(":::", 4), None);
        assert_eq!(scan_container_closing(":::a", 3), None);
    }
}
