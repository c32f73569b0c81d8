//! Phrasing tokenizer: data, escapes, references, line endings, and text
//! directives.

use super::directive::{AttributeBlock, AttributeItem, Head, ValueSpan, scan_text};
use super::source::{Emitter, InlineText};
use super::token::{DirectivePart, TokenKind};
use crate::entity::reference_len;
use crate::mdast::DirectiveKind;
use std::ops::Range;

/// Tokenize `range` of `text` as phrasing content.
pub(crate) fn tokenize_inline(emitter: &mut Emitter<'_>, text: &InlineText, range: Range<usize>, directives: bool) {
    let bytes = text.text.as_bytes();
    let mut data_start = range.start;
    let mut index = range.start;
    // End of the most recent character escape.
    let mut escape_end = None;

    let flush = |emitter: &mut Emitter<'_>, start: usize, end: usize| {
        if start < end {
            emitter.token_inline(text, TokenKind::Data, start, end);
        }
    };

    while index < range.end {
        match bytes[index] {
            b'\\' if index + 1 < range.end && bytes[index + 1].is_ascii_punctuation() => {
                flush(emitter, data_start, index);
                let escape = emitter.enter_inline(text, TokenKind::CharacterEscape, index, index + 2);
                emitter.token_inline(text, TokenKind::CharacterEscapeMarker, index, index + 1);
                emitter.token_inline(text, TokenKind::CharacterEscapeValue, index + 1, index + 2);
                emitter.exit(escape);
                index += 2;
                escape_end = Some(index);
                data_start = index;
                continue;
            }
            b'&' => {
                if let Some(len) = reference_len(&text.text[index..range.end]) {
                    flush(emitter, data_start, index);
                    emitter.token_inline(text, TokenKind::CharacterReference, index, index + len);
                    index += len;
                    data_start = index;
                    continue;
                }
            }
            b'\n' => {
                flush(emitter, data_start, index);
                emitter.token_inline(text, TokenKind::LineEnding, index, index + 1);
                index += 1;
                data_start = index;
                continue;
            }
            b':' if directives => {
                // A colon right after another colon cannot open a directive,
                // unless that colon was escaped.
                let after_colon = index > 0 && bytes[index - 1] == b':' && escape_end != Some(index);
                if !after_colon && let Some(head) = scan_text(&text.text, index, range.end) {
                    flush(emitter, data_start, index);
                    let kind = TokenKind::Directive(DirectiveKind::Text, DirectivePart::Whole);
                    let whole = emitter.enter_inline(text, kind, index, head.end);
                    emit_head(emitter, text, DirectiveKind::Text, &head, directives);
                    emitter.exit(whole);
                    index = head.end;
                    data_start = index;
                    continue;
                }
            }
            _ => {}
        }
        index += text.text[index..].chars().next().map_or(1, char::len_utf8);
    }
    flush(emitter, data_start, range.end);
}

/// Emit the sequence, name, label, and attribute tokens of a directive.
pub(crate) fn emit_head(
    emitter: &mut Emitter<'_>,
    text: &InlineText,
    kind: DirectiveKind,
    head: &Head,
    directives: bool,
) {
    let part = |part| TokenKind::Directive(kind, part);
    emitter.token_inline(text, part(DirectivePart::Sequence), head.sequence.start, head.sequence.end);
    emitter.token_inline(text, part(DirectivePart::Name), head.name.start, head.name.end);

    if let Some(label) = &head.label {
        let enter = emitter.enter_inline(text, part(DirectivePart::Label), label.start, label.end);
        emitter.token_inline(text, part(DirectivePart::LabelMarker), label.start, label.start + 1);
        let inner = label.start + 1..label.end - 1;
        if !inner.is_empty() {
            let string = emitter.enter_inline(text, part(DirectivePart::LabelString), inner.start, inner.end);
            tokenize_inline(emitter, text, inner.clone(), directives);
            emitter.exit(string);
        }
        emitter.token_inline(text, part(DirectivePart::LabelMarker), label.end - 1, label.end);
        emitter.exit(enter);
    }

    if let Some(block) = &head.attributes {
        emit_attributes(emitter, text, kind, block);
    }
}

fn emit_attributes(emitter: &mut Emitter<'_>, text: &InlineText, kind: DirectiveKind, block: &AttributeBlock) {
    let part = |part| TokenKind::Directive(kind, part);
    let range = &block.range;
    let enter = emitter.enter_inline(text, part(DirectivePart::Attributes), range.start, range.end);
    emitter.token_inline(text, part(DirectivePart::AttributesMarker), range.start, range.start + 1);

    for item in &block.items {
        match item {
            AttributeItem::LineEnding(at) => {
                emitter.token_inline(text, TokenKind::LineEnding, *at, at + 1);
            }
            AttributeItem::Id { marker, value } | AttributeItem::Class { marker, value } => {
                let (wrapper, marker_part, value_part) = if matches!(item, AttributeItem::Id { .. }) {
                    (DirectivePart::AttributeId, DirectivePart::AttributeIdMarker, DirectivePart::AttributeIdValue)
                } else {
                    (
                        DirectivePart::AttributeClass,
                        DirectivePart::AttributeClassMarker,
                        DirectivePart::AttributeClassValue,
                    )
                };
                let shortcut = emitter.enter_inline(text, part(wrapper), *marker, value.end);
                emitter.token_inline(text, part(marker_part), *marker, marker + 1);
                emitter.token_inline(text, part(value_part), value.start, value.end);
                emitter.exit(shortcut);
            }
            AttributeItem::Named { name, value } => {
                let end = match value {
                    Some((_, ValueSpan::Quoted { close, .. })) => close + 1,
                    Some((_, ValueSpan::Unquoted(range))) => range.end,
                    None => name.end,
                };
                let attribute = emitter.enter_inline(text, part(DirectivePart::Attribute), name.start, end);
                emitter.token_inline(text, part(DirectivePart::AttributeName), name.start, name.end);
                if let Some((initializer, span)) = value {
                    emitter.token_inline(
                        text,
                        part(DirectivePart::AttributeInitializerMarker),
                        *initializer,
                        initializer + 1,
                    );
                    match span {
                        ValueSpan::Quoted { open, value, close } => {
                            let literal =
                                emitter.enter_inline(text, part(DirectivePart::AttributeValueLiteral), *open, close + 1);
                            emitter.token_inline(text, part(DirectivePart::AttributeValueMarker), *open, open + 1);
                            if !value.is_empty() {
                                emit_value(emitter, text, part(DirectivePart::AttributeValue), value.clone());
                            }
                            emitter.token_inline(text, part(DirectivePart::AttributeValueMarker), *close, close + 1);
                            emitter.exit(literal);
                        }
                        ValueSpan::Unquoted(value) => {
                            emit_value(emitter, text, part(DirectivePart::AttributeValue), value.clone());
                        }
                    }
                }
                emitter.exit(attribute);
            }
        }
    }

    emitter.token_inline(text, part(DirectivePart::AttributesMarker), range.end - 1, range.end);
    emitter.exit(enter);
}

fn emit_value(emitter: &mut Emitter<'_>, text: &InlineText, kind: TokenKind, value: Range<usize>) {
    let enter = emitter.enter_inline(text, kind, value.start, value.end);
    for (offset, _) in text.text[value.clone()].match_indices('\n') {
        let at = value.start + offset;
        emitter.token_inline(text, TokenKind::LineEnding, at, at + 1);
    }
    emitter.exit(enter);
}
