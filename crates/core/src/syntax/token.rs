//! Token kinds and the enter/exit event stream.

use crate::error::DirectiveError;
use crate::mdast::DirectiveKind;
use markdown::unist::Point;
use std::fmt;
use std::str::FromStr;

/// Piece of a directive, combined with a [`DirectiveKind`] to form a token
/// kind such as `directiveLeafAttributeIdValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectivePart {
    /// The whole directive.
    Whole,
    /// Opening or closing fence line of a container.
    Fence,
    /// Colon run.
    Sequence,
    /// Name.
    Name,
    /// `[label]` including brackets.
    Label,
    /// `[` or `]`.
    LabelMarker,
    /// Content between the label brackets.
    LabelString,
    /// `{...}` including braces.
    Attributes,
    /// `{` or `}`.
    AttributesMarker,
    /// `#id` shortcut.
    AttributeId,
    /// `#`.
    AttributeIdMarker,
    /// Value after `#`.
    AttributeIdValue,
    /// `.class` shortcut.
    AttributeClass,
    /// `.`.
    AttributeClassMarker,
    /// Value after `.`.
    AttributeClassValue,
    /// `key` or `key=value`.
    Attribute,
    /// Attribute name.
    AttributeName,
    /// `=`.
    AttributeInitializerMarker,
    /// Quoted value including quotes.
    AttributeValueLiteral,
    /// Quote character.
    AttributeValueMarker,
    /// Value text, quoted or not.
    AttributeValue,
    /// Flow content of a container.
    Content,
}

impl DirectivePart {
    const SUFFIXES: [(DirectivePart, &'static str); 22] = [
        (DirectivePart::Whole, ""),
        (DirectivePart::Fence, "Fence"),
        (DirectivePart::Sequence, "Sequence"),
        (DirectivePart::Name, "Name"),
        (DirectivePart::Label, "Label"),
        (DirectivePart::LabelMarker, "LabelMarker"),
        (DirectivePart::LabelString, "LabelString"),
        (DirectivePart::Attributes, "Attributes"),
        (DirectivePart::AttributesMarker, "AttributesMarker"),
        (DirectivePart::AttributeId, "AttributeId"),
        (DirectivePart::AttributeIdMarker, "AttributeIdMarker"),
        (DirectivePart::AttributeIdValue, "AttributeIdValue"),
        (DirectivePart::AttributeClass, "AttributeClass"),
        (DirectivePart::AttributeClassMarker, "AttributeClassMarker"),
        (DirectivePart::AttributeClassValue, "AttributeClassValue"),
        (DirectivePart::Attribute, "Attribute"),
        (DirectivePart::AttributeName, "AttributeName"),
        (DirectivePart::AttributeInitializerMarker, "AttributeInitializerMarker"),
        (DirectivePart::AttributeValueLiteral, "AttributeValueLiteral"),
        (DirectivePart::AttributeValueMarker, "AttributeValueMarker"),
        (DirectivePart::AttributeValue, "AttributeValue"),
        (DirectivePart::Content, "Content"),
    ];

    fn suffix(self) -> &'static str {
        Self::SUFFIXES
            .iter()
            .find(|(part, _)| *part == self)
            .map_or("", |(_, suffix)| suffix)
    }
}

/// Kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `paragraph`
    Paragraph,
    /// `data`
    Data,
    /// `lineEnding`
    LineEnding,
    /// `characterEscape`
    CharacterEscape,
    /// `characterEscapeMarker`
    CharacterEscapeMarker,
    /// `characterEscapeValue`
    CharacterEscapeValue,
    /// `characterReference`
    CharacterReference,
    /// `atxHeading`
    AtxHeading,
    /// `atxHeadingSequence`
    AtxHeadingSequence,
    /// `atxHeadingText`
    AtxHeadingText,
    /// `blockQuote`
    BlockQuote,
    /// `thematicBreak`
    ThematicBreak,
    /// `codeFenced`
    CodeFenced,
    /// `codeFencedFence`
    CodeFencedFence,
    /// `codeFencedFenceInfo`
    CodeFencedFenceInfo,
    /// `codeFencedFenceMeta`
    CodeFencedFenceMeta,
    /// `codeFlowValue`
    CodeFlowValue,
    /// `directive{Container,Leaf,Text}{Part}`
    Directive(DirectiveKind, DirectivePart),
}

impl TokenKind {
    const GENERIC: [(TokenKind, &'static str); 17] = [
        (TokenKind::Paragraph, "paragraph"),
        (TokenKind::Data, "data"),
        (TokenKind::LineEnding, "lineEnding"),
        (TokenKind::CharacterEscape, "characterEscape"),
        (TokenKind::CharacterEscapeMarker, "characterEscapeMarker"),
        (TokenKind::CharacterEscapeValue, "characterEscapeValue"),
        (TokenKind::CharacterReference, "characterReference"),
        (TokenKind::AtxHeading, "atxHeading"),
        (TokenKind::AtxHeadingSequence, "atxHeadingSequence"),
        (TokenKind::AtxHeadingText, "atxHeadingText"),
        (TokenKind::BlockQuote, "blockQuote"),
        (TokenKind::ThematicBreak, "thematicBreak"),
        (TokenKind::CodeFenced, "codeFenced"),
        (TokenKind::CodeFencedFence, "codeFencedFence"),
        (TokenKind::CodeFencedFenceInfo, "codeFencedFenceInfo"),
        (TokenKind::CodeFencedFenceMeta, "codeFencedFenceMeta"),
        (TokenKind::CodeFlowValue, "codeFlowValue"),
    ];
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let TokenKind::Directive(kind, part) = self {
            return write!(f, "directive{}{}", kind.token_infix(), part.suffix());
        }
        let name = Self::GENERIC
            .iter()
            .find(|(kind, _)| kind == self)
            .map_or("", |(_, name)| name);
        f.write_str(name)
    }
}

impl FromStr for TokenKind {
    type Err = DirectiveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Some((kind, _)) = Self::GENERIC.iter().find(|(_, name)| *name == value) {
            return Ok(*kind);
        }
        value
            .strip_prefix("directive")
            .and_then(|rest| {
                DirectiveKind::ALL.iter().find_map(|kind| {
                    let suffix = rest.strip_prefix(kind.token_infix())?;
                    DirectivePart::SUFFIXES
                        .iter()
                        .find(|(_, name)| *name == suffix)
                        .map(|(part, _)| TokenKind::Directive(*kind, *part))
                })
            })
            .ok_or_else(|| DirectiveError::UnknownTokenKind(value.to_string()))
    }
}

/// A typed span of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What the span is.
    pub kind: TokenKind,
    /// Where it starts.
    pub start: Point,
    /// Where it ends (exclusive).
    pub end: Point,
}

/// Whether an event opens or closes its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Token opens.
    Enter,
    /// Token closes.
    Exit,
}

/// One entry of the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Enter or exit.
    pub kind: EventKind,
    /// The token.
    pub token: Token,
}
