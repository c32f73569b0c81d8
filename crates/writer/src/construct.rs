//! Names of the constructs a serializer can be inside of.

use crate::error::WriterError;
use mdirective_core::DirectiveKind;
use std::fmt;
use std::str::FromStr;

/// A construct on the serializer's stack. Unsafe patterns are scoped to
/// these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructName {
    /// `blockquote`
    Blockquote,
    /// `codeFenced`
    CodeFenced,
    /// `containerDirective`
    ContainerDirective,
    /// `containerDirectiveLabel`
    ContainerDirectiveLabel,
    /// `headingAtx`
    HeadingAtx,
    /// `label`
    Label,
    /// `leafDirective`
    LeafDirective,
    /// `leafDirectiveLabel`
    LeafDirectiveLabel,
    /// `paragraph`
    Paragraph,
    /// `phrasing`
    Phrasing,
    /// `textDirective`
    TextDirective,
    /// `textDirectiveLabel`
    TextDirectiveLabel,
}

impl ConstructName {
    const NAMES: [(ConstructName, &'static str); 12] = [
        (ConstructName::Blockquote, "blockquote"),
        (ConstructName::CodeFenced, "codeFenced"),
        (ConstructName::ContainerDirective, "containerDirective"),
        (ConstructName::ContainerDirectiveLabel, "containerDirectiveLabel"),
        (ConstructName::HeadingAtx, "headingAtx"),
        (ConstructName::Label, "label"),
        (ConstructName::LeafDirective, "leafDirective"),
        (ConstructName::LeafDirectiveLabel, "leafDirectiveLabel"),
        (ConstructName::Paragraph, "paragraph"),
        (ConstructName::Phrasing, "phrasing"),
        (ConstructName::TextDirective, "textDirective"),
        (ConstructName::TextDirectiveLabel, "textDirectiveLabel"),
    ];

    /// The camelCase name.
    pub fn as_str(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == self)
            .map_or("", |(_, value)| value)
    }

    /// Construct entered while serializing a directive of `kind`.
    pub const fn directive(kind: DirectiveKind) -> Self {
        match kind {
            DirectiveKind::Container => ConstructName::ContainerDirective,
            DirectiveKind::Leaf => ConstructName::LeafDirective,
            DirectiveKind::Text => ConstructName::TextDirective,
        }
    }

    /// Construct entered while serializing the label of a directive of `kind`.
    pub const fn directive_label(kind: DirectiveKind) -> Self {
        match kind {
            DirectiveKind::Container => ConstructName::ContainerDirectiveLabel,
            DirectiveKind::Leaf => ConstructName::LeafDirectiveLabel,
            DirectiveKind::Text => ConstructName::TextDirectiveLabel,
        }
    }
}

impl fmt::Display for ConstructName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstructName {
    type Err = WriterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == value)
            .map(|(construct, _)| *construct)
            .ok_or_else(|| WriterError::UnknownConstruct(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for (construct, name) in ConstructName::NAMES {
            assert_eq!(construct.to_string(), name);
            assert_eq!(name.parse::<ConstructName>().unwrap(), construct);
        }
        assert!("reference".parse::<ConstructName>().is_err());
    }

    #[test]
    fn directive_constructs_match_node_names() {
        for kind in DirectiveKind::ALL {
            assert_eq!(ConstructName::directive(kind).as_str(), kind.node_kind().as_str());
            assert_eq!(
                ConstructName::directive_label(kind).as_str(),
                format!("{}Label", kind.node_kind())
            );
        }
    }
}
