//! mdast node model: the subset of block and phrasing nodes the directive
//! reader produces, plus the three directive node kinds.

use crate::attributes::Attributes;
use crate::error::DirectiveError;
use markdown::unist::Position;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three directive variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// `:::name` block wrapping flow content.
    Container,
    /// `::name` on a line of its own.
    Leaf,
    /// `:name` inside phrasing content.
    Text,
}

impl DirectiveKind {
    /// All variants, outermost first.
    pub const ALL: [DirectiveKind; 3] = [
        DirectiveKind::Container,
        DirectiveKind::Leaf,
        DirectiveKind::Text,
    ];

    /// Node kind produced for this variant.
    pub const fn node_kind(self) -> NodeKind {
        match self {
            DirectiveKind::Container => NodeKind::ContainerDirective,
            DirectiveKind::Leaf => NodeKind::LeafDirective,
            DirectiveKind::Text => NodeKind::TextDirective,
        }
    }

    /// Infix used in token names (`directiveLeafName`).
    pub const fn token_infix(self) -> &'static str {
        match self {
            DirectiveKind::Container => "Container",
            DirectiveKind::Leaf => "Leaf",
            DirectiveKind::Text => "Text",
        }
    }
}

/// Node type discriminant, named with mdast `type` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `root`
    Root,
    /// `paragraph`
    Paragraph,
    /// `heading`
    Heading,
    /// `blockquote`
    Blockquote,
    /// `code`
    Code,
    /// `thematicBreak`
    ThematicBreak,
    /// `text`
    Text,
    /// `containerDirective`
    ContainerDirective,
    /// `leafDirective`
    LeafDirective,
    /// `textDirective`
    TextDirective,
}

impl NodeKind {
    const NAMES: [(NodeKind, &'static str); 10] = [
        (NodeKind::Root, "root"),
        (NodeKind::Paragraph, "paragraph"),
        (NodeKind::Heading, "heading"),
        (NodeKind::Blockquote, "blockquote"),
        (NodeKind::Code, "code"),
        (NodeKind::ThematicBreak, "thematicBreak"),
        (NodeKind::Text, "text"),
        (NodeKind::ContainerDirective, "containerDirective"),
        (NodeKind::LeafDirective, "leafDirective"),
        (NodeKind::TextDirective, "textDirective"),
    ];

    /// The mdast `type` string.
    pub fn as_str(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or("", |(_, name)| name)
    }

    /// Directive variant, if this is a directive kind.
    pub const fn directive_kind(self) -> Option<DirectiveKind> {
        match self {
            NodeKind::ContainerDirective => Some(DirectiveKind::Container),
            NodeKind::LeafDirective => Some(DirectiveKind::Leaf),
            NodeKind::TextDirective => Some(DirectiveKind::Text),
            _ => None,
        }
    }

    /// Whether nodes of this kind are phrasing content.
    pub const fn is_phrasing(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::TextDirective)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = DirectiveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == value)
            .map(|(kind, _)| *kind)
            .ok_or_else(|| DirectiveError::UnknownNodeType(value.to_string()))
    }
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    /// Document root.
    Root(Root),
    /// Paragraph, possibly marked as a container directive label.
    Paragraph(Paragraph),
    /// ATX heading.
    Heading(Heading),
    /// Block quote.
    Blockquote(Blockquote),
    /// Fenced code.
    Code(Code),
    /// Thematic break.
    ThematicBreak(ThematicBreak),
    /// Literal text.
    Text(Text),
    /// `:::name` directive.
    ContainerDirective(Directive),
    /// `::name` directive.
    LeafDirective(Directive),
    /// `:name` directive.
    TextDirective(Directive),
}

/// Document root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Root {
    /// Flow content.
    #[serde(default)]
    pub children: Vec<Node>,
    /// Source span.
    #[serde(skip)]
    pub position: Option<Position>,
}

/// Extra data attached to a paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphData {
    /// Set when this paragraph holds the label of its parent container directive.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub directive_label: bool,
}

impl ParagraphData {
    fn is_empty(&self) -> bool {
        !self.directive_label
    }
}

/// Paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Phrasing content.
    #[serde(default)]
    pub children: Vec<Node>,
    /// Label marker.
    #[serde(default, skip_serializing_if = "ParagraphData::is_empty")]
    pub data: ParagraphData,
    /// Source span.
    #[serde(skip)]
    pub position: Option<Position>,
}

/// ATX heading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Rank, 1 through 6.
    pub depth: u8,
    /// Phrasing content.
    #[serde(default)]
    pub children: Vec<Node>,
    /// Source span.
    #[serde(skip)]
    pub position: Option<Position>,
}

/// Block quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blockquote {
    /// Flow content.
    #[serde(default)]
    pub children: Vec<Node>,
    /// Source span.
    #[serde(skip)]
    pub position: Option<Position>,
}

/// Fenced code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Code {
    /// First word of the info string.
    #[serde(default)]
    pub lang: Option<String>,
    /// Rest of the info string.
    #[serde(default)]
    pub meta: Option<String>,
    /// Content.
    #[serde(default)]
    pub value: String,
    /// Source span.
    #[serde(skip)]
    pub position: Option<Position>,
}

/// Thematic break.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThematicBreak {
    /// Source span.
    #[serde(skip)]
    pub position: Option<Position>,
}

/// Literal text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// Content.
    #[serde(default)]
    pub value: String,
    /// Source span.
    #[serde(skip)]
    pub position: Option<Position>,
}

/// Fields shared by all three directive node kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    /// Directive name, empty when absent.
    #[serde(default)]
    pub name: String,
    /// Attribute mapping.
    #[serde(default)]
    pub attributes: Attributes,
    /// Label (text/leaf) or flow content (container).
    #[serde(default)]
    pub children: Vec<Node>,
    /// Source span.
    #[serde(skip)]
    pub position: Option<Position>,
}

impl Directive {
    /// Directive with a name and nothing else.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Replace the attributes.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Replace the children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }
}

impl Node {
    /// Text node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text {
            value: value.into(),
            position: None,
        })
    }

    /// Plain paragraph.
    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph(Paragraph {
            children,
            ..Default::default()
        })
    }

    /// Paragraph marked as a container directive label.
    pub fn label(children: Vec<Node>) -> Self {
        Node::Paragraph(Paragraph {
            children,
            data: ParagraphData {
                directive_label: true,
            },
            position: None,
        })
    }

    /// Root node.
    pub fn root(children: Vec<Node>) -> Self {
        Node::Root(Root {
            children,
            position: None,
        })
    }

    /// Directive node of the given variant.
    pub fn directive(kind: DirectiveKind, directive: Directive) -> Self {
        match kind {
            DirectiveKind::Container => Node::ContainerDirective(directive),
            DirectiveKind::Leaf => Node::LeafDirective(directive),
            DirectiveKind::Text => Node::TextDirective(directive),
        }
    }

    /// Node type discriminant.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Root(_) => NodeKind::Root,
            Node::Paragraph(_) => NodeKind::Paragraph,
            Node::Heading(_) => NodeKind::Heading,
            Node::Blockquote(_) => NodeKind::Blockquote,
            Node::Code(_) => NodeKind::Code,
            Node::ThematicBreak(_) => NodeKind::ThematicBreak,
            Node::Text(_) => NodeKind::Text,
            Node::ContainerDirective(_) => NodeKind::ContainerDirective,
            Node::LeafDirective(_) => NodeKind::LeafDirective,
            Node::TextDirective(_) => NodeKind::TextDirective,
        }
    }

    /// Directive variant, if this is a directive.
    pub fn directive_kind(&self) -> Option<DirectiveKind> {
        self.kind().directive_kind()
    }

    /// Shared directive fields.
    pub fn as_directive(&self) -> Option<&Directive> {
        match self {
            Node::ContainerDirective(d) | Node::LeafDirective(d) | Node::TextDirective(d) => Some(d),
            _ => None,
        }
    }

    /// Shared directive fields, mutably.
    pub fn as_directive_mut(&mut self) -> Option<&mut Directive> {
        match self {
            Node::ContainerDirective(d) | Node::LeafDirective(d) | Node::TextDirective(d) => Some(d),
            _ => None,
        }
    }

    /// Whether this is a paragraph carrying a container label.
    pub fn is_directive_label(&self) -> bool {
        matches!(self, Node::Paragraph(p) if p.data.directive_label)
    }

    /// Children of parent nodes.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Root(n) => Some(&n.children),
            Node::Paragraph(n) => Some(&n.children),
            Node::Heading(n) => Some(&n.children),
            Node::Blockquote(n) => Some(&n.children),
            Node::ContainerDirective(d) | Node::LeafDirective(d) | Node::TextDirective(d) => {
                Some(&d.children)
            }
            Node::Code(_) | Node::ThematicBreak(_) | Node::Text(_) => None,
        }
    }

    /// Children of parent nodes, mutably.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(n) => Some(&mut n.children),
            Node::Paragraph(n) => Some(&mut n.children),
            Node::Heading(n) => Some(&mut n.children),
            Node::Blockquote(n) => Some(&mut n.children),
            Node::ContainerDirective(d) | Node::LeafDirective(d) | Node::TextDirective(d) => {
                Some(&mut d.children)
            }
            Node::Code(_) | Node::ThematicBreak(_) | Node::Text(_) => None,
        }
    }

    fn position_slot(&mut self) -> &mut Option<Position> {
        match self {
            Node::Root(n) => &mut n.position,
            Node::Paragraph(n) => &mut n.position,
            Node::Heading(n) => &mut n.position,
            Node::Blockquote(n) => &mut n.position,
            Node::Code(n) => &mut n.position,
            Node::ThematicBreak(n) => &mut n.position,
            Node::Text(n) => &mut n.position,
            Node::ContainerDirective(d) | Node::LeafDirective(d) | Node::TextDirective(d) => {
                &mut d.position
            }
        }
    }

    /// Source span, when the node came from a parse.
    pub fn position(&self) -> Option<&Position> {
        match self {
            Node::Root(n) => n.position.as_ref(),
            Node::Paragraph(n) => n.position.as_ref(),
            Node::Heading(n) => n.position.as_ref(),
            Node::Blockquote(n) => n.position.as_ref(),
            Node::Code(n) => n.position.as_ref(),
            Node::ThematicBreak(n) => n.position.as_ref(),
            Node::Text(n) => n.position.as_ref(),
            Node::ContainerDirective(d) | Node::LeafDirective(d) | Node::TextDirective(d) => {
                d.position.as_ref()
            }
        }
    }

    /// Replace the source span.
    pub fn set_position(&mut self, position: Option<Position>) {
        *self.position_slot() = position;
    }

    /// Drop source spans from this node and all descendants.
    pub fn remove_position(&mut self) {
        self.set_position(None);
        if let Some(children) = self.children_mut() {
            children.iter_mut().for_each(Node::remove_position);
        }
    }

    /// Concatenated text content of this node and its descendants.
    pub fn to_text(&self) -> String {
        let mut buffer = String::new();
        self.collect_text(&mut buffer);
        buffer
    }

    /// Read a tree from mdast JSON.
    pub fn from_json(json: &str) -> Result<Self, DirectiveError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write this tree as mdast JSON, without positions.
    pub fn to_json(&self) -> Result<String, DirectiveError> {
        Ok(serde_json::to_string(self)?)
    }

    fn collect_text(&self, buffer: &mut String) {
        match self {
            Node::Text(text) => buffer.push_str(&text.value),
            Node::Code(code) => buffer.push_str(&code.value),
            _ => {
                for child in self.children().unwrap_or_default() {
                    child.collect_text(buffer);
                }
            }
        }
    }
}
