//! Writer extension for directive nodes.

use crate::construct::ConstructName;
use crate::container::{container_flow, container_phrasing};
use crate::error::WriterError;
use crate::state::{Handler, Info, State, ToMarkdownExtension};
use crate::unsafe_pattern::Unsafe;
use mdirective_core::attributes::encode;
use mdirective_core::{DirectiveKind, Node, NodeKind, fence};

/// Handlers for the three directive nodes plus the escapes that keep
/// literal colons from starting one.
pub fn directive_to_markdown() -> ToMarkdownExtension {
    use ConstructName::{ContainerDirectiveLabel, LeafDirectiveLabel, Phrasing};

    let handler = Handler::with_peek(handle_directive, peek_directive);
    ToMarkdownExtension {
        handlers: DirectiveKind::ALL
            .into_iter()
            .map(|kind| (kind.node_kind(), handler))
            .collect(),
        unsafe_patterns: vec![
            Unsafe::new('\r').in_construct(&[LeafDirectiveLabel, ContainerDirectiveLabel]),
            Unsafe::new('\n').in_construct(&[LeafDirectiveLabel, ContainerDirectiveLabel]),
            Unsafe::new(':').before("[^:]").after("[A-Za-z]").in_construct(&[Phrasing]),
            Unsafe::new(':').after(":").at_break(),
            Unsafe::new(':').after("[A-Za-z]").after_escaped().in_construct(&[Phrasing]),
            Unsafe::new(':').after_sibling(NodeKind::TextDirective),
            Unsafe::new('{').after_sibling(NodeKind::TextDirective),
            Unsafe::new(':').before_sibling(NodeKind::TextDirective),
        ],
    }
}

fn handle_directive(
    node: &Node,
    _: Option<&Node>,
    state: &mut State,
    _info: &Info,
) -> Result<String, WriterError> {
    let Some(kind) = node.directive_kind() else {
        return Ok(String::new());
    };
    state.enter(ConstructName::directive(kind));
    let value = write_directive(node, kind, state);
    state.exit();
    value
}

fn write_directive(node: &Node, kind: DirectiveKind, state: &mut State) -> Result<String, WriterError> {
    let Some(directive) = node.as_directive() else {
        return Ok(String::new());
    };
    let sequence = fence(node);
    let mut value = format!("{sequence}{}", directive.name);

    let head = directive.children.first().filter(|head| head.is_directive_label());
    let label = match kind {
        DirectiveKind::Container => head,
        DirectiveKind::Leaf | DirectiveKind::Text => Some(node),
    };
    if let Some(label) = label {
        state.enter(ConstructName::Label);
        state.enter(ConstructName::directive_label(kind));
        state.enter(ConstructName::Phrasing);
        let content = container_phrasing(state, label, &Info::new("[", "]"));
        state.exit();
        state.exit();
        state.exit();
        let content = content?;
        if !content.is_empty() {
            value.push('[');
            value.push_str(&content);
            value.push(']');
        }
    }

    value.push_str(&encode(&directive.attributes, state.quote()));

    if kind == DirectiveKind::Container {
        let content = match head {
            Some(_) => &directive.children[1..],
            None => &directive.children[..],
        };
        if !content.is_empty() {
            value.push('\n');
            value.push_str(&container_flow(state, node, content, &Info::new("\n", "\n"))?);
        }
        value.push('\n');
        value.push_str(&sequence);
    }

    Ok(value)
}

fn peek_directive(_: &Node, _: Option<&Node>, _: &State, _: &Info) -> String {
    ":".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Options;
    use mdirective_core::Directive;
    use pretty_assertions::assert_eq;

    fn render(node: &Node) -> String {
        let mut state = State::new(&Options::default(), &[directive_to_markdown()]).unwrap();
        state.handle(node, None, &Info::new("\n", "\n")).unwrap()
    }

    #[test]
    fn text_directive_with_label() {
        let node = Node::TextDirective(Directive::new("a").with_children(vec![Node::text("b")]));
        assert_eq!(render(&node), ":a[b]");
    }

    #[test]
    fn empty_label_writes_no_brackets() {
        let node = Node::LeafDirective(Directive::new("a"));
        assert_eq!(render(&node), "::a");
        let blank = Node::TextDirective(Directive::new("a").with_children(vec![Node::text("")]));
        assert_eq!(render(&blank), ":a");
        let container = Node::ContainerDirective(
            Directive::new("a").with_children(vec![Node::label(vec![])]),
        );
        assert_eq!(render(&container), ":::a\n:::");
    }

    #[test]
    fn brackets_in_labels_are_escaped() {
        let node = Node::LeafDirective(Directive::new("a").with_children(vec![Node::text("b]c[d")]));
        assert_eq!(render(&node), r"::a[b\]c\[d]");
    }

    #[test]
    fn label_text_sees_the_opening_bracket() {
        let node = Node::LeafDirective(Directive::new("").with_children(vec![Node::text(":b")]));
        assert_eq!(render(&node), r"::[\:b]");
    }

    #[test]
    fn line_endings_in_leaf_labels_are_encoded() {
        let node = Node::LeafDirective(Directive::new("a").with_children(vec![Node::text("b\nc")]));
        assert_eq!(render(&node), "::a[b&#xA;c]");
    }

    #[test]
    fn label_child_is_not_rendered_as_content() {
        let container = Node::ContainerDirective(Directive::new("a").with_children(vec![
            Node::label(vec![Node::text("b")]),
            Node::paragraph(vec![Node::text("c")]),
        ]));
        assert_eq!(render(&container), ":::a[b]\nc\n:::");
    }

    #[test]
    fn peek_is_a_colon() {
        let state = State::new(&Options::default(), &[directive_to_markdown()]).unwrap();
        let node = Node::TextDirective(Directive::new("a"));
        assert_eq!(peek_directive(&node, None, &state, &Info::default()), ":");
    }
}
