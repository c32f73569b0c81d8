//! Handlers that turn directive tokens into directive nodes.

use super::compile::{CompileContext, FromMarkdownExtension, Handle};
use crate::attributes::AttributeAccumulator;
use crate::entity::decode_light;
use crate::error::DirectiveError;
use crate::mdast::{Directive, DirectiveKind, Node, NodeKind};
use crate::syntax::{DirectivePart, Token, TokenKind};

/// Reader extension for the three directive constructs.
pub fn directive_from_markdown() -> FromMarkdownExtension {
    let mut enter: Vec<(TokenKind, Handle)> = Vec::new();
    let mut exit: Vec<(TokenKind, Handle)> = Vec::new();

    for kind in DirectiveKind::ALL {
        let token = |part| TokenKind::Directive(kind, part);
        let enter_whole: Handle = match kind {
            DirectiveKind::Container => enter_container,
            DirectiveKind::Leaf => enter_leaf,
            DirectiveKind::Text => enter_text,
        };
        enter.push((token(DirectivePart::Whole), enter_whole));
        enter.push((token(DirectivePart::Attributes), enter_attributes));

        let exits: [(DirectivePart, Handle); 7] = [
            (DirectivePart::Whole, exit_directive),
            (DirectivePart::Name, exit_name),
            (DirectivePart::Attributes, exit_attributes),
            (DirectivePart::AttributeIdValue, exit_attribute_id_value),
            (DirectivePart::AttributeClassValue, exit_attribute_class_value),
            (DirectivePart::AttributeName, exit_attribute_name),
            (DirectivePart::AttributeValue, exit_attribute_value),
        ];
        exit.extend(exits.into_iter().map(|(part, handle)| (token(part), handle)));
    }

    // Only containers wrap their label in a paragraph; text and leaf labels
    // land directly in the directive's children.
    let label = TokenKind::Directive(DirectiveKind::Container, DirectivePart::Label);
    enter.push((label, enter_container_label));
    exit.push((label, exit_container_label));

    FromMarkdownExtension {
        can_contain_eols: vec![NodeKind::TextDirective],
        enter,
        exit,
    }
}

fn enter_directive(context: &mut CompileContext<'_>, kind: DirectiveKind, token: &Token) -> Result<(), DirectiveError> {
    context.enter(Node::directive(kind, Directive::default()), token);
    Ok(())
}

fn enter_container(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    enter_directive(context, DirectiveKind::Container, token)
}

fn enter_leaf(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    enter_directive(context, DirectiveKind::Leaf, token)
}

fn enter_text(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    enter_directive(context, DirectiveKind::Text, token)
}

fn enter_container_label(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    context.enter(Node::label(Vec::new()), token);
    Ok(())
}

fn exit_container_label(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    let label = context.exit_detached(token)?;
    if label.children().is_none_or(<[Node]>::is_empty) {
        log::debug!(
            "dropping empty container label at {}:{}",
            token.start.line,
            token.start.column
        );
        return Ok(());
    }
    context.append(label)
}

fn enter_attributes(context: &mut CompileContext<'_>, _token: &Token) -> Result<(), DirectiveError> {
    context.data.directive_attributes = Some(AttributeAccumulator::default());
    // Attribute text is read from token slices, not from child nodes.
    context.buffer();
    Ok(())
}

fn push_attribute(context: &mut CompileContext<'_>, key: &str, value: String) {
    if let Some(accumulator) = context.data.directive_attributes.as_mut() {
        accumulator.push(key, value);
    }
}

fn exit_attribute_id_value(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    let value = decode_light(&context.slice_serialize(token));
    push_attribute(context, "id", value);
    Ok(())
}

fn exit_attribute_class_value(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    let value = decode_light(&context.slice_serialize(token));
    push_attribute(context, "class", value);
    Ok(())
}

fn exit_attribute_name(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    // Names cannot contain `&`, so there is nothing to decode.
    let name = context.slice_serialize(token);
    push_attribute(context, &name, String::new());
    Ok(())
}

fn exit_attribute_value(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    let value = decode_light(&context.slice_serialize(token));
    if let Some(accumulator) = context.data.directive_attributes.as_mut() {
        accumulator.set_last_value(value);
    }
    Ok(())
}

fn exit_attributes(context: &mut CompileContext<'_>, _token: &Token) -> Result<(), DirectiveError> {
    let attributes = context
        .data
        .directive_attributes
        .take()
        .unwrap_or_default()
        .finish();
    context.resume()?;
    if let Some(directive) = context.current_mut().and_then(Node::as_directive_mut) {
        directive.attributes = attributes;
    }
    Ok(())
}

fn exit_name(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    let name = context.slice_serialize(token);
    if let Some(directive) = context.current_mut().and_then(Node::as_directive_mut) {
        directive.name = name;
    }
    Ok(())
}

fn exit_directive(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    context.exit(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;
    use crate::from_markdown::Compiler;
    use crate::syntax::{EventKind, tokenize};
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Node {
        let document = tokenize(source, true);
        let mut tree = Compiler::new()
            .with_extension(directive_from_markdown())
            .compile(source, &document)
            .unwrap();
        tree.remove_position();
        tree
    }

    fn attributes(pairs: &[(&str, &str)]) -> Attributes {
        pairs.iter().copied().collect()
    }

    #[test]
    fn class_values_merge_and_other_keys_overwrite() {
        assert_eq!(
            parse("::a{.b class=\"c\" .d e=1 e=2}"),
            Node::root(vec![Node::LeafDirective(
                Directive::new("a").with_attributes(attributes(&[("class", "b c d"), ("e", "2")]))
            )])
        );
    }

    #[test]
    fn attribute_values_decode_references() {
        assert_eq!(
            parse("::a{#&amp;x b=\"&#x22;\" c=&unknown;}"),
            Node::root(vec![Node::LeafDirective(Directive::new("a").with_attributes(
                attributes(&[("id", "&x"), ("b", "\""), ("c", "&unknown;")])
            ))])
        );
    }

    #[test]
    fn text_directive_label_and_attributes_span_lines() {
        assert_eq!(
            parse(":a[b\nc]{d=\"e\nf\"}"),
            Node::root(vec![Node::paragraph(vec![Node::TextDirective(
                Directive::new("a")
                    .with_attributes(attributes(&[("d", "e\nf")]))
                    .with_children(vec![Node::text("b\nc")])
            )])])
        );
    }

    #[test]
    fn empty_container_label_is_dropped() {
        assert_eq!(
            parse(":::a[]\n:::"),
            Node::root(vec![Node::ContainerDirective(Directive::new("a"))])
        );
    }

    #[test]
    fn string_keys_resolve_to_handlers() {
        let extension = directive_from_markdown();
        assert!(extension.handler_for(EventKind::Exit, "directiveLeafName").unwrap().is_some());
        assert!(extension.handler_for(EventKind::Enter, "directiveLeafName").unwrap().is_none());
        assert!(extension.handler_for(EventKind::Enter, "directiveBlock").is_err());
    }
}
