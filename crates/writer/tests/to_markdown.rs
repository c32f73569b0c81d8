use mdirective_core::attributes::Attributes;
use mdirective_core::mdast::{Blockquote, Heading};
use mdirective_core::{Directive, Node};
use mdirective_writer::{Options, WriterError, directive_to_markdown, to_markdown};
use pretty_assertions::assert_eq;

fn serialize(node: &Node) -> String {
    to_markdown(node, &Options::default(), &[directive_to_markdown()]).expect("serialize should succeed")
}

fn container(name: &str, children: Vec<Node>) -> Node {
    Node::ContainerDirective(Directive::new(name).with_children(children))
}

fn paragraph(value: &str) -> Node {
    Node::paragraph(vec![Node::text(value)])
}

fn attributes() -> Attributes {
    [("id", "b"), ("class", "c d"), ("key", "e\nf")].into_iter().collect()
}

#[test]
fn container_without_name_or_children() {
    assert_eq!(serialize(&Node::ContainerDirective(Directive::default())), ":::\n:::\n");
    assert_eq!(serialize(&container("a", vec![])), ":::a\n:::\n");
}

#[test]
fn container_with_flow_children() {
    assert_eq!(serialize(&container("a", vec![paragraph("b")])), ":::a\nb\n:::\n");
    let heading = Node::Heading(Heading {
        depth: 1,
        children: vec![Node::text("b")],
        position: None,
    });
    assert_eq!(serialize(&container("a", vec![heading])), ":::a\n# b\n:::\n");
    assert_eq!(serialize(&container("a", vec![paragraph("b\nc")])), ":::a\nb\nc\n:::\n");
}

#[test]
fn attributes_use_shortcuts_and_encode_line_endings() {
    let node = Node::ContainerDirective(Directive::new("a").with_attributes(attributes()));
    assert_eq!(serialize(&node), ":::a{#b .c.d key=\"e&#xA;f\"}\n:::\n");

    let leaf = Node::LeafDirective(Directive::new("a").with_attributes(attributes()));
    assert_eq!(serialize(&leaf), "::a{#b .c.d key=\"e&#xA;f\"}\n");
}

#[test]
fn single_quotes_are_configurable() {
    let leaf = Node::LeafDirective(
        Directive::new("a").with_attributes([("title", "it's")].into_iter().collect()),
    );
    let options = Options { quote: "'".into() };
    let value = to_markdown(&leaf, &options, &[directive_to_markdown()]).unwrap();
    assert_eq!(value, "::a{title='it&#x27;s'}\n");
}

#[test]
fn invalid_quote_is_rejected() {
    let options = Options { quote: "`".into() };
    let error = to_markdown(&Node::root(vec![]), &options, &[directive_to_markdown()]).unwrap_err();
    assert!(matches!(error, WriterError::InvalidQuote(_)));
}

#[test]
fn label_paragraph_becomes_the_bracketed_label() {
    let node = container("a", vec![Node::label(vec![Node::text("b")])]);
    assert_eq!(serialize(&node), ":::a[b]\n:::\n");
}

#[test]
fn outer_containers_get_longer_fences() {
    let nested = container("a", vec![container("b", vec![paragraph("c")])]);
    insta::assert_snapshot!(serialize(&nested), @r"
    ::::a
    :::b
    c
    :::
    ::::
    ");

    let siblings = container(
        "a",
        vec![container("b", vec![paragraph("c")]), container("d", vec![paragraph("e")])],
    );
    insta::assert_snapshot!(serialize(&siblings), @r"
    ::::a
    :::b
    c
    :::

    :::d
    e
    :::
    ::::
    ");

    let deep = container("a", vec![container("b", vec![container("c", vec![paragraph("d")])])]);
    insta::assert_snapshot!(serialize(&deep), @r"
    :::::a
    ::::b
    :::c
    d
    :::
    ::::
    :::::
    ");
}

#[test]
fn nesting_counts_through_block_quotes() {
    let node = container(
        "a",
        vec![Node::Blockquote(Blockquote {
            children: vec![container("b", vec![paragraph("c")])],
            position: None,
        })],
    );
    insta::assert_snapshot!(serialize(&node), @r"
    ::::a
    > :::b
    > c
    > :::
    ::::
    ");
}

#[test]
fn colons_in_phrasing() {
    let cases = [
        ("a:b", "a\\:b\n"),
        ("a:9", "a:9\n"),
        ("a::c", "a::c\n"),
        (":\na", ":\na\n"),
        (":a", "\\:a\n"),
        ("::\na", "\\::\na\n"),
        (":::\na", "\\:::\na\n"),
    ];
    for (value, expected) in cases {
        assert_eq!(serialize(&paragraph(value)), expected, "serializing {value:?}");
    }
}

#[test]
fn text_after_a_text_directive_cannot_extend_it() {
    let node = Node::paragraph(vec![
        Node::TextDirective(Directive::new("a")),
        Node::text("{b}"),
    ]);
    assert_eq!(serialize(&node), ":a\\{b}\n");

    let node = Node::paragraph(vec![
        Node::text("x "),
        Node::TextDirective(Directive::new("a").with_children(vec![Node::text("b")])),
        Node::text(":c"),
    ]);
    assert_eq!(serialize(&node), "x :a[b]\\:c\n");
}

#[test]
fn colon_before_a_text_directive_is_escaped() {
    let node = Node::paragraph(vec![Node::text("a:"), Node::TextDirective(Directive::new("b"))]);
    assert_eq!(serialize(&node), "a\\::b\n");

    let node = Node::paragraph(vec![Node::text("a:"), Node::text(" b")]);
    assert_eq!(serialize(&node), "a: b\n");
}

#[test]
fn escaped_colon_does_not_open_a_directive_after_it() {
    assert_eq!(serialize(&paragraph("a\n::b")), "a\n\\:\\:b\n");

    let node = Node::paragraph(vec![Node::TextDirective(Directive::new("a")), Node::text("::b")]);
    assert_eq!(serialize(&node), ":a\\:\\:b\n");
}

#[test]
fn text_directives_sit_inside_phrasing() {
    let node = Node::paragraph(vec![
        Node::text("a "),
        Node::TextDirective(
            Directive::new("b")
                .with_attributes([("d", "")].into_iter().collect())
                .with_children(vec![Node::text("c")]),
        ),
        Node::text(" e."),
    ]);
    assert_eq!(serialize(&node), "a :b[c]{d} e.\n");
}

#[test]
fn root_of_phrasing_is_written_inline() {
    let root = Node::root(vec![Node::text("a "), Node::TextDirective(Directive::new("b"))]);
    assert_eq!(serialize(&root), "a :b\n");
}

#[test]
fn directives_without_the_extension_have_no_handler() {
    let error = to_markdown(&container("a", vec![]), &Options::default(), &[]).unwrap_err();
    assert!(matches!(error, WriterError::MissingHandler(kind) if kind == "containerDirective"));
}

#[test]
fn empty_root_writes_nothing() {
    assert_eq!(serialize(&Node::root(vec![])), "");
}
