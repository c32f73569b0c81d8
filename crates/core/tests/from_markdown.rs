use markdown::unist::Position;
use mdirective_core::attributes::Attributes;
use mdirective_core::mdast::{Blockquote, Code};
use mdirective_core::{Directive, Node, ParseOptions, parse_mdast};
use pretty_assertions::assert_eq;

fn parse(source: &str) -> Node {
    parse_mdast(source, &ParseOptions::default()).expect("parse should succeed")
}

fn parse_without_positions(source: &str) -> Node {
    let mut tree = parse(source);
    tree.remove_position();
    tree
}

fn first_child(node: &Node) -> &Node {
    &node.children().expect("node has children")[0]
}

fn bare(pairs: &[&str]) -> Attributes {
    pairs.iter().map(|key| (*key, "")).collect()
}

#[test]
fn container_with_label_attributes_and_content() {
    let tree = parse(":::a[b]{c}\nd");
    let container = first_child(&tree);

    let mut expected = Node::ContainerDirective(
        Directive::new("a")
            .with_attributes(bare(&["c"]))
            .with_children(vec![
                Node::label(vec![Node::text("b")]),
                Node::paragraph(vec![Node::text("d")]),
            ]),
    );
    let mut actual = container.clone();
    actual.remove_position();
    expected.remove_position();
    assert_eq!(actual, expected);

    let children = container.children().unwrap();
    assert_eq!(container.position(), Some(&Position::new(1, 1, 0, 2, 2, 12)));
    assert_eq!(children[0].position(), Some(&Position::new(1, 5, 4, 1, 8, 7)));
    assert_eq!(first_child(&children[0]).position(), Some(&Position::new(1, 6, 5, 1, 7, 6)));
    assert_eq!(children[1].position(), Some(&Position::new(2, 1, 11, 2, 2, 12)));
    assert_eq!(first_child(&children[1]).position(), Some(&Position::new(2, 1, 11, 2, 2, 12)));
}

#[test]
fn leaf_with_label_and_attributes() {
    let tree = parse("::a[b]{c}");
    let leaf = first_child(&tree);
    assert_eq!(leaf.position(), Some(&Position::new(1, 1, 0, 1, 10, 9)));
    assert_eq!(first_child(leaf).position(), Some(&Position::new(1, 5, 4, 1, 6, 5)));

    assert_eq!(
        parse_without_positions("::a[b]{c}"),
        Node::root(vec![Node::LeafDirective(
            Directive::new("a")
                .with_attributes(bare(&["c"]))
                .with_children(vec![Node::text("b")])
        )])
    );
}

#[test]
fn text_directive_inside_a_paragraph() {
    let tree = parse("a :b[c]{d} e.");
    let paragraph = first_child(&tree);
    let children = paragraph.children().unwrap();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0].position(), Some(&Position::new(1, 1, 0, 1, 3, 2)));
    assert_eq!(children[1].position(), Some(&Position::new(1, 3, 2, 1, 11, 10)));
    assert_eq!(children[2].position(), Some(&Position::new(1, 11, 10, 1, 14, 13)));

    assert_eq!(
        parse_without_positions("a :b[c]{d} e."),
        Node::root(vec![Node::paragraph(vec![
            Node::text("a "),
            Node::TextDirective(
                Directive::new("b")
                    .with_attributes(bare(&["d"]))
                    .with_children(vec![Node::text("c")])
            ),
            Node::text(" e."),
        ])])
    );
}

#[test]
fn directives_in_directives() {
    assert_eq!(
        parse_without_positions("::::a\n:::b\n:::\n::::"),
        Node::root(vec![Node::ContainerDirective(
            Directive::new("a").with_children(vec![Node::ContainerDirective(Directive::new("b"))])
        )])
    );
}

#[test]
fn container_inside_block_quote() {
    assert_eq!(
        parse_without_positions("> :::a\n> b\n> :::"),
        Node::root(vec![Node::Blockquote(Blockquote {
            children: vec![Node::ContainerDirective(
                Directive::new("a").with_children(vec![Node::paragraph(vec![Node::text("b")])])
            )],
            position: None,
        })])
    );
}

#[test]
fn closing_fence_ends_code_inside_container() {
    assert_eq!(
        parse_without_positions(":::a\n```\nb\n:::\nc"),
        Node::root(vec![
            Node::ContainerDirective(Directive::new("a").with_children(vec![Node::Code(Code {
                value: "b".into(),
                ..Default::default()
            })])),
            Node::paragraph(vec![Node::text("c")]),
        ])
    );
}

#[test]
fn colons_that_are_not_directives_stay_text() {
    for source in ["a:9", "a::c", r"\:a", "::", ":::"] {
        let tree = parse_without_positions(source);
        let paragraph = first_child(&tree);
        assert!(
            matches!(paragraph, Node::Paragraph(_)),
            "{source} should be a paragraph"
        );
        assert!(
            paragraph.children().unwrap().iter().all(|child| matches!(child, Node::Text(_))),
            "{source} should hold only text"
        );
    }
}

#[test]
fn invalid_attributes_end_a_text_directive_early() {
    assert_eq!(
        parse_without_positions(":a{b=\"c}"),
        Node::root(vec![Node::paragraph(vec![
            Node::TextDirective(Directive::new("a")),
            Node::text("{b=\"c}"),
        ])])
    );
}

#[test]
fn invalid_leaf_line_is_a_paragraph() {
    assert_eq!(
        parse_without_positions("::a{b=\"c}"),
        Node::root(vec![Node::paragraph(vec![Node::text("::a{b=\"c}")])])
    );
}

#[test]
fn plain_paragraph_positions_match_markdown_rs() {
    let source = "a\n  b\n\nc";
    let reference = markdown::to_mdast(source, &markdown::ParseOptions::default()).unwrap();
    let ours = parse(source);
    let reference_children = reference.children().unwrap();
    let our_children = ours.children().unwrap();
    assert_eq!(our_children.len(), reference_children.len());
    for (ours, theirs) in our_children.iter().zip(reference_children) {
        assert_eq!(ours.position(), theirs.position());
        assert_eq!(ours.to_text(), theirs.to_string());
    }
    assert_eq!(ours.position(), reference.position());
}

#[test]
fn directives_off_reads_plain_text() {
    let mut tree = parse_mdast("::a", &ParseOptions::markdown()).unwrap();
    tree.remove_position();
    assert_eq!(tree, Node::root(vec![Node::paragraph(vec![Node::text("::a")])]));
}

#[test]
fn leaf_directive_serializes_to_mdast_json() {
    let tree = parse_without_positions("::a[b]{c}");
    let json = serde_json::to_string_pretty(&tree).unwrap();
    insta::assert_snapshot!(json, @r#"
    {
      "type": "root",
      "children": [
        {
          "type": "leafDirective",
          "name": "a",
          "attributes": {
            "c": ""
          },
          "children": [
            {
              "type": "text",
              "value": "b"
            }
          ]
        }
      ]
    }
    "#);
}
