//! Colon fence sizing for serialized directives.

use crate::mdast::{DirectiveKind, Node};

/// Number of colons that open (and, for containers, close) `node`.
///
/// Text directives use one colon and leaf directives two. A container
/// uses three plus the deepest nesting of container directives inside it,
/// so every inner fence is strictly shorter than the one around it. Nesting
/// counts container ancestors including `node` itself and looks through
/// other parents such as block quotes. Non-directive nodes have no fence.
pub fn fence_size(node: &Node) -> usize {
    match node.directive_kind() {
        Some(DirectiveKind::Text) => 1,
        Some(DirectiveKind::Leaf) => 2,
        Some(DirectiveKind::Container) => 3 + deepest_nesting(node, 0),
        None => 0,
    }
}

/// The colon run for `node`.
pub fn fence(node: &Node) -> String {
    ":".repeat(fence_size(node))
}

fn deepest_nesting(node: &Node, containers_above: usize) -> usize {
    let is_container = node.directive_kind() == Some(DirectiveKind::Container);
    let mut deepest = if is_container { containers_above } else { 0 };
    let above = containers_above + usize::from(is_container);
    for child in node.children().unwrap_or_default() {
        deepest = deepest.max(deepest_nesting(child, above));
    }
    deepest
}
