//! Serialization of child lists: blocks separated by blank lines, and
//! phrasing runs that thread their neighbours' characters through `safe`.

use crate::error::WriterError;
use crate::state::{Info, State};
use mdirective_core::Node;

/// Serialize `children` of `parent` as flow content, one blank line apart.
pub fn container_flow(
    state: &mut State,
    parent: &Node,
    children: &[Node],
    _info: &Info,
) -> Result<String, WriterError> {
    let mut results = Vec::with_capacity(children.len());
    for child in children {
        results.push(state.handle(child, Some(parent), &Info::new("\n", "\n"))?);
    }
    Ok(results.join("\n\n"))
}

/// Serialize the children of `parent` as phrasing content.
///
/// Each child sees the last character written before it and the first
/// character its next sibling will write.
pub fn container_phrasing(state: &mut State, parent: &Node, info: &Info) -> Result<String, WriterError> {
    let children = parent.children().unwrap_or_default();
    let mut result = String::new();
    let mut before = info.before.clone();

    for (index, child) in children.iter().enumerate() {
        let after = match children.get(index + 1) {
            Some(next) => first_char(&state.peek(next, Some(parent), &Info::new("", ""))?),
            None => info.after.clone(),
        };
        let child_info = Info {
            before,
            after,
            previous: index.checked_sub(1).map(|previous| children[previous].kind()),
            next: children.get(index + 1).map(Node::kind),
        };
        let value = state.handle(child, Some(parent), &child_info)?;
        before = last_char(&value);
        result.push_str(&value);
    }

    Ok(result)
}

fn first_char(value: &str) -> String {
    value.chars().next().map(String::from).unwrap_or_default()
}

fn last_char(value: &str) -> String {
    value.chars().next_back().map(String::from).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructName;
    use crate::state::Options;
    use pretty_assertions::assert_eq;

    #[test]
    fn flow_children_are_separated_by_blank_lines() {
        let mut state = State::new(&Options::default(), &[]).unwrap();
        let root = Node::root(vec![
            Node::paragraph(vec![Node::text("a")]),
            Node::paragraph(vec![Node::text("b")]),
        ]);
        let children = root.children().unwrap();
        let value = container_flow(&mut state, &root, children, &Info::default()).unwrap();
        assert_eq!(value, "a\n\nb");
    }

    #[test]
    fn phrasing_sees_its_neighbours() {
        let mut state = State::new(&Options::default(), &[]).unwrap();
        state.enter(ConstructName::Phrasing);
        let paragraph = Node::paragraph(vec![Node::text("a "), Node::text(" b")]);
        let value = container_phrasing(&mut state, &paragraph, &Info::new("\n", "\n")).unwrap();
        assert_eq!(value, "a  b");
    }

    #[test]
    fn trailing_space_before_the_line_end_is_encoded() {
        let mut state = State::new(&Options::default(), &[]).unwrap();
        state.enter(ConstructName::Phrasing);
        let paragraph = Node::paragraph(vec![Node::text("a"), Node::text("b ")]);
        let value = container_phrasing(&mut state, &paragraph, &Info::new("\n", "\n")).unwrap();
        assert_eq!(value, "ab&#x20;");
    }
}
