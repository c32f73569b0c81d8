//! Handlers for the plain markdown nodes.

use crate::construct::ConstructName;
use crate::container::{container_flow, container_phrasing};
use crate::error::WriterError;
use crate::state::{Handler, Info, State};
use mdirective_core::{Node, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_ENDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n|\r").expect("valid regex"));

/// Handlers registered on every [`State`].
pub(crate) fn base_handlers() -> Vec<(NodeKind, Handler)> {
    vec![
        (NodeKind::Root, Handler::new(root)),
        (NodeKind::Paragraph, Handler::new(paragraph)),
        (NodeKind::Heading, Handler::new(heading)),
        (NodeKind::Blockquote, Handler::new(blockquote)),
        (NodeKind::Code, Handler::new(code)),
        (NodeKind::ThematicBreak, Handler::new(thematic_break)),
        (NodeKind::Text, Handler::new(text)),
    ]
}

fn root(node: &Node, _: Option<&Node>, state: &mut State, info: &Info) -> Result<String, WriterError> {
    let children = node.children().unwrap_or_default();
    if children.iter().any(|child| child.kind().is_phrasing()) {
        container_phrasing(state, node, info)
    } else {
        container_flow(state, node, children, info)
    }
}

fn paragraph(node: &Node, _: Option<&Node>, state: &mut State, info: &Info) -> Result<String, WriterError> {
    state.enter(ConstructName::Paragraph);
    state.enter(ConstructName::Phrasing);
    let value = container_phrasing(state, node, info);
    state.exit();
    state.exit();
    value
}

fn heading(node: &Node, _: Option<&Node>, state: &mut State, _info: &Info) -> Result<String, WriterError> {
    let Node::Heading(heading) = node else {
        return Ok(String::new());
    };
    let sequence = "#".repeat(usize::from(heading.depth.clamp(1, 6)));

    state.enter(ConstructName::HeadingAtx);
    state.enter(ConstructName::Phrasing);
    let value = container_phrasing(state, node, &Info::new("# ", "\n"));
    state.exit();
    state.exit();
    let mut value = value?;

    if let Some(first) = value.chars().next().filter(|c| matches!(*c, ' ' | '\t')) {
        value.replace_range(..first.len_utf8(), &format!("&#x{:X};", u32::from(first)));
    }
    Ok(if value.is_empty() {
        sequence
    } else {
        format!("{sequence} {value}")
    })
}

fn blockquote(node: &Node, _: Option<&Node>, state: &mut State, info: &Info) -> Result<String, WriterError> {
    state.enter(ConstructName::Blockquote);
    let value = container_flow(state, node, node.children().unwrap_or_default(), info);
    state.exit();
    Ok(indent_lines(&value?, |line, blank| {
        if blank {
            format!(">{line}")
        } else {
            format!("> {line}")
        }
    }))
}

fn code(node: &Node, _: Option<&Node>, state: &mut State, _info: &Info) -> Result<String, WriterError> {
    let Node::Code(code) = node else {
        return Ok(String::new());
    };
    let sequence = "`".repeat((longest_streak(&code.value, '`') + 1).max(3));

    state.enter(ConstructName::CodeFenced);
    let mut value = sequence.clone();
    if let Some(lang) = &code.lang {
        value.push_str(lang);
        if let Some(meta) = &code.meta {
            value.push(' ');
            value.push_str(meta);
        }
    }
    value.push('\n');
    if !code.value.is_empty() {
        value.push_str(&code.value);
        value.push('\n');
    }
    value.push_str(&sequence);
    state.exit();
    Ok(value)
}

fn thematic_break(_: &Node, _: Option<&Node>, _: &mut State, _: &Info) -> Result<String, WriterError> {
    Ok("***".to_string())
}

fn text(node: &Node, _: Option<&Node>, state: &mut State, info: &Info) -> Result<String, WriterError> {
    match node {
        Node::Text(text) => Ok(state.safe(&text.value, info)),
        _ => Ok(String::new()),
    }
}

/// Apply `map` to every line of `value`, keeping the line endings. `map`
/// also learns whether the line is empty.
pub fn indent_lines(value: &str, map: impl Fn(&str, bool) -> String) -> String {
    let mut result = String::with_capacity(value.len());
    let mut start = 0;
    for line_ending in LINE_ENDING.find_iter(value) {
        let line = &value[start..line_ending.start()];
        result.push_str(&map(line, line.is_empty()));
        result.push_str(line_ending.as_str());
        start = line_ending.end();
    }
    let line = &value[start..];
    result.push_str(&map(line, line.is_empty()));
    result
}

fn longest_streak(value: &str, character: char) -> usize {
    value
        .split(|c: char| c != character)
        .map(|run| run.chars().count())
        .max()
        .unwrap_or(0)
}
