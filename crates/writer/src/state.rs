//! Serializer state: construct stack, handler table, unsafe patterns, and
//! options.

use crate::construct::ConstructName;
use crate::error::WriterError;
use crate::unsafe_pattern::{CompiledUnsafe, Unsafe, safe};
use mdirective_core::{Node, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Renders a node. Receives the node, its parent, the state, and what
/// surrounds the node's output.
pub type HandleFn = fn(&Node, Option<&Node>, &mut State, &Info) -> Result<String, WriterError>;

/// Returns the first character(s) a handler would produce, without
/// rendering the node.
pub type PeekFn = fn(&Node, Option<&Node>, &State, &Info) -> String;

/// A node handler.
#[derive(Debug, Clone, Copy)]
pub struct Handler {
    /// Renders the node.
    pub handle: HandleFn,
    /// Cheap look at the start of the output.
    pub peek: Option<PeekFn>,
}

impl Handler {
    /// Handler without a peek.
    pub fn new(handle: HandleFn) -> Self {
        Self { handle, peek: None }
    }

    /// Handler with a peek.
    pub fn with_peek(handle: HandleFn, peek: PeekFn) -> Self {
        Self {
            handle,
            peek: Some(peek),
        }
    }
}

/// Handlers and unsafe patterns contributed by one syntax extension.
#[derive(Debug, Clone, Default)]
pub struct ToMarkdownExtension {
    /// Node handlers; later registrations win.
    pub handlers: Vec<(NodeKind, Handler)>,
    /// Extra unsafe patterns.
    pub unsafe_patterns: Vec<Unsafe>,
}

/// What surrounds the output of the node being rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Info {
    /// Output right before.
    pub before: String,
    /// Output right after.
    pub after: String,
    /// Kind of the sibling rendered right before, in phrasing content.
    pub previous: Option<NodeKind>,
    /// Kind of the sibling rendered right after, in phrasing content.
    pub next: Option<NodeKind>,
}

impl Info {
    /// Surroundings without siblings.
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
            previous: None,
            next: None,
        }
    }
}

/// Serializer options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Quote wrapped around attribute values: `"` or `'`.
    #[serde(default = "default_quote")]
    pub quote: String,
}

fn default_quote() -> String {
    "\"".to_string()
}

impl Default for Options {
    fn default() -> Self {
        Self {
            quote: default_quote(),
        }
    }
}

impl Options {
    /// The configured quote character.
    pub fn quote(&self) -> Result<char, WriterError> {
        match self.quote.as_str() {
            "\"" => Ok('"'),
            "'" => Ok('\''),
            other => Err(WriterError::InvalidQuote(other.to_string())),
        }
    }
}

/// State threaded through every handler.
pub struct State {
    /// Constructs currently being serialized, outermost first.
    pub stack: Vec<ConstructName>,
    handlers: HashMap<NodeKind, Handler>,
    unsafe_patterns: Vec<CompiledUnsafe>,
    quote: char,
}

impl State {
    /// State with the base handlers and patterns plus `extensions`.
    pub fn new(options: &Options, extensions: &[ToMarkdownExtension]) -> Result<Self, WriterError> {
        let quote = options.quote()?;
        let mut handlers: HashMap<NodeKind, Handler> = crate::handle::base_handlers().into_iter().collect();
        let mut patterns = crate::unsafe_pattern::base_unsafe();
        for extension in extensions {
            handlers.extend(extension.handlers.iter().copied());
            patterns.extend(extension.unsafe_patterns.iter().cloned());
        }
        let unsafe_patterns = patterns
            .into_iter()
            .map(CompiledUnsafe::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            stack: Vec::new(),
            handlers,
            unsafe_patterns,
            quote,
        })
    }

    /// Quote for attribute values.
    pub fn quote(&self) -> char {
        self.quote
    }

    /// Push a construct.
    pub fn enter(&mut self, name: ConstructName) {
        self.stack.push(name);
    }

    /// Pop the innermost construct.
    pub fn exit(&mut self) {
        self.stack.pop();
    }

    /// Render `node` with its registered handler.
    pub fn handle(&mut self, node: &Node, parent: Option<&Node>, info: &Info) -> Result<String, WriterError> {
        let kind = node.kind();
        let Some(handler) = self.handlers.get(&kind).copied() else {
            log::warn!("no handler registered for `{kind}`");
            return Err(WriterError::MissingHandler(kind.to_string()));
        };
        (handler.handle)(node, parent, self, info)
    }

    /// First character `node` would render to, using its peek when the
    /// handler has one.
    pub fn peek(&mut self, node: &Node, parent: Option<&Node>, info: &Info) -> Result<String, WriterError> {
        let kind = node.kind();
        match self.handlers.get(&kind).copied() {
            Some(Handler { peek: Some(peek), .. }) => Ok(peek(node, parent, self, info)),
            Some(Handler { handle, .. }) => handle(node, parent, self, info),
            None => Ok(String::new()),
        }
    }

    /// Escape `value` for the current constructs and surroundings.
    pub fn safe(&self, value: &str, info: &Info) -> String {
        safe(&self.stack, &self.unsafe_patterns, value, info)
    }
}
