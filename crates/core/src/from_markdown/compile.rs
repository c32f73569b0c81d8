//! Event-to-tree compiler with pluggable enter/exit handlers.

use crate::error::{DirectiveError, SourceLocation};
use crate::mdast::{Blockquote, Code, Heading, Node, NodeKind, ThematicBreak};
use crate::syntax::source::{LineIndex, split_lines};
use crate::syntax::{Document, EventKind, Token, TokenKind};
use crate::{attributes::AttributeAccumulator, entity::decode_reference};
use markdown::unist::{Point, Position};
use std::collections::HashMap;

/// Handler run when a token of a given kind opens or closes.
pub type Handle = fn(&mut CompileContext<'_>, &Token) -> Result<(), DirectiveError>;

/// Handlers and settings one syntax extension contributes to the compiler.
#[derive(Debug, Clone, Default)]
pub struct FromMarkdownExtension {
    /// Node kinds whose phrasing content keeps line endings as text.
    pub can_contain_eols: Vec<NodeKind>,
    /// Handlers run on enter events.
    pub enter: Vec<(TokenKind, Handle)>,
    /// Handlers run on exit events.
    pub exit: Vec<(TokenKind, Handle)>,
}

impl FromMarkdownExtension {
    /// Handler registered for the token kind named `name` (`directiveLeafName`).
    pub fn handler_for(&self, event: EventKind, name: &str) -> Result<Option<Handle>, DirectiveError> {
        let kind: TokenKind = name.parse()?;
        let table = match event {
            EventKind::Enter => &self.enter,
            EventKind::Exit => &self.exit,
        };
        Ok(table
            .iter()
            .rev()
            .find(|(registered, _)| *registered == kind)
            .map(|(_, handle)| *handle))
    }
}

/// Scratch state shared between handlers.
#[derive(Debug, Clone, Default)]
pub struct CompileData {
    /// Attribute pairs of the attribute block being read.
    pub directive_attributes: Option<AttributeAccumulator>,
}

#[derive(Debug)]
enum Frame {
    Node(Node),
    /// Collects content whose text is wanted instead of its nodes.
    Fragment(Vec<Node>),
}

/// Mutable state of one compile run, handed to every handler.
pub struct CompileContext<'a> {
    source: &'a str,
    document: &'a Document,
    stack: Vec<Frame>,
    open: Vec<Token>,
    can_contain_eols: &'a [NodeKind],
    /// Handler scratch state.
    pub data: CompileData,
}

impl<'a> CompileContext<'a> {
    /// Open `node` for `token`; following content becomes its children.
    pub fn enter(&mut self, mut node: Node, token: &Token) {
        node.set_position(Some(Position {
            start: token.start.clone(),
            end: token.end.clone(),
        }));
        self.stack.push(Frame::Node(node));
        self.open.push(token.clone());
    }

    /// Close the node opened for `token` and return it without attaching it
    /// to its parent.
    pub fn exit_detached(&mut self, token: &Token) -> Result<Node, DirectiveError> {
        let location = SourceLocation::from(&token.start);
        let open = self.open.pop().ok_or_else(|| DirectiveError::UnopenedExit {
            found: token.kind.to_string(),
            location: location.clone(),
        })?;
        if open.kind != token.kind {
            return Err(DirectiveError::unbalanced(
                open.kind.to_string(),
                token.kind.to_string(),
                &token.start,
            ));
        }
        match self.stack.pop() {
            Some(Frame::Node(mut node)) => {
                let start = node.position().map_or_else(|| token.start.clone(), |p| p.start.clone());
                node.set_position(Some(Position {
                    start,
                    end: token.end.clone(),
                }));
                Ok(node)
            }
            _ => Err(DirectiveError::InternalError(format!(
                "`{}` closed while a buffer is open",
                token.kind
            ))),
        }
    }

    /// Close the node opened for `token` and attach it to its parent.
    pub fn exit(&mut self, token: &Token) -> Result<(), DirectiveError> {
        let node = self.exit_detached(token)?;
        self.append(node)
    }

    /// Attach `node` as the last child of the innermost open node or buffer.
    pub fn append(&mut self, node: Node) -> Result<(), DirectiveError> {
        let children = match self.stack.last_mut() {
            Some(Frame::Fragment(children)) => children,
            Some(Frame::Node(parent)) => {
                let kind = parent.kind();
                parent.children_mut().ok_or_else(|| {
                    DirectiveError::InternalError(format!("`{kind}` cannot have children"))
                })?
            }
            None => {
                return Err(DirectiveError::InternalError("no open parent".to_string()));
            }
        };
        children.push(node);
        Ok(())
    }

    /// Start collecting content as text.
    pub fn buffer(&mut self) {
        self.stack.push(Frame::Fragment(Vec::new()));
    }

    /// Stop collecting and return the collected text.
    pub fn resume(&mut self) -> Result<String, DirectiveError> {
        match self.stack.pop() {
            Some(Frame::Fragment(children)) => Ok(children.iter().map(Node::to_text).collect()),
            Some(frame) => {
                self.stack.push(frame);
                Err(DirectiveError::InternalError("resume without buffer".to_string()))
            }
            None => Err(DirectiveError::InternalError("resume without buffer".to_string())),
        }
    }

    /// The innermost open node, unless a buffer is collecting.
    pub fn current_mut(&mut self) -> Option<&mut Node> {
        match self.stack.last_mut() {
            Some(Frame::Node(node)) => Some(node),
            _ => None,
        }
    }

    /// Source text of `token`, without container prefixes.
    pub fn slice_serialize(&self, token: &Token) -> String {
        self.document
            .slice(self.source, token.start.offset, token.end.offset)
            .into_owned()
    }

    /// Append `value` as text at `token`, extending the previous text node
    /// when there is one.
    pub fn append_text(&mut self, token: &Token, value: &str) -> Result<(), DirectiveError> {
        let children = match self.stack.last_mut() {
            Some(Frame::Fragment(children)) => children,
            Some(Frame::Node(parent)) => match parent.children_mut() {
                Some(children) => children,
                None => return Ok(()),
            },
            None => return Ok(()),
        };
        if let Some(Node::Text(text)) = children.last_mut() {
            text.value.push_str(value);
            if let Some(position) = text.position.as_mut() {
                position.end = token.end.clone();
            }
            return Ok(());
        }
        let mut text = Node::text(value);
        text.set_position(Some(Position {
            start: token.start.clone(),
            end: token.end.clone(),
        }));
        children.push(text);
        Ok(())
    }

    /// Whether line endings in the current content are kept as text.
    pub fn keeps_line_endings(&self) -> bool {
        match self.stack.last() {
            Some(Frame::Fragment(_)) => true,
            Some(Frame::Node(node)) => self.can_contain_eols.contains(&node.kind()),
            None => false,
        }
    }
}

/// Turns a token stream into a tree.
#[derive(Debug, Clone)]
pub struct Compiler {
    enter: HashMap<TokenKind, Handle>,
    exit: HashMap<TokenKind, Handle>,
    can_contain_eols: Vec<NodeKind>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Compiler for the base markdown constructs.
    pub fn new() -> Self {
        let enter: [(TokenKind, Handle); 5] = [
            (TokenKind::Paragraph, enter_paragraph),
            (TokenKind::AtxHeading, enter_heading),
            (TokenKind::BlockQuote, enter_block_quote),
            (TokenKind::CodeFenced, enter_code_fenced),
            (TokenKind::ThematicBreak, enter_thematic_break),
        ];
        let enter_buffer: [(TokenKind, Handle); 2] = [
            (TokenKind::CodeFencedFenceInfo, buffer),
            (TokenKind::CodeFencedFenceMeta, buffer),
        ];
        let exit: [(TokenKind, Handle); 13] = [
            (TokenKind::Paragraph, exit_node),
            (TokenKind::AtxHeading, exit_node),
            (TokenKind::AtxHeadingSequence, exit_heading_sequence),
            (TokenKind::BlockQuote, exit_node),
            (TokenKind::CodeFenced, exit_node),
            (TokenKind::CodeFencedFenceInfo, exit_code_fenced_info),
            (TokenKind::CodeFencedFenceMeta, exit_code_fenced_meta),
            (TokenKind::CodeFlowValue, exit_code_flow_value),
            (TokenKind::ThematicBreak, exit_node),
            (TokenKind::Data, exit_data),
            (TokenKind::CharacterEscapeValue, exit_data),
            (TokenKind::CharacterReference, exit_character_reference),
            (TokenKind::LineEnding, exit_line_ending),
        ];
        Self {
            enter: enter.into_iter().chain(enter_buffer).collect(),
            exit: exit.into_iter().collect(),
            can_contain_eols: vec![NodeKind::Paragraph, NodeKind::Heading],
        }
    }

    /// Add the handlers of `extension`; they win over existing ones.
    pub fn with_extension(mut self, extension: FromMarkdownExtension) -> Self {
        self.can_contain_eols.extend(extension.can_contain_eols);
        self.enter.extend(extension.enter);
        self.exit.extend(extension.exit);
        self
    }

    /// Build the tree for `document`, which was tokenized from `source`.
    pub fn compile(&self, source: &str, document: &Document) -> Result<Node, DirectiveError> {
        let index = LineIndex::new(source, &split_lines(source));
        let mut root = Node::root(Vec::new());
        root.set_position(Some(Position {
            start: Point::new(1, 1, 0),
            end: index.point(source.len()),
        }));

        let mut context = CompileContext {
            source,
            document,
            stack: vec![Frame::Node(root)],
            open: Vec::new(),
            can_contain_eols: &self.can_contain_eols,
            data: CompileData::default(),
        };

        for event in &document.events {
            let handlers = match event.kind {
                EventKind::Enter => &self.enter,
                EventKind::Exit => &self.exit,
            };
            match handlers.get(&event.token.kind) {
                Some(handle) => handle(&mut context, &event.token)?,
                None => log::trace!("no handler for {:?} {}", event.kind, event.token.kind),
            }
        }

        if let Some(token) = context.open.last() {
            return Err(DirectiveError::UnclosedToken {
                kind: token.kind.to_string(),
                location: SourceLocation::from(&token.start),
            });
        }
        match context.stack.pop() {
            Some(Frame::Node(root)) if context.stack.is_empty() => Ok(root),
            _ => Err(DirectiveError::InternalError(
                "unbalanced buffers at end of document".to_string(),
            )),
        }
    }
}

fn buffer(context: &mut CompileContext<'_>, _token: &Token) -> Result<(), DirectiveError> {
    context.buffer();
    Ok(())
}

fn exit_node(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    context.exit(token)
}

fn enter_paragraph(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    context.enter(Node::paragraph(Vec::new()), token);
    Ok(())
}

fn enter_heading(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    context.enter(Node::Heading(Heading::default()), token);
    Ok(())
}

fn exit_heading_sequence(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    let depth = token.end.offset - token.start.offset;
    if let Some(Node::Heading(heading)) = context.current_mut()
        && heading.depth == 0
    {
        heading.depth = u8::try_from(depth).unwrap_or(6);
    }
    Ok(())
}

fn enter_block_quote(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    context.enter(Node::Blockquote(Blockquote::default()), token);
    Ok(())
}

fn enter_code_fenced(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    context.enter(Node::Code(Code::default()), token);
    Ok(())
}

fn exit_code_fenced_info(context: &mut CompileContext<'_>, _token: &Token) -> Result<(), DirectiveError> {
    let lang = context.resume()?;
    if let Some(Node::Code(code)) = context.current_mut() {
        code.lang = Some(lang);
    }
    Ok(())
}

fn exit_code_fenced_meta(context: &mut CompileContext<'_>, _token: &Token) -> Result<(), DirectiveError> {
    let meta = context.resume()?;
    if let Some(Node::Code(code)) = context.current_mut() {
        code.meta = Some(meta);
    }
    Ok(())
}

fn exit_code_flow_value(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    let value = context.slice_serialize(token);
    if let Some(Node::Code(code)) = context.current_mut() {
        code.value.push_str(&value);
    }
    Ok(())
}

fn enter_thematic_break(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    context.enter(Node::ThematicBreak(ThematicBreak::default()), token);
    Ok(())
}

fn exit_data(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    let value = context.slice_serialize(token);
    context.append_text(token, &value)
}

fn exit_character_reference(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    let raw = context.slice_serialize(token);
    let value = decode_reference(&raw).unwrap_or(raw);
    context.append_text(token, &value)
}

fn exit_line_ending(context: &mut CompileContext<'_>, token: &Token) -> Result<(), DirectiveError> {
    let value = context.slice_serialize(token);
    // Line endings between code lines are part of the value.
    if let Some(Node::Code(code)) = context.current_mut() {
        code.value.push_str(&value);
        return Ok(());
    }
    if context.keeps_line_endings() {
        context.append_text(token, &value)?;
    }
    Ok(())
}
