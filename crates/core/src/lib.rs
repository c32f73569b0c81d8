#![deny(missing_docs)]
//! mdirective core: the directive tree model, the attribute codec, and the
//! reader that turns markdown with `:text`, `::leaf`, and `:::container`
//! directives into that tree.

/// Directive attribute mapping and its text codec.
pub mod attributes;
/// Character reference decoding and encoding.
pub mod entity;
/// Core error and diagnostic types.
pub mod error;
/// Fence length for directive nodes.
pub mod fence;
/// Token stream to tree compiler and the directive reader extension.
pub mod from_markdown;
/// Tree node types.
pub mod mdast;
/// Markdown parsing entry points and extension hooks.
pub mod parse;
/// Tokenizer producing enter/exit events.
pub mod syntax;

pub use attributes::{AttributeAccumulator, Attributes};
pub use error::{DirectiveError, ParseDiagnostics, ParseWarning, SourceLocation};
pub use fence::{fence, fence_size};
pub use from_markdown::{Compiler, FromMarkdownExtension, directive_from_markdown};
pub use mdast::{Directive, DirectiveKind, Node, NodeKind};
pub use parse::{
    AstTransform, ParseOptions, ParserPipeline, TextTransform, parse_mdast, parse_with_diagnostics,
};
