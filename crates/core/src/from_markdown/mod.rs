//! Token stream to tree: the generic compiler and the directive extension.

mod compile;
mod directive;

pub use compile::{CompileContext, CompileData, Compiler, FromMarkdownExtension, Handle};
pub use directive::directive_from_markdown;
