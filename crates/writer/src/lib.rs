//! Serialize mdast trees, directive nodes included, back to markdown.
//!
//! ```
//! use mdirective_core::{Directive, Node};
//! use mdirective_writer::{Options, directive_to_markdown, to_markdown};
//!
//! let tree = Node::root(vec![Node::LeafDirective(
//!     Directive::new("youtube").with_children(vec![Node::text("Intro")]),
//! )]);
//! let markdown = to_markdown(&tree, &Options::default(), &[directive_to_markdown()]).unwrap();
//! assert_eq!(markdown, "::youtube[Intro]\n");
//! ```
#![deny(missing_docs)]

pub mod construct;
pub mod container;
pub mod directive;
pub mod error;
pub mod handle;
pub mod state;
pub mod unsafe_pattern;

pub use construct::ConstructName;
pub use container::{container_flow, container_phrasing};
pub use directive::directive_to_markdown;
pub use error::WriterError;
pub use handle::indent_lines;
pub use state::{HandleFn, Handler, Info, Options, PeekFn, State, ToMarkdownExtension};
pub use unsafe_pattern::Unsafe;

use mdirective_core::Node;

/// Serialize `node` with the base handlers plus `extensions`.
///
/// Non-empty output always ends in a line ending.
pub fn to_markdown(node: &Node, options: &Options, extensions: &[ToMarkdownExtension]) -> Result<String, WriterError> {
    let mut state = State::new(options, extensions)?;
    let mut result = state.handle(node, None, &Info::new("\n", "\n"))?;
    if !result.is_empty() && !result.ends_with(['\n', '\r']) {
        result.push('\n');
    }
    Ok(result)
}
