//! Markdown parsing entry points and extension hooks.

use crate::error::{DirectiveError, ParseDiagnostics};
use crate::from_markdown::{Compiler, directive_from_markdown};
use crate::mdast::Node;
use crate::syntax::tokenize;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Parser options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Recognize directive syntax. When off, directives read as plain text.
    pub directives: bool,
}

impl ParseOptions {
    /// Plain markdown without directives.
    pub const fn markdown() -> Self {
        Self { directives: false }
    }

    /// Markdown with the three directive constructs.
    pub const fn directives() -> Self {
        Self { directives: true }
    }

    fn compiler(self) -> Compiler {
        let compiler = Compiler::new();
        if self.directives {
            compiler.with_extension(directive_from_markdown())
        } else {
            compiler
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::directives()
    }
}

/// Trait for preprocessing raw markdown text before parsing.
pub trait TextTransform {
    /// Transform the input markdown text, returning an owned or borrowed string.
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

impl<F> TextTransform for F
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str>,
{
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (self)(input)
    }
}

/// Trait for mutating the parsed tree after parsing.
pub trait AstTransform {
    /// Mutate the parsed tree in place.
    fn transform(&self, root: &mut Node);
}

impl<F> AstTransform for F
where
    F: Fn(&mut Node),
{
    fn transform(&self, root: &mut Node) {
        (self)(root)
    }
}

/// Configurable parsing pipeline with optional transforms.
pub struct ParserPipeline {
    options: ParseOptions,
    text_transforms: Vec<Box<dyn TextTransform>>,
    ast_transforms: Vec<Box<dyn AstTransform>>,
}

impl ParserPipeline {
    /// Create a new pipeline.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            text_transforms: Vec::new(),
            ast_transforms: Vec::new(),
        }
    }

    /// Add a text preprocessor transform.
    pub fn add_text_transform<T: TextTransform + 'static>(&mut self, transform: T) {
        self.text_transforms.push(Box::new(transform));
    }

    /// Add an AST transform.
    pub fn add_ast_transform<T: AstTransform + 'static>(&mut self, transform: T) {
        self.ast_transforms.push(Box::new(transform));
    }

    /// Parse markdown into a tree using the configured pipeline.
    pub fn parse(&self, input: &str) -> Result<Node, DirectiveError> {
        let mut current = Cow::Borrowed(input);
        for transform in &self.text_transforms {
            let next = transform.transform(current.as_ref());
            current = Cow::Owned(next.into_owned());
        }

        let mut root = parse_mdast(&current, &self.options)?;
        for transform in &self.ast_transforms {
            transform.transform(&mut root);
        }

        Ok(root)
    }
}

/// Parse markdown into a tree.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, DirectiveError> {
    parse_with_diagnostics(input, options).map(|(root, _)| root)
}

/// Parse markdown into a tree, also returning recoverable problems such as
/// unclosed containers.
pub fn parse_with_diagnostics(
    input: &str,
    options: &ParseOptions,
) -> Result<(Node, ParseDiagnostics), DirectiveError> {
    let document = tokenize(input, options.directives);
    let root = options.compiler().compile(input, &document)?;
    Ok((root, document.diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdast::Directive;
    use pretty_assertions::assert_eq;

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ParseOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ParseOptions::default());
        assert!(options.directives);
        let options: ParseOptions = serde_json::from_str(r#"{"directives":false}"#).unwrap();
        assert_eq!(options, ParseOptions::markdown());
    }

    fn bang_to_leaf(input: &str) -> Cow<'_, str> {
        Cow::Owned(input.replace("!note", "::note"))
    }

    #[test]
    fn pipeline_runs_text_then_tree_transforms() {
        let mut pipeline = ParserPipeline::new(ParseOptions::default());
        pipeline.add_text_transform(bang_to_leaf);
        pipeline.add_ast_transform(|root: &mut Node| root.remove_position());
        let root = pipeline.parse("!note").unwrap();
        assert_eq!(root, Node::root(vec![Node::LeafDirective(Directive::new("note"))]));
    }

    #[test]
    fn diagnostics_report_unclosed_container() {
        let (root, diagnostics) =
            parse_with_diagnostics(":::note\ntext", &ParseOptions::default()).unwrap();
        assert_eq!(diagnostics.count(), 1);
        assert_eq!(diagnostics.warnings[0].location().line, 1);
        let Node::Root(root) = root else { panic!("not a root") };
        assert_eq!(root.children.len(), 1);
    }
}
