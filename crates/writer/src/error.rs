//! Writer errors.

use thiserror::Error;

/// Errors raised while serializing a tree.
#[derive(Debug, Error)]
pub enum WriterError {
    /// `quote` option is neither `"` nor `'`.
    #[error("Cannot serialize attribute values with `{0}` for `options.quote`, expected `\"` or `'`")]
    InvalidQuote(String),
    /// No handler is registered for a node type.
    #[error("Cannot handle unknown node `{0}`")]
    MissingHandler(String),
    /// A construct name string that is not known.
    #[error("Unknown construct: {0}")]
    UnknownConstruct(String),
    /// An unsafe pattern did not compile.
    #[error("Invalid unsafe pattern: {0}")]
    Pattern(#[from] regex::Error),
}
