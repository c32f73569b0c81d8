use markdown::unist::Point;
use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Create a source location with file information
    pub fn with_file(file: String, line: usize, column: usize) -> Self {
        Self {
            file: Some(file),
            line,
            column,
        }
    }
}

impl From<&Point> for SourceLocation {
    fn from(point: &Point) -> Self {
        Self::new(point.line, point.column)
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors that can occur while reading directive markdown into a tree.
#[derive(Debug, Error)]
pub enum DirectiveError {
    /// A token kind string that is not part of the grammar.
    #[error("Unknown token kind: {0}")]
    UnknownTokenKind(String),
    /// A node type string that is not part of the tree model.
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),
    /// A token was closed while a different one was open.
    #[error("Cannot close `{found}` at {location}: `{expected}` is open")]
    UnbalancedExit {
        /// Kind of the innermost open token.
        expected: String,
        /// Kind of the token being closed.
        found: String,
        /// Where the offending exit starts.
        location: SourceLocation,
    },
    /// A token was closed with nothing open.
    #[error("Cannot close `{found}` at {location}: nothing is open")]
    UnopenedExit {
        /// Kind of the token being closed.
        found: String,
        /// Where the offending exit starts.
        location: SourceLocation,
    },
    /// The event stream ended with a token still open.
    #[error("Cannot close document: `{kind}` opened at {location} is still open")]
    UnclosedToken {
        /// Kind of the open token.
        kind: String,
        /// Where the open token starts.
        location: SourceLocation,
    },
    /// Tree JSON could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Internal logic error (unexpected state).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DirectiveError {
    /// Create an unbalanced exit error.
    pub fn unbalanced(expected: impl Into<String>, found: impl Into<String>, at: &Point) -> Self {
        Self::UnbalancedExit {
            expected: expected.into(),
            found: found.into(),
            location: at.into(),
        }
    }
}

/// Non-fatal warnings raised while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Code fence opened but never closed
    UnclosedCodeFence {
        /// Source location where the fence started
        location: SourceLocation,
        /// Fence marker character (backtick or tilde)
        marker: char,
    },
    /// Container directive opened but never closed
    UnclosedContainer {
        /// Source location where the opening fence started
        location: SourceLocation,
        /// Directive name
        name: String,
        /// Number of colons in the opening fence
        size: usize,
    },
}

impl ParseWarning {
    /// Get the location of this warning
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseWarning::UnclosedCodeFence { location, .. } => location,
            ParseWarning::UnclosedContainer { location, .. } => location,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnclosedCodeFence { location, marker } => {
                write!(f, "Unclosed code fence ({}): {}", marker, location)
            }
            ParseWarning::UnclosedContainer {
                location,
                name,
                size,
            } => {
                write!(
                    f,
                    "Unclosed container directive `{}` ({} colons): {}",
                    name, size, location
                )
            }
        }
    }
}

/// Collection of parse diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<ParseWarning>,
}

impl ParseDiagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get total count of all diagnostics
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display_with_and_without_file() {
        assert_eq!(SourceLocation::new(3, 7).to_string(), "3:7");
        assert_eq!(
            SourceLocation::with_file("doc.md".into(), 1, 2).to_string(),
            "doc.md:1:2"
        );
    }

    #[test]
    fn unbalanced_exit_message_names_both_tokens() {
        let at = Point::new(2, 4, 9);
        let error = DirectiveError::unbalanced("paragraph", "directiveLeaf", &at);
        assert_eq!(
            error.to_string(),
            "Cannot close `directiveLeaf` at 2:4: `paragraph` is open"
        );
    }

    #[test]
    fn diagnostics_collect_warnings() {
        let mut diagnostics = ParseDiagnostics::new();
        assert!(!diagnostics.has_warnings());
        diagnostics.add_warning(ParseWarning::UnclosedContainer {
            location: SourceLocation::new(1, 1),
            name: "note".into(),
            size: 3,
        });
        assert_eq!(diagnostics.count(), 1);
        assert_eq!(
            diagnostics.warnings[0].to_string(),
            "Unclosed container directive `note` (3 colons): 1:1"
        );
    }
}
