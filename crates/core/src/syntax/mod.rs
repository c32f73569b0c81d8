//! Tokenizer for the markdown subset the reader understands, plus the three
//! directive constructs.
//!
//! The output is a flat stream of enter/exit [`Event`]s in document order.
//! Directive tokens are named the way the reader expects them
//! (`directiveContainer`, `directiveLeafAttributeIdValue`, ...).

mod code_fence;
mod directive;
mod flow;
pub(crate) mod source;
mod text;
mod token;

pub use token::{DirectivePart, Event, EventKind, Token, TokenKind};

use crate::error::ParseDiagnostics;
use std::ops::Range;

/// A tokenized document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Events in document order.
    pub events: Vec<Event>,
    /// Byte ranges that belong to container syntax (indentation, block quote
    /// markers) rather than to the token that spans them. Sorted.
    pub skips: Vec<Range<usize>>,
    /// Recoverable problems found while tokenizing.
    pub diagnostics: ParseDiagnostics,
}

impl Document {
    /// Source text of `start..end` without the skipped ranges.
    pub fn slice<'a>(&self, source: &'a str, start: usize, end: usize) -> std::borrow::Cow<'a, str> {
        let overlapping = self
            .skips
            .iter()
            .filter(|skip| skip.start < end && skip.end > start)
            .collect::<Vec<_>>();
        if overlapping.is_empty() {
            return std::borrow::Cow::Borrowed(&source[start..end]);
        }
        let mut out = String::with_capacity(end - start);
        let mut cursor = start;
        for skip in overlapping {
            if skip.start > cursor {
                out.push_str(&source[cursor..skip.start]);
            }
            cursor = cursor.max(skip.end);
        }
        if cursor < end {
            out.push_str(&source[cursor..end]);
        }
        std::borrow::Cow::Owned(out)
    }
}

/// Tokenize `source`. With `directives` off, directive syntax is plain text.
pub fn tokenize(source: &str, directives: bool) -> Document {
    let lines = source::split_lines(source);
    let index = source::LineIndex::new(source, &lines);
    let mut flow = flow::Flow::new(source, lines, source::Emitter::new(index), directives);
    flow.document();

    let mut skips = flow.skips;
    skips.sort_by_key(|skip| skip.start);
    log::trace!(
        "tokenized {} bytes into {} events",
        source.len(),
        flow.emitter.events.len()
    );
    Document {
        events: flow.emitter.events,
        skips,
        diagnostics: flow.diagnostics,
    }
}
