//! Flow tokenizer: splits lines into blocks, recursing into block quotes
//! and container directives.

use super::code_fence::{detect_fence_opening, is_closing_fence, leading_whitespace_info};
use super::directive::{Head, scan_container_closing, scan_container_opening, scan_leaf};
use super::source::{Chunk, Emitter, InlineText, Line};
use super::text::{emit_head, tokenize_inline};
use super::token::{DirectivePart, TokenKind};
use crate::error::{ParseDiagnostics, ParseWarning, SourceLocation};
use crate::mdast::DirectiveKind;
use std::ops::Range;

/// A line as seen from inside its containers: content starts at `start`.
#[derive(Debug, Clone, Copy)]
struct View {
    line: usize,
    start: usize,
}

pub(crate) struct Flow<'a> {
    source: &'a str,
    lines: Vec<Line>,
    pub emitter: Emitter<'a>,
    pub skips: Vec<Range<usize>>,
    pub diagnostics: ParseDiagnostics,
    directives: bool,
}

impl<'a> Flow<'a> {
    pub fn new(source: &'a str, lines: Vec<Line>, emitter: Emitter<'a>, directives: bool) -> Self {
        Self {
            source,
            lines,
            emitter,
            skips: Vec::new(),
            diagnostics: ParseDiagnostics::new(),
            directives,
        }
    }

    /// Tokenize the whole document.
    pub fn document(&mut self) {
        let views: Vec<View> = self
            .lines
            .iter()
            .enumerate()
            .map(|(line, l)| View { line, start: l.start })
            .collect();
        self.flow(&views, None);
    }

    fn text(&self, view: View) -> &'a str {
        &self.source[view.start..self.lines[view.line].end]
    }

    fn line(&self, view: View) -> Line {
        self.lines[view.line]
    }

    /// Offset and text after up to three columns of indentation, or `None`
    /// when the line is indented too far to start a block.
    fn indented(&self, view: View) -> Option<(usize, &'a str)> {
        let text = self.text(view);
        let (columns, bytes) = leading_whitespace_info(text);
        (columns <= 3).then(|| (view.start + bytes, &text[bytes..]))
    }

    fn is_blank(&self, view: View) -> bool {
        self.text(view).bytes().all(|b| b == b' ' || b == b'\t')
    }

    fn is_closing(&self, view: View, close: Option<usize>) -> bool {
        match (close, self.indented(view)) {
            (Some(size), Some((_, text))) => scan_container_closing(text, size).is_some(),
            _ => false,
        }
    }

    fn warn(&mut self, offset: usize, warning: impl FnOnce(SourceLocation) -> ParseWarning) {
        let location = SourceLocation::from(&self.emitter.point(offset));
        let warning = warning(location);
        log::debug!("{warning}");
        self.diagnostics.add_warning(warning);
    }

    /// Tokenize blocks until `views` run out or a line closes the enclosing
    /// container of size `close`. Returns the number of views consumed,
    /// including the closing line, and the closing line itself.
    fn flow(&mut self, views: &[View], close: Option<usize>) -> (usize, Option<View>) {
        let mut index = 0;
        while index < views.len() {
            let view = views[index];
            if self.is_closing(view, close) {
                return (index + 1, Some(view));
            }
            if self.is_blank(view) {
                index += 1;
                continue;
            }
            index += self.block(&views[index..], close);
        }
        (index, None)
    }

    fn block(&mut self, views: &[View], close: Option<usize>) -> usize {
        let view = views[0];
        if let Some(consumed) = self.code_fenced(views, close) {
            return consumed;
        }
        if self.directives {
            if let Some(consumed) = self.container(views) {
                return consumed;
            }
            if self.leaf(view) {
                return 1;
            }
        }
        if self.heading(view) || self.thematic_break(view) {
            return 1;
        }
        if let Some(consumed) = self.block_quote(views) {
            return consumed;
        }
        self.paragraph(views, close)
    }

    /// Whether `view` starts a block that ends a running paragraph.
    fn interrupts(&self, view: View, close: Option<usize>) -> bool {
        if self.is_blank(view) || self.is_closing(view, close) {
            return true;
        }
        let Some((_, text)) = self.indented(view) else {
            return false;
        };
        detect_fence_opening(text).is_some()
            || text.starts_with('>')
            || scan_heading(text).is_some()
            || is_thematic_break(text)
            || (self.directives && (scan_leaf(text).is_some() || scan_container_opening(text).is_some()))
    }

    fn paragraph(&mut self, views: &[View], close: Option<usize>) -> usize {
        let mut count = 1;
        while count < views.len() && !self.interrupts(views[count], close) {
            count += 1;
        }

        let mut chunks = Vec::with_capacity(count);
        for view in &views[..count] {
            let line = self.line(*view);
            let text = self.text(*view);
            let lead = text.len() - text.trim_start_matches([' ', '\t']).len();
            let trail = text.len() - text.trim_end_matches([' ', '\t']).len();
            if lead > 0 {
                self.skips.push(view.start..view.start + lead);
            }
            if trail > 0 {
                self.skips.push(line.end - trail..line.end);
            }
            chunks.push(Chunk {
                start: view.start + lead,
                end: line.end - trail,
                eol: Some((line.end, line.eol_end)),
            });
        }

        let text = InlineText::new(self.source, &chunks);
        let first = chunks[0].start;
        let last = chunks[chunks.len() - 1].end;
        let paragraph = self.emitter.enter(TokenKind::Paragraph, first, last);
        tokenize_inline(&mut self.emitter, &text, 0..text.text.len(), self.directives);
        self.emitter.exit(paragraph);
        count
    }

    fn heading(&mut self, view: View) -> bool {
        let Some((start, text)) = self.indented(view) else {
            return false;
        };
        let Some(heading) = scan_heading(text) else {
            return false;
        };
        let enter = self.emitter.enter(TokenKind::AtxHeading, start, start + heading.end);
        self.emitter
            .token(TokenKind::AtxHeadingSequence, start, start + heading.depth);
        if !heading.content.is_empty() {
            let content = start + heading.content.start..start + heading.content.end;
            let text = InlineText::line(self.source, content.start, content.end);
            let inner = self.emitter.enter(TokenKind::AtxHeadingText, content.start, content.end);
            tokenize_inline(&mut self.emitter, &text, 0..text.text.len(), self.directives);
            self.emitter.exit(inner);
        }
        self.emitter.exit(enter);
        true
    }

    fn thematic_break(&mut self, view: View) -> bool {
        match self.indented(view) {
            Some((start, text)) if is_thematic_break(text) => {
                let end = start + text.trim_end_matches([' ', '\t']).len();
                self.emitter.token(TokenKind::ThematicBreak, start, end);
                true
            }
            _ => false,
        }
    }

    fn block_quote(&mut self, views: &[View]) -> Option<usize> {
        let mut inner = Vec::new();
        for view in views {
            let Some((start, text)) = self.indented(*view) else {
                break;
            };
            if !text.starts_with('>') {
                break;
            }
            let mut content = start + 1;
            if matches!(self.source.as_bytes().get(content), Some(b' ' | b'\t'))
                && content < self.line(*view).end
            {
                content += 1;
            }
            self.skips.push(view.start..content);
            inner.push(View { line: view.line, start: content });
        }
        if inner.is_empty() {
            return None;
        }
        let first = views[0].start + leading_whitespace_info(self.text(views[0])).1;
        let last = self.line(inner[inner.len() - 1]).end;
        let enter = self.emitter.enter(TokenKind::BlockQuote, first, last);
        self.flow(&inner, None);
        self.emitter.exit(enter);
        Some(inner.len())
    }

    fn code_fenced(&mut self, views: &[View], close: Option<usize>) -> Option<usize> {
        let (start, text) = self.indented(views[0])?;
        let opening = detect_fence_opening(text)?;
        let indent = start - views[0].start;

        let mut closing = None;
        let mut content = 0;
        for view in &views[1..] {
            if self.is_closing(*view, close) {
                break;
            }
            if let Some((_, text)) = self.indented(*view)
                && is_closing_fence(text, opening.marker, opening.length)
            {
                closing = Some(*view);
                break;
            }
            content += 1;
        }

        let end = match closing {
            Some(view) => self.line(view).end,
            None if content > 0 => self.line(views[content]).end,
            None => start + opening.end,
        };
        let code = self.emitter.enter(TokenKind::CodeFenced, start, end);
        let fence = self.emitter.enter(TokenKind::CodeFencedFence, start, start + opening.end);
        for (kind, range) in [
            (TokenKind::CodeFencedFenceInfo, &opening.lang),
            (TokenKind::CodeFencedFenceMeta, &opening.meta),
        ] {
            if let Some(range) = range {
                let info = self.emitter.enter(kind, start + range.start, start + range.end);
                self.emitter.token(TokenKind::Data, start + range.start, start + range.end);
                self.emitter.exit(info);
            }
        }
        self.emitter.exit(fence);

        for (offset, view) in views[1..=content].iter().enumerate() {
            let line = self.line(*view);
            if offset > 0 {
                let previous = self.line(views[offset]);
                self.emitter.token(TokenKind::LineEnding, previous.end, previous.eol_end);
            }
            // Strip up to the opening fence's indentation.
            let text = self.text(*view);
            let strip = text.bytes().take(indent).take_while(|b| *b == b' ').count();
            if strip > 0 {
                self.skips.push(view.start..view.start + strip);
            }
            if view.start + strip < line.end {
                self.emitter
                    .token(TokenKind::CodeFlowValue, view.start + strip, line.end);
            }
        }

        if let Some(view) = closing {
            let (fence_start, text) = self.indented(view)?;
            let fence_end = fence_start + text.trim_end_matches([' ', '\t']).len();
            self.emitter.token(TokenKind::CodeFencedFence, fence_start, fence_end);
        } else {
            let marker = opening.marker;
            self.warn(start, |location| ParseWarning::UnclosedCodeFence { location, marker });
        }
        self.emitter.exit(code);

        Some(1 + content + usize::from(closing.is_some()))
    }

    /// Emit a leaf or container head found in the line text starting at `start`.
    fn head(&mut self, kind: DirectiveKind, start: usize, line_end: usize, head: &Head) {
        let text = InlineText::line(self.source, start, line_end);
        emit_head(&mut self.emitter, &text, kind, head, self.directives);
    }

    fn leaf(&mut self, view: View) -> bool {
        let Some((start, text)) = self.indented(view) else {
            return false;
        };
        let Some(head) = scan_leaf(text) else {
            return false;
        };
        let kind = TokenKind::Directive(DirectiveKind::Leaf, DirectivePart::Whole);
        let enter = self.emitter.enter(kind, start, start + head.end);
        self.head(DirectiveKind::Leaf, start, self.line(view).end, &head);
        self.emitter.exit(enter);
        true
    }

    fn container(&mut self, views: &[View]) -> Option<usize> {
        let (start, text) = self.indented(views[0])?;
        let head = scan_container_opening(text)?;
        let size = head.sequence.len();
        let part = |part| TokenKind::Directive(DirectiveKind::Container, part);

        let whole = self.emitter.enter(part(DirectivePart::Whole), start, start + head.end);
        let fence = self.emitter.enter(part(DirectivePart::Fence), start, start + head.end);
        self.head(DirectiveKind::Container, start, self.line(views[0]).end, &head);
        self.emitter.exit(fence);

        let rest = &views[1..];
        let content_start = rest.first().map(|view| view.start);
        let content = content_start.map(|offset| self.emitter.enter(part(DirectivePart::Content), offset, offset));
        let (consumed, closing) = self.flow(rest, Some(size));
        let content_lines = consumed - usize::from(closing.is_some());
        let mut end = start + head.end;
        if let Some(content) = content {
            if content_lines > 0 {
                end = self.line(rest[content_lines - 1]).end;
                self.emitter.set_end(content, end);
            }
            self.emitter.exit(content);
        }

        match closing {
            Some(view) => {
                let (fence_start, text) = self.indented(view)?;
                let run = scan_container_closing(text, size)?;
                let fence_end = fence_start + text.trim_end_matches([' ', '\t']).len();
                let fence = self.emitter.enter(part(DirectivePart::Fence), fence_start, fence_end);
                self.emitter
                    .token(part(DirectivePart::Sequence), fence_start, fence_start + run);
                self.emitter.exit(fence);
                end = fence_end;
            }
            None => {
                let name = text[head.name.clone()].to_string();
                self.warn(start, |location| ParseWarning::UnclosedContainer { location, name, size });
            }
        }

        self.emitter.set_end(whole, end);
        self.emitter.exit(whole);
        Some(1 + consumed)
    }
}

struct HeadingScan {
    depth: usize,
    content: Range<usize>,
    end: usize,
}

/// ATX heading in text that starts at the first `#`.
fn scan_heading(text: &str) -> Option<HeadingScan> {
    let depth = text.bytes().take_while(|b| *b == b'#').count();
    if depth == 0 || depth > 6 {
        return None;
    }
    if !matches!(text.as_bytes().get(depth), None | Some(b' ' | b'\t')) {
        return None;
    }
    let end = text.trim_end_matches([' ', '\t']).len();
    let mut content_end = end.max(depth);
    // Closing sequence: trailing `#`s preceded by whitespace.
    let trimmed = &text[..content_end];
    let without_hashes = trimmed.trim_end_matches('#');
    if without_hashes.len() < trimmed.len()
        && (without_hashes.len() <= depth || without_hashes.ends_with([' ', '\t']))
    {
        content_end = without_hashes.trim_end_matches([' ', '\t']).len();
    }
    let after_sequence = text[depth..].len() - text[depth..].trim_start_matches([' ', '\t']).len();
    let content_start = (depth + after_sequence).min(content_end.max(depth));
    let content_end = content_end.max(content_start);
    Some(HeadingScan {
        depth,
        content: content_start..content_end,
        end: end.max(depth),
    })
}

fn is_thematic_break(text: &str) -> bool {
    let Some(marker) = text.bytes().next() else {
        return false;
    };
    if !matches!(marker, b'*' | b'-' | b'_') {
        return false;
    }
    let mut count = 0;
    for byte in text.bytes() {
        match byte {
            b' ' | b'\t' => {}
            b if b == marker => count += 1,
            _ => return false,
        }
    }
    count >= 3
}
