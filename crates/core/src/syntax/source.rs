//! Line splitting, offset-to-point mapping, and the event emitter.

use super::token::{Event, EventKind, Token, TokenKind};
use markdown::unist::Point;

/// A source line: content `start..end`, then its line ending up to `eol_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line {
    pub start: usize,
    pub end: usize,
    pub eol_end: usize,
}

/// Split `source` on `\n`, `\r\n`, and `\r`. A final line ending does not
/// open another line.
pub(crate) fn split_lines(source: &str) -> Vec<Line> {
    let bytes = source.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'\n' => {
                lines.push(Line { start, end: index, eol_end: index + 1 });
                index += 1;
                start = index;
            }
            b'\r' => {
                let eol_end = if bytes.get(index + 1) == Some(&b'\n') { index + 2 } else { index + 1 };
                lines.push(Line { start, end: index, eol_end });
                index = eol_end;
                start = index;
            }
            _ => index += 1,
        }
    }
    if start < bytes.len() {
        lines.push(Line { start, end: bytes.len(), eol_end: bytes.len() });
    }
    lines
}

/// Maps byte offsets to 1-based line/column points.
#[derive(Debug, Clone)]
pub(crate) struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str, lines: &[Line]) -> Self {
        let mut starts = vec![0];
        starts.extend(lines.iter().map(|line| line.eol_end).filter(|end| {
            // Only ends that are followed by a new line start.
            *end > 0 && matches!(source.as_bytes()[end - 1], b'\n' | b'\r')
        }));
        starts.dedup();
        Self { source, starts }
    }

    pub fn point(&self, offset: usize) -> Point {
        let line = self.starts.partition_point(|start| *start <= offset).max(1);
        let line_start = self.starts[line - 1];
        let column = self.source[line_start..offset].chars().count() + 1;
        Point::new(line, column, offset)
    }
}

/// A content chunk of a multi-line inline run: `start..end` in the source,
/// followed by the line ending `eol` when another chunk comes after it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Chunk {
    pub start: usize,
    pub end: usize,
    pub eol: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    virt: usize,
    src: usize,
    len: usize,
    eol: Option<(usize, usize)>,
}

/// Inline content stitched from chunks, with each line ending normalized
/// to `\n`. Offsets into `text` map back to source offsets.
#[derive(Debug, Clone)]
pub(crate) struct InlineText {
    pub text: String,
    segments: Vec<Segment>,
}

impl InlineText {
    pub fn new(source: &str, chunks: &[Chunk]) -> Self {
        let mut text = String::new();
        let mut segments = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let last = index + 1 == chunks.len();
            segments.push(Segment {
                virt: text.len(),
                src: chunk.start,
                len: chunk.end - chunk.start,
                eol: if last { None } else { chunk.eol },
            });
            text.push_str(&source[chunk.start..chunk.end]);
            if !last {
                text.push('\n');
            }
        }
        Self { text, segments }
    }

    /// Single-line text covering `start..end`.
    pub fn line(source: &str, start: usize, end: usize) -> Self {
        Self::new(source, &[Chunk { start, end, eol: None }])
    }

    /// Source offset where a token starting at `virt` begins.
    pub fn start(&self, virt: usize) -> usize {
        let index = self.segments.partition_point(|s| s.virt <= virt).saturating_sub(1);
        let segment = self.segments[index];
        let offset = virt - segment.virt;
        if offset < segment.len {
            segment.src + offset
        } else {
            segment.eol.map_or(segment.src + segment.len, |(start, _)| start)
        }
    }

    /// Source offset where a token ending at `virt` ends.
    pub fn end(&self, virt: usize) -> usize {
        let index = self.segments.partition_point(|s| s.virt < virt).saturating_sub(1);
        let segment = self.segments[index];
        let offset = virt.saturating_sub(segment.virt);
        if offset <= segment.len {
            segment.src + offset
        } else {
            segment.eol.map_or(segment.src + segment.len, |(_, end)| end)
        }
    }
}

/// Collects events with resolved points.
pub(crate) struct Emitter<'a> {
    index: LineIndex<'a>,
    pub events: Vec<Event>,
}

impl<'a> Emitter<'a> {
    pub fn new(index: LineIndex<'a>) -> Self {
        Self { index, events: Vec::new() }
    }

    pub fn point(&self, offset: usize) -> Point {
        self.index.point(offset)
    }

    fn make(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        Token { kind, start: self.point(start), end: self.point(end) }
    }

    /// Open a token; returns the event index for [`Emitter::set_end`].
    pub fn enter(&mut self, kind: TokenKind, start: usize, end: usize) -> usize {
        let token = self.make(kind, start, end);
        self.events.push(Event { kind: EventKind::Enter, token });
        self.events.len() - 1
    }

    /// Close the token opened at `enter_index`.
    pub fn exit(&mut self, enter_index: usize) {
        let token = self.events[enter_index].token.clone();
        self.events.push(Event { kind: EventKind::Exit, token });
    }

    /// Open and immediately close a token.
    pub fn token(&mut self, kind: TokenKind, start: usize, end: usize) {
        let index = self.enter(kind, start, end);
        self.exit(index);
    }

    /// Fix the end of a token whose extent was not known when it opened.
    pub fn set_end(&mut self, enter_index: usize, end: usize) {
        let point = self.point(end);
        self.events[enter_index].token.end = point;
    }

    /// Open a token spanning `start..end` of inline text.
    pub fn enter_inline(&mut self, text: &InlineText, kind: TokenKind, start: usize, end: usize) -> usize {
        self.enter(kind, text.start(start), text.end(end))
    }

    /// Open and close a token spanning `start..end` of inline text.
    pub fn token_inline(&mut self, text: &InlineText, kind: TokenKind, start: usize, end: usize) {
        self.token(kind, text.start(start), text.end(end));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_all_line_endings() {
        let lines = split_lines("a\nb\r\nc\rd");
        let spans: Vec<_> = lines.iter().map(|l| (l.start, l.end, l.eol_end)).collect();
        assert_eq!(spans, vec![(0, 1, 2), (2, 3, 5), (5, 6, 7), (7, 8, 8)]);
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("a\n").len(), 1);
    }

    #[test]
    fn points_count_characters() {
        let source = "ab\nçd";
        let index = LineIndex::new(source, &split_lines(source));
        assert_eq!(index.point(0), Point::new(1, 1, 0));
        assert_eq!(index.point(2), Point::new(1, 3, 2));
        assert_eq!(index.point(3), Point::new(2, 1, 3));
        assert_eq!(index.point(5), Point::new(2, 2, 5));
        assert_eq!(index.point(source.len()), Point::new(2, 3, 6));
    }

    #[test]
    fn inline_text_maps_across_prefixes() {
        // "> a\n> bc" with the block quote prefixes stripped.
        let source = "> a\n> bc";
        let text = InlineText::new(
            source,
            &[
                Chunk { start: 2, end: 3, eol: Some((3, 4)) },
                Chunk { start: 6, end: 8, eol: None },
            ],
        );
        assert_eq!(text.text, "a\nbc");
        assert_eq!(text.start(0), 2);
        assert_eq!(text.end(1), 3);
        assert_eq!(text.start(1), 3);
        assert_eq!(text.end(2), 4);
        assert_eq!(text.start(2), 6);
        assert_eq!(text.end(4), 8);
    }
}
