//! Characters that would change meaning if written literally, and the
//! escaping that keeps them literal.

use crate::construct::ConstructName;
use crate::state::Info;
use mdirective_core::NodeKind;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Write;

/// A character that must be escaped in some context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsafe {
    /// The character.
    pub character: char,
    /// Pattern that must match right before the character.
    pub before: Option<String>,
    /// Pattern that must match right after the character.
    pub after: Option<String>,
    /// Only unsafe at the start of a line.
    pub at_break: bool,
    /// Only unsafe inside one of these constructs (empty: anywhere).
    pub in_construct: Vec<ConstructName>,
    /// Never unsafe inside one of these constructs.
    pub not_in_construct: Vec<ConstructName>,
    /// Unsafe as the first character of a node written right after a
    /// sibling of this kind.
    pub after_sibling: Option<NodeKind>,
    /// Unsafe as the last character of a node written right before a
    /// sibling of this kind.
    pub before_sibling: Option<NodeKind>,
    /// Only unsafe right after an escaped copy of the same character.
    pub after_escaped: bool,
}

impl Unsafe {
    /// `character` is unsafe everywhere.
    pub fn new(character: char) -> Self {
        Self {
            character,
            before: None,
            after: None,
            at_break: false,
            in_construct: Vec::new(),
            not_in_construct: Vec::new(),
            after_sibling: None,
            before_sibling: None,
            after_escaped: false,
        }
    }

    /// Require `pattern` before the character.
    pub fn before(mut self, pattern: impl Into<String>) -> Self {
        self.before = Some(pattern.into());
        self
    }

    /// Require `pattern` after the character.
    pub fn after(mut self, pattern: impl Into<String>) -> Self {
        self.after = Some(pattern.into());
        self
    }

    /// Only at the start of a line.
    pub fn at_break(mut self) -> Self {
        self.at_break = true;
        self
    }

    /// Only inside `constructs`.
    pub fn in_construct(mut self, constructs: &[ConstructName]) -> Self {
        self.in_construct = constructs.to_vec();
        self
    }

    /// Never inside `constructs`.
    pub fn not_in_construct(mut self, constructs: &[ConstructName]) -> Self {
        self.not_in_construct = constructs.to_vec();
        self
    }

    /// Only right after a sibling of `kind`.
    pub fn after_sibling(mut self, kind: NodeKind) -> Self {
        self.after_sibling = Some(kind);
        self
    }

    /// Only right before a sibling of `kind`.
    pub fn before_sibling(mut self, kind: NodeKind) -> Self {
        self.before_sibling = Some(kind);
        self
    }

    /// Only right after the same character, once that one is escaped.
    pub fn after_escaped(mut self) -> Self {
        self.after_escaped = true;
        self
    }

    /// `(before)character(?:after)`, with the before part in group 1.
    pub fn compile(&self) -> Result<Regex, regex::Error> {
        let mut before = String::new();
        if self.at_break {
            before.push_str(r"[\r\n][\t ]*");
        }
        if let Some(pattern) = &self.before {
            let _ = write!(before, "(?:{pattern})");
        }
        let mut source = String::new();
        if !before.is_empty() {
            let _ = write!(source, "({before})");
        }
        source.push_str(&regex::escape(self.character.encode_utf8(&mut [0; 4])));
        if let Some(pattern) = &self.after {
            let _ = write!(source, "(?:{pattern})");
        }
        Regex::new(&source)
    }

    /// Whether the pattern applies with `stack` open.
    pub fn in_scope(&self, stack: &[ConstructName]) -> bool {
        let any_open = |list: &[ConstructName]| list.iter().any(|name| stack.contains(name));
        (self.in_construct.is_empty() || any_open(&self.in_construct))
            && !any_open(&self.not_in_construct)
    }
}

/// An [`Unsafe`] with its compiled expression.
#[derive(Debug, Clone)]
pub(crate) struct CompiledUnsafe {
    pub pattern: Unsafe,
    pub expression: Regex,
}

impl CompiledUnsafe {
    pub fn new(pattern: Unsafe) -> Result<Self, regex::Error> {
        let expression = pattern.compile()?;
        Ok(Self { pattern, expression })
    }
}

/// Patterns of plain markdown syntax.
pub fn base_unsafe() -> Vec<Unsafe> {
    use ConstructName::{HeadingAtx, Label, Phrasing};
    let eol = r"[\r\n]";
    vec![
        Unsafe::new('\t').after(eol).in_construct(&[Phrasing]),
        Unsafe::new('\t').before(eol).in_construct(&[Phrasing]),
        Unsafe::new('\r').in_construct(&[HeadingAtx]),
        Unsafe::new('\n').in_construct(&[HeadingAtx]),
        Unsafe::new(' ').after(eol).in_construct(&[Phrasing]),
        Unsafe::new(' ').before(eol).in_construct(&[Phrasing]),
        Unsafe::new('!').after(r"\[").in_construct(&[Phrasing]),
        Unsafe::new('#').at_break(),
        Unsafe::new('#').after(r"(?:[\r\n]|$)").in_construct(&[HeadingAtx]),
        Unsafe::new('&').after("[#A-Za-z]").in_construct(&[Phrasing]),
        Unsafe::new('(').before(r"\]").in_construct(&[Phrasing]),
        Unsafe::new(')').before(r"\d+").at_break(),
        Unsafe::new('*').after(r"(?:[ \t\r\n*])").at_break(),
        Unsafe::new('*').in_construct(&[Phrasing]),
        Unsafe::new('+').after(r"(?:[ \t\r\n])").at_break(),
        Unsafe::new('-').after(r"(?:[ \t\r\n-])").at_break(),
        Unsafe::new('.').before(r"\d+").after(r"(?:[ \t\r\n]|$)").at_break(),
        Unsafe::new('<').after("[!/?A-Za-z]").at_break(),
        Unsafe::new('<').after("[!/?A-Za-z]").in_construct(&[Phrasing]),
        Unsafe::new('=').at_break(),
        Unsafe::new('>').at_break(),
        Unsafe::new('[').at_break(),
        Unsafe::new('[').in_construct(&[Phrasing]),
        Unsafe::new('[').in_construct(&[Label]),
        Unsafe::new('\\').after(eol).in_construct(&[Phrasing]),
        Unsafe::new(']').in_construct(&[Label]),
        Unsafe::new('_').at_break(),
        Unsafe::new('_').in_construct(&[Phrasing]),
        Unsafe::new('`').at_break(),
        Unsafe::new('`').in_construct(&[Phrasing]),
        Unsafe::new('~').at_break(),
    ]
}

#[derive(Debug, Clone, Copy)]
struct Conditions {
    before: bool,
    after: bool,
}

const UNCONDITIONAL: Conditions = Conditions {
    before: false,
    after: false,
};

fn record(
    positions: &mut Vec<usize>,
    conditions: &mut HashMap<usize, Conditions>,
    position: usize,
    found: Conditions,
) {
    match conditions.get_mut(&position) {
        Some(existing) => {
            existing.before &= found.before;
            existing.after &= found.after;
        }
        None => {
            positions.push(position);
            conditions.insert(position, found);
        }
    }
}

/// Escape `input` so it reads back literally, given what surrounds it.
///
/// Conditional escapes are skipped when the neighbour they depend on is
/// part of `input` and escaped unconditionally. Patterns marked `after_escaped` run last, so
/// they see every other escape. Backslashes that would start an escape
/// are doubled.
pub(crate) fn safe(stack: &[ConstructName], patterns: &[CompiledUnsafe], input: &str, info: &Info) -> String {
    let value = format!("{}{}{}", info.before, input, info.after);
    let mut positions: Vec<usize> = Vec::new();
    let mut conditions: HashMap<usize, Conditions> = HashMap::new();
    let (escaped_runs, patterns): (Vec<&CompiledUnsafe>, Vec<&CompiledUnsafe>) = patterns
        .iter()
        .filter(|compiled| compiled.pattern.in_scope(stack))
        .partition(|compiled| compiled.pattern.after_escaped);

    for compiled in patterns {
        let pattern = &compiled.pattern;
        if pattern.after_sibling.is_some() || pattern.before_sibling.is_some() {
            if pattern.after_sibling.is_some_and(|kind| info.previous == Some(kind))
                && input.starts_with(pattern.character)
            {
                record(&mut positions, &mut conditions, info.before.len(), UNCONDITIONAL);
            }
            if pattern.before_sibling.is_some_and(|kind| info.next == Some(kind))
                && input.ends_with(pattern.character)
            {
                let last = info.before.len() + input.len() - pattern.character.len_utf8();
                record(&mut positions, &mut conditions, last, UNCONDITIONAL);
            }
            continue;
        }
        let found = Conditions {
            before: pattern.before.is_some() || pattern.at_break,
            after: pattern.after.is_some(),
        };
        for captures in compiled.expression.captures_iter(&value) {
            let Some(whole) = captures.get(0) else { continue };
            let lead = if found.before {
                captures.get(1).map_or(0, |m| m.len())
            } else {
                0
            };
            record(&mut positions, &mut conditions, whole.start() + lead, found);
        }
    }

    // In position order, so an escape found here can enable the next one.
    for compiled in escaped_runs {
        let character = compiled.pattern.character;
        let found = Conditions {
            before: false,
            after: compiled.pattern.after.is_some(),
        };
        for whole in compiled.expression.find_iter(&value) {
            let position = whole.start();
            let previous = position.checked_sub(character.len_utf8());
            if previous.is_some_and(|previous| {
                previous >= info.before.len()
                    && conditions.contains_key(&previous)
                    && value.get(previous..).is_some_and(|rest| rest.starts_with(character))
            }) {
                record(&mut positions, &mut conditions, position, found);
            }
        }
    }

    positions.sort_unstable();
    let end = value.len() - info.after.len();
    let mut start = info.before.len();
    let mut result = String::with_capacity(value.len());
    let unconditional = |position: usize| {
        conditions
            .get(&position)
            .is_some_and(|found| !found.before && !found.after)
    };

    for (index, &position) in positions.iter().enumerate() {
        if position < start || position >= end {
            continue;
        }
        let found = conditions[&position];
        let next_escaped = position + 1 < end
            && positions.get(index + 1) == Some(&(position + 1))
            && found.after
            && unconditional(position + 1);
        let previous_escaped = index > 0
            && position > info.before.len()
            && positions[index - 1] + 1 == position
            && found.before
            && unconditional(position - 1);
        if next_escaped || previous_escaped {
            continue;
        }

        if start != position {
            result.push_str(&escape_backslashes(&value[start..position], "\\"));
        }
        start = position;

        let Some(character) = value[position..].chars().next() else { continue };
        if character.is_ascii_punctuation() {
            result.push('\\');
        } else {
            let _ = write!(result, "&#x{:X};", u32::from(character));
            start += character.len_utf8();
        }
    }

    result.push_str(&escape_backslashes(&value[start..end], &info.after));
    result
}

/// Double each backslash that is followed by ASCII punctuation, looking
/// into `after` for the last one.
fn escape_backslashes(value: &str, after: &str) -> String {
    let bytes = value.as_bytes();
    let mut result = String::with_capacity(value.len());
    let mut start = 0;
    for (index, _) in value.match_indices('\\') {
        let next = bytes.get(index + 1).or_else(|| after.as_bytes().first());
        if next.is_some_and(u8::is_ascii_punctuation) {
            result.push_str(&value[start..index]);
            result.push('\\');
            start = index;
        }
    }
    result.push_str(&value[start..]);
    result
}
