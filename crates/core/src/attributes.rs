//! Directive attribute mapping and its text codec.
//!
//! The reader side folds the `(key, value)` pairs seen in an attribute
//! block into an [`Attributes`] map; the writer side turns a map back into
//! `{#id .class key="value"}` text.

use crate::entity::encode_subset;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

static SHORTCUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r##"^[^\t\n\r "#'.<=>`}]+$"##).expect("shortcut pattern is valid"));

static CLASS_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\t\n\r ]+").expect("class separator pattern is valid"));

/// Insertion-ordered attribute mapping.
///
/// Values are optional: a hand-built tree may carry a key whose value is
/// absent (`null` in JSON). Such entries are kept but never serialized to
/// markdown. Equality compares entries regardless of their order.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    entries: Vec<(String, Option<String>)>,
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|entry| other.entries.contains(entry))
    }
}

impl Eq for Attributes {}

impl Attributes {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. An existing key keeps its slot.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key.into(), Some(value.into()));
    }

    /// Record `key` with an absent value.
    pub fn insert_absent(&mut self, key: impl Into<String>) {
        self.set(key.into(), None);
    }

    fn set(&mut self, key: String, value: Option<String>) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value for `key`; `None` when missing or absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Whether `key` is present, with or without a value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of attribute names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut attributes = Attributes::new();
                while let Some((key, value)) = access.next_entry::<String, Option<String>>()? {
                    attributes.set(key, value);
                }
                Ok(attributes)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

/// Scratch list of `(key, value)` pairs collected while an attribute block
/// is being read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeAccumulator {
    pairs: Vec<(String, String)>,
}

impl AttributeAccumulator {
    /// Append a pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Replace the value of the most recent pair.
    pub fn set_last_value(&mut self, value: impl Into<String>) {
        if let Some(last) = self.pairs.last_mut() {
            last.1 = value.into();
        }
    }

    /// Fold pairs in encounter order: `class` values join with a space,
    /// every other key keeps its last value.
    pub fn finish(self) -> Attributes {
        let mut attributes = Attributes::new();
        for (key, value) in self.pairs {
            let value = match attributes.get("class") {
                Some(class) if key == "class" && !class.is_empty() => format!("{class} {value}"),
                _ => value,
            };
            attributes.insert(key, value);
        }
        attributes
    }
}

/// Whether `value` can be written as a `#id` / `.class` shortcut.
pub fn is_shortcut(value: &str) -> bool {
    SHORTCUT.is_match(value)
}

/// Encode an attribute mapping as `{...}` text, or an empty string when no
/// entry has a value.
///
/// Order: `#id`, `.a.b` shortcut classes, quoted `class` for the rest, then
/// the remaining keys as they were inserted. Values are wrapped in `quote`;
/// the quote and line endings inside values become character references.
pub fn encode(attributes: &Attributes, quote: char) -> String {
    let subset = [quote, '\n', '\r'];
    let quoted = |key: &str, value: &str| {
        if value.is_empty() {
            key.to_string()
        } else {
            format!("{key}={quote}{}{quote}", encode_subset(value, &subset))
        }
    };

    let mut id = None;
    let mut classes = String::new();
    let mut classes_full = String::new();
    let mut values = Vec::new();

    for (key, value) in attributes.iter() {
        let Some(value) = value else { continue };
        match key {
            "id" => {
                id = Some(if is_shortcut(value) {
                    format!("#{value}")
                } else {
                    quoted("id", value)
                });
            }
            "class" => {
                let (short, full): (Vec<&str>, Vec<&str>) = CLASS_SEPARATOR
                    .split(value)
                    .filter(|token| !token.is_empty())
                    .partition(|token| is_shortcut(token));
                classes = if short.is_empty() {
                    String::new()
                } else {
                    format!(".{}", short.join("."))
                };
                classes_full = if full.is_empty() {
                    String::new()
                } else {
                    quoted("class", &full.join(" "))
                };
                if short.is_empty() && full.is_empty() {
                    classes_full = quoted("class", value);
                }
            }
            _ => values.push(quoted(key, value)),
        }
    }

    let mut parts: Vec<String> = Vec::with_capacity(values.len() + 3);
    parts.extend(id);
    if !classes.is_empty() {
        parts.push(classes);
    }
    if !classes_full.is_empty() {
        parts.push(classes_full);
    }
    parts.extend(values);

    if parts.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn folded(pairs: &[(&str, &str)]) -> Attributes {
        let mut accumulator = AttributeAccumulator::default();
        for (key, value) in pairs {
            accumulator.push(*key, *value);
        }
        accumulator.finish()
    }

    #[test]
    fn class_values_merge_in_order() {
        let attributes = folded(&[("class", "a"), ("id", "x"), ("class", "b")]);
        assert_eq!(attributes.get("class"), Some("a b"));
        assert_eq!(attributes.get("id"), Some("x"));
        assert_eq!(attributes.iter().next(), Some(("class", Some("a b"))));
    }

    #[test]
    fn other_keys_keep_last_value() {
        let attributes = folded(&[("id", "a"), ("key", "1"), ("id", "b")]);
        assert_eq!(attributes.get("id"), Some("b"));
        assert_eq!(attributes.len(), 2);
    }

    #[test]
    fn empty_class_is_replaced_not_joined() {
        let attributes = folded(&[("class", ""), ("class", "a")]);
        assert_eq!(attributes.get("class"), Some("a"));
    }

    #[test]
    fn set_last_value_targets_most_recent_pair() {
        let mut accumulator = AttributeAccumulator::default();
        accumulator.push("a", "");
        accumulator.push("b", "");
        accumulator.set_last_value("2");
        let attributes = accumulator.finish();
        assert_eq!(attributes.get("a"), Some(""));
        assert_eq!(attributes.get("b"), Some("2"));
    }

    #[test]
    fn shortcut_class_rejects_syntax_characters() {
        assert!(is_shortcut("a-b_c"));
        for value in ["", "a b", "a.b", "a#b", "a\"b", "a'b", "a<b", "a=b", "a>b", "a`b", "a}b"] {
            assert!(!is_shortcut(value), "{value:?}");
        }
    }

    #[test]
    fn encodes_shortcuts_and_quoted_values() {
        let attributes: Attributes = [("id", "b"), ("class", "c d"), ("key", "e\nf")]
            .into_iter()
            .collect();
        assert_eq!(encode(&attributes, '"'), r#"{#b .c.d key="e&#xA;f"}"#);
    }

    #[test]
    fn id_and_class_come_first() {
        let attributes: Attributes = [("key", "v"), ("class", "x"), ("id", "i")]
            .into_iter()
            .collect();
        assert_eq!(encode(&attributes, '"'), r#"{#i .x key="v"}"#);
    }

    #[test]
    fn unsafe_id_and_classes_fall_back_to_quotes() {
        let attributes: Attributes = [("id", "a b"), ("class", "ok not.ok")]
            .into_iter()
            .collect();
        assert_eq!(
            encode(&attributes, '"'),
            r#"{id="a b" .ok class="not.ok"}"#
        );
    }

    #[test]
    fn empty_values_are_bare_and_absent_values_skipped() {
        let mut attributes = Attributes::new();
        attributes.insert("hidden", "");
        attributes.insert_absent("gone");
        assert_eq!(encode(&attributes, '"'), "{hidden}");

        let mut only_absent = Attributes::new();
        only_absent.insert_absent("gone");
        assert_eq!(encode(&only_absent, '"'), "");
    }

    #[test]
    fn blank_class_keeps_its_value() {
        let blank: Attributes = [("class", "  ")].into_iter().collect();
        assert_eq!(encode(&blank, '"'), r#"{class="  "}"#);
        let empty: Attributes = [("class", "")].into_iter().collect();
        assert_eq!(encode(&empty, '"'), "{class}");
        let spaced: Attributes = [("class", " a  b ")].into_iter().collect();
        assert_eq!(encode(&spaced, '"'), "{.a.b}");
    }

    #[test]
    fn active_quote_is_encoded() {
        let attributes: Attributes = [("title", r#"say "hi" it's"#)].into_iter().collect();
        assert_eq!(
            encode(&attributes, '"'),
            r#"{title="say &#x22;hi&#x22; it's"}"#
        );
        assert_eq!(
            encode(&attributes, '\''),
            r#"{title='say "hi" it&#x27;s'}"#
        );
    }

    #[test]
    fn deserializes_null_as_absent() {
        let attributes: Attributes = serde_json::from_str(r#"{"a":"1","b":null}"#).unwrap();
        assert_eq!(attributes.get("a"), Some("1"));
        assert_eq!(attributes.get("b"), None);
        assert!(attributes.contains_key("b"));
        assert_eq!(serde_json::to_string(&attributes).unwrap(), r#"{"a":"1","b":null}"#);
    }

    #[test]
    fn equality_ignores_entry_order() {
        let a: Attributes = [("id", "x"), ("title", "t")].into_iter().collect();
        let b: Attributes = [("title", "t"), ("id", "x")].into_iter().collect();
        assert_eq!(a, b);
        let c: Attributes = [("title", "t")].into_iter().collect();
        assert_ne!(a, c);
    }
}
