//! Flat path maps and their reconstruction into nested values
//!
//! A compiled schema writes its output as `path -> value` entries, where a
//! path is dot-separated for object nesting and `[i]`-suffixed for array
//! elements (`tags[0].id`). [`reconstruct`] expands those entries into a
//! nested [`Value`], creating every intermediate container fresh.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde_json::{Map, Value};
use std::iter::Peekable;
use std::str::Chars;

/// Insertion-ordered `path -> value` entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatMap {
    entries: Vec<(String, Value)>,
}

impl FlatMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append an entry; later entries win during reconstruction
    pub fn insert(&mut self, path: impl Into<String>, value: Value) {
        self.entries.push((path.into(), value));
    }

    /// Most recent value written at `path`
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| key == path)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Expand into a nested value
    pub fn into_value(self) -> Value {
        reconstruct(self)
    }
}

impl IntoIterator for FlatMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for FlatMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }
}

/// One step of a flat path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Tokenizer<'a> {
    fn new(path: &'a str) -> Self {
        Self {
            chars: path.chars().peekable(),
        }
    }

    fn tokenize(mut self) -> Vec<Segment> {
        let mut segments = Vec::new();
        while let Some(c) = self.chars.peek().copied() {
            match c {
                '.' => {
                    self.chars.next();
                }
                '[' => {
                    self.chars.next();
                    segments.push(self.bracket());
                }
                _ => segments.push(Segment::Key(self.identifier())),
            }
        }
        segments
    }

    fn identifier(&mut self) -> String {
        let mut key = String::new();
        while let Some(c) = self.chars.peek().copied() {
            if c == '.' || c == '[' {
                break;
            }
            key.push(c);
            self.chars.next();
        }
        key
    }

    /// Contents up to the closing bracket; non-numeric contents are a key
    fn bracket(&mut self) -> Segment {
        let mut text = String::new();
        for c in self.chars.by_ref() {
            if c == ']' {
                break;
            }
            text.push(c);
        }
        match text.parse::<usize>() {
            Ok(index) => Segment::Index(index),
            Err(_) => Segment::Key(text),
        }
    }
}

/// Split a flat path into key and index segments
pub fn tokenize(path: &str) -> Vec<Segment> {
    Tokenizer::new(path).tokenize()
}

/// Build a nested value from flat entries
///
/// Containers are created as arrays when the next segment is an index and as
/// objects otherwise. A container value written where a container of the same
/// shape already exists is merged into it, keeping the entries already there.
/// An empty path addresses the root.
pub fn reconstruct<I>(entries: I) -> Value
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut root = Value::Object(Map::new());
    for (path, value) in entries {
        let mut slot = &mut root;
        for segment in tokenize(&path) {
            slot = descend(slot, &segment);
        }
        place(slot, value);
    }
    root
}

fn descend<'a>(container: &'a mut Value, segment: &Segment) -> &'a mut Value {
    match segment {
        Segment::Key(key) => {
            if !container.is_object() {
                *container = Value::Object(Map::new());
            }
            &mut container[key.as_str()]
        }
        Segment::Index(index) => {
            if !container.is_array() {
                *container = Value::Array(Vec::new());
            }
            if let Some(items) = container.as_array_mut() {
                if items.len() <= *index {
                    items.resize(*index + 1, Value::Null);
                }
            }
            &mut container[*index]
        }
    }
}

fn place(slot: &mut Value, value: Value) {
    match (slot, value) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, item) in incoming {
                existing.entry(key).or_insert(item);
            }
        }
        (Value::Array(_), Value::Array(incoming)) if incoming.is_empty() => {}
        (slot, value) => *slot = value,
    }
}

/// Flatten a nested value into leaf entries
///
/// Scalars and empty containers become entries. Object keys are assumed not
/// to contain `.`, `[` or `]`.
pub fn flatten(value: &Value) -> FlatMap {
    let mut flat = FlatMap::new();
    flatten_into(value, String::new(), &mut flat);
    flat
}

fn flatten_into(value: &Value, path: String, flat: &mut FlatMap) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, item) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                flatten_into(item, child, flat);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(item, format!("{}[{}]", path, index), flat);
            }
        }
        _ => flat.insert(path, value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("tags[0].id"),
            vec![
                Segment::Key("tags".to_string()),
                Segment::Index(0),
                Segment::Key("id".to_string())
            ]
        );
        assert_eq!(
            tokenize("matrix[1][2]"),
            vec![Segment::Key("matrix".to_string()), Segment::Index(1), Segment::Index(2)]
        );
        assert_eq!(tokenize("a.b"), vec![Segment::Key("a".into()), Segment::Key("b".into())]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_reconstruct_nested() {
        let flat: FlatMap = vec![
            ("name.first", json!("A")),
            ("name.last", json!("D")),
            ("tags[0]", json!(1)),
            ("tags[1]", json!(2)),
            ("items[0].id", json!("x")),
            ("age", json!(20)),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            flat.into_value(),
            json!({
                "name": {"first": "A", "last": "D"},
                "tags": [1, 2],
                "items": [{"id": "x"}],
                "age": 20
            })
        );
    }

    #[test]
    fn test_reconstruct_pads_missing_indices() {
        let out = reconstruct(vec![("a[2]".to_string(), json!(true))]);
        assert_eq!(out, json!({"a": [null, null, true]}));
    }

    #[test]
    fn test_placeholders_keep_children() {
        let out = reconstruct(vec![
            ("meta".to_string(), json!({"extra": 1})),
            ("list".to_string(), json!([])),
            ("meta.x".to_string(), json!(2)),
            ("list[0]".to_string(), json!("a")),
            ("empty".to_string(), json!([])),
        ]);
        assert_eq!(out, json!({"meta": {"extra": 1, "x": 2}, "list": ["a"], "empty": []}));
    }

    #[test]
    fn test_root_entry_merges_into_root() {
        let out = reconstruct(vec![
            (String::new(), json!({"unknown": "kept"})),
            ("a".to_string(), json!(1)),
        ]);
        assert_eq!(out, json!({"unknown": "kept", "a": 1}));
    }

    #[test]
    fn test_proto_key_is_an_ordinary_property() {
        let out = reconstruct(vec![("__proto__.polluted".to_string(), json!(true))]);
        assert_eq!(out, json!({"__proto__": {"polluted": true}}));
        assert!(json!({}).get("polluted").is_none());
    }

    #[test]
    fn test_flatten_round_trip() {
        let value = json!({
            "a": {"b": [1, {"c": "x"}], "d": {}},
            "e": [],
            "f": null
        });
        let flat = flatten(&value);
        assert_eq!(flat.get("a.b[1].c"), Some(&json!("x")));
        assert_eq!(flat.get("a.d"), Some(&json!({})));
        assert_eq!(flat.into_value(), value);
    }
}
