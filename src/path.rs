//! Property paths inside a single document.
//!
//! A property path addresses nested front-matter values with dot and bracket
//! segments, e.g. `owner.name`, `tags[1]` or `rows[0].cells[2]`. The same
//! syntax is produced by [`flatten`] so every listed path can be looked up
//! again with [`lookup`].

use crate::value::{Map, Value};

/// A segment in a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Mapping key, written `a` or `.a`
    ///
    /// A field that looks like a number also indexes arrays, so `items.0`
    /// and `items[0]` address the same element.
    Field(String),

    /// Sequence index, written `[0]`
    ///
    /// On a mapping it falls back to the key `"0"`.
    Index(usize),
}

/// Splits a property path into segments.
///
/// Empty segments are dropped, so `a..b` and `a.b` are equivalent, as are
/// `a[0]` and `a.[0]`.
///
/// # Examples
/// ```
/// use livevars::path::{parse_path, PathSegment};
///
/// assert_eq!(
///     parse_path("rows[1].name"),
///     vec![
///         PathSegment::Field("rows".into()),
///         PathSegment::Index(1),
///         PathSegment::Field("name".into()),
///     ]
/// );
/// ```
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;

    for ch in path.chars() {
        match ch {
            '.' if !in_brackets => push_segment(&mut segments, &mut current, false),
            '[' => {
                push_segment(&mut segments, &mut current, false);
                in_brackets = true;
            }
            ']' if in_brackets => {
                push_segment(&mut segments, &mut current, true);
                in_brackets = false;
            }
            _ => current.push(ch),
        }
    }
    push_segment(&mut segments, &mut current, in_brackets);
    segments
}

fn push_segment(segments: &mut Vec<PathSegment>, current: &mut String, bracketed: bool) {
    if current.is_empty() {
        return;
    }
    let text = std::mem::take(current);
    let segment = match text.parse::<usize>() {
        Ok(index) if bracketed => PathSegment::Index(index),
        _ => PathSegment::Field(text),
    };
    segments.push(segment);
}

/// Looks up a property path inside a document's properties.
///
/// Returns `None` for an empty path or when any segment is missing.
pub fn lookup<'a>(root: &'a Map, path: &str) -> Option<&'a Value> {
    let segments = parse_path(path);
    let (first, rest) = segments.split_first()?;
    let start = match first {
        PathSegment::Field(key) => root.get(key)?,
        PathSegment::Index(index) => root.get(&index.to_string())?,
    };
    rest.iter().try_fold(start, step)
}

fn step<'a>(value: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Object(map), PathSegment::Field(key)) => map.get(key),
        (Value::Object(map), PathSegment::Index(index)) => map.get(&index.to_string()),
        (Value::Array(arr), PathSegment::Index(index)) => arr.get(*index),
        (Value::Array(arr), PathSegment::Field(key)) => arr.get(key.parse::<usize>().ok()?),
        _ => None,
    }
}

/// Lists every addressable path in a document's properties, in pre-order.
///
/// Containers are listed before their children, so both `a` and `a.b` are
/// present when `a` is a mapping; sequence elements use `[i]`.
///
/// # Examples
/// ```
/// use livevars::path::flatten;
/// use livevars::value::{Map, Value};
///
/// let mut props = Map::new();
/// props.insert("tags".into(), Value::Array(vec![Value::from("x")]));
/// let paths: Vec<String> = flatten(&props).into_iter().map(|(p, _)| p).collect();
/// assert_eq!(paths, vec!["tags", "tags[0]"]);
/// ```
pub fn flatten(root: &Map) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    for (key, value) in root {
        flatten_into(key.clone(), value, &mut out);
    }
    out
}

fn flatten_into<'a>(path: String, value: &'a Value, out: &mut Vec<(String, &'a Value)>) {
    out.push((path.clone(), value));
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(format!("{}.{}", path, key), child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(format!("{}[{}]", path, index), child, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::json_to_value;
    use serde_json::json;

    fn props(value: serde_json::Value) -> Map {
        match json_to_value(value) {
            Value::Object(map) => map,
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn parses_mixed_segments() {
        assert_eq!(
            parse_path("a.b[0].c"),
            vec![
                PathSegment::Field("a".into()),
                PathSegment::Field("b".into()),
                PathSegment::Index(0),
                PathSegment::Field("c".into()),
            ]
        );
        assert!(parse_path("").is_empty());
        assert_eq!(parse_path("x[key]"), vec![
            PathSegment::Field("x".into()),
            PathSegment::Field("key".into()),
        ]);
    }

    #[test]
    fn looks_up_nested_values() {
        let p = props(json!({"a": {"b": [{"c": 7}]}}));
        assert_eq!(lookup(&p, "a.b[0].c"), Some(&Value::Integer(7)));
        assert_eq!(lookup(&p, "a.b.0.c"), Some(&Value::Integer(7)));
        assert_eq!(lookup(&p, "a.b[1]"), None);
        assert_eq!(lookup(&p, "a.missing"), None);
        assert_eq!(lookup(&p, ""), None);
    }

    #[test]
    fn flattens_containers_and_leaves() {
        let p = props(json!({"owner": {"name": "ada"}, "tags": ["x", "y"], "n": 1}));
        let paths: Vec<String> = flatten(&p).into_iter().map(|(path, _)| path).collect();
        assert_eq!(
            paths,
            vec!["owner", "owner.name", "tags", "tags[0]", "tags[1]", "n"]
        );
    }

    #[test]
    fn every_flattened_path_resolves() {
        let p = props(json!({"a": [{"b": {"c": true}}, 2]}));
        for (path, value) in flatten(&p) {
            assert_eq!(lookup(&p, &path), Some(value), "path {}", path);
        }
    }
}
