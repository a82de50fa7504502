//! Deep-path access over nested JSON documents.
//!
//! Every source, the compiled schema and every persisted config are plain
//! `serde_json::Value` trees (insertion-ordered via `preserve_order`). These
//! helpers read and write them by [`Path`], where a path is either a dotted
//! string or an explicit segment list.
//!
//! Reads never fail on missing intermediate keys; writes create intermediate
//! mappings as needed and replace non-mapping intermediates.

pub mod path;

pub use path::Path;

use serde_json::{Map, Value};

/// Value at `path`, or `None` if any segment is missing.
///
/// A key that is present with a `null` value returns `Some(&Value::Null)`.
pub fn get<'a>(doc: &'a Value, path: impl Into<Path>) -> Option<&'a Value> {
    let path = path.into();
    let mut cur = doc;
    for seg in path.segments() {
        cur = cur.as_object()?.get(seg)?;
    }
    Some(cur)
}

/// Mutable value at `path`, or `None` if any segment is missing.
pub fn get_mut(doc: &mut Value, path: impl Into<Path>) -> Option<&mut Value> {
    let path = path.into();
    let mut cur = doc;
    for seg in path.segments() {
        cur = cur.as_object_mut()?.get_mut(seg)?;
    }
    Some(cur)
}

/// Value at `path`, or `default` if missing.
pub fn get_or(doc: &Value, path: impl Into<Path>, default: Value) -> Value {
    get(doc, path).cloned().unwrap_or(default)
}

/// Value at `path` when it is present and not null.
pub fn get_some<'a>(doc: &'a Value, path: impl Into<Path>) -> Option<&'a Value> {
    get(doc, path).filter(|v| !v.is_null())
}

/// String value at `path`, if present and a string.
pub fn get_str<'a>(doc: &'a Value, path: impl Into<Path>) -> Option<&'a str> {
    get(doc, path).and_then(Value::as_str)
}

/// Set `value` at `path`, creating intermediate mappings.
pub fn set(doc: &mut Value, path: impl Into<Path>, value: Value) {
    let path = path.into();
    let Some((last, parents)) = path.segments().split_last() else {
        *doc = value;
        return;
    };

    let mut cur = doc;
    for seg in parents {
        let Some(map) = ensure_object(cur) else {
            return;
        };
        cur = map
            .entry(seg.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if let Some(map) = ensure_object(cur) {
        map.insert(last.clone(), value);
    }
}

/// Set `value` at `path` only if the path is absent or null.
pub fn set_default(doc: &mut Value, path: impl Into<Path>, value: Value) {
    let path = path.into();
    if get_some(doc, &path).is_none() {
        set(doc, path, value);
    }
}

/// Remove and return the value at `path`.
pub fn pop(doc: &mut Value, path: impl Into<Path>) -> Option<Value> {
    let path = path.into();
    let (last, parents) = path.segments().split_last()?;

    let mut cur = doc;
    for seg in parents {
        cur = cur.as_object_mut()?.get_mut(seg)?;
    }
    cur.as_object_mut()?.shift_remove(last)
}

/// Remove and return the value at `path`, or `default` if missing.
pub fn pop_or(doc: &mut Value, path: impl Into<Path>, default: Value) -> Value {
    pop(doc, path).unwrap_or(default)
}

/// Iterate `(path, value)` pairs exactly `depth` segments below the root.
///
/// Entries whose value is not a mapping above `depth` are skipped. Order is
/// the document's insertion order. Calling again restarts from the top.
pub fn iter(doc: &Value, depth: usize) -> DeepIter<'_> {
    let mut it = DeepIter {
        depth,
        root: None,
        stack: Vec::new(),
        prefix: Vec::new(),
    };
    if depth == 0 {
        it.root = Some(doc);
    } else if let Value::Object(map) = doc {
        it.stack.push(map.iter());
    }
    it
}

/// Collect the paths at `depth`, for callers that mutate while walking.
pub fn paths(doc: &Value, depth: usize) -> Vec<Path> {
    iter(doc, depth).map(|(p, _)| p).collect()
}

pub struct DeepIter<'a> {
    depth: usize,
    root: Option<&'a Value>,
    stack: Vec<serde_json::map::Iter<'a>>,
    prefix: Vec<&'a str>,
}

impl<'a> Iterator for DeepIter<'a> {
    type Item = (Path, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            return Some((Path::default(), root));
        }

        loop {
            let level = self.stack.len();
            let top = self.stack.last_mut()?;
            match top.next() {
                None => {
                    self.stack.pop();
                    if level > 1 {
                        self.prefix.pop();
                    }
                }
                Some((key, value)) => {
                    if level == self.depth {
                        let mut segments: Vec<String> =
                            self.prefix.iter().map(|s| s.to_string()).collect();
                        segments.push(key.clone());
                        return Some((Path::new(segments), value));
                    }
                    if let Value::Object(map) = value {
                        self.prefix.push(key.as_str());
                        self.stack.push(map.iter());
                    }
                }
            }
        }
    }
}

/// Replace a non-mapping with an empty mapping. Always `Some`.
fn ensure_object(v: &mut Value) -> Option<&mut Map<String, Value>> {
    if !v.is_object() {
        *v = Value::Object(Map::new());
    }
    v.as_object_mut()
}
