//! Whole-document reads and atomic write-replace.
//!
//! YAML and JSON both land in `serde_json::Value` with key order preserved.
//! Writes go to a temp file in the destination directory and are renamed over
//! the target, so readers never see a half-written document.

use anyhow::{Context, bail};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Read a YAML or JSON document (by extension; anything else parses as YAML).
pub fn read_document(path: &Path) -> anyhow::Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_document(&text, path)
}

/// Like [`read_document`], but a missing file reads as an empty mapping.
pub fn read_optional(path: &Path) -> anyhow::Result<Value> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "missing, using empty document");
        return Ok(Value::Object(Map::new()));
    }
    read_document(path)
}

fn parse_document(text: &str, path: &Path) -> anyhow::Result<Value> {
    let is_json = path.extension().is_some_and(|ext| ext == "json");

    let value = if is_json {
        serde_json::from_str::<Value>(text)
            .with_context(|| format!("parse json {}", path.display()))?
    } else {
        let yaml: serde_yaml::Value = serde_yaml::from_str(text)
            .with_context(|| format!("parse yaml {}", path.display()))?;
        serde_json::to_value(yaml)
            .with_context(|| format!("convert yaml {} to a document", path.display()))?
    };

    match value {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(_) => Ok(value),
        other => bail!(
            "{} must contain a mapping at the top level, found {}",
            path.display(),
            kind_name(&other)
        ),
    }
}

/// Write `doc` as pretty JSON, atomically.
pub fn write_json(path: &Path, doc: &Value) -> anyhow::Result<()> {
    let mut text = serde_json::to_string_pretty(doc)?;
    text.push('\n');
    write_text(path, &text)
}

/// Write `text`, atomically.
pub fn write_text(path: &Path, text: &str) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(text.as_bytes())?;
    tmp.persist(path)
        .with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn yaml_keeps_key_order_and_stringifies_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.yaml");
        fs::write(&path, "Zeta:\n  b: 1\n  a: true\nAlpha:\n  1: x\n").unwrap();

        let doc = read_document(&path).unwrap();
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Zeta", "Alpha"]);
        assert_eq!(doc["Alpha"]["1"], json!("x"));
        assert_eq!(doc["Zeta"], json!({"b": 1, "a": true}));
    }

    #[test]
    fn missing_optional_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let doc = read_optional(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn top_level_scalar_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2]").unwrap();
        let err = read_document(&path).unwrap_err();
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn write_then_read_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");
        let doc = json!({"B": 1, "A": {"x": "文件"}});
        write_json(&path, &doc).unwrap();
        assert_eq!(read_document(&path).unwrap(), doc);
    }
}
