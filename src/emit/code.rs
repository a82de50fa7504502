//! Generated accessor declarations.
//!
//! One declaration per argument-table leaf, grouped by argument group. Each
//! target language gets a [`LiteralRenderer`] that maps every literal kind to
//! a safe literal in that language.

use crate::deep;
use crate::literal::{self, ArgType, DATETIME_FORMAT, LiteralKind};
use chrono::{Datelike, NaiveDateTime, Timelike};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Language of the generated declarations file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CodeTarget {
    #[default]
    Python,
    Rust,
}

impl CodeTarget {
    pub fn file_name(self) -> &'static str {
        match self {
            CodeTarget::Python => "config_generated.py",
            CodeTarget::Rust => "config_generated.rs",
        }
    }

    fn renderer(self) -> &'static dyn LiteralRenderer {
        match self {
            CodeTarget::Python => &Python,
            CodeTarget::Rust => &Rust,
        }
    }
}

pub trait LiteralRenderer {
    /// Text before the first declaration.
    fn header(&self) -> &'static str;

    /// Text after the last declaration.
    fn footer(&self) -> &'static str {
        ""
    }

    /// Comment line opening a group.
    fn group_marker(&self, group: &str) -> String;

    /// One declaration, `value` already coerced against its spec.
    fn declaration(&self, name: &str, value: &Value, typ: Option<ArgType>) -> String;

    /// Trailing comment listing the permitted options.
    fn option_comment(&self, option: &[Value]) -> String;
}

/// Render every `group.field` of the argument table as a declaration.
pub fn render_declarations(argument: &Value, target: CodeTarget) -> String {
    let renderer = target.renderer();
    let mut lines = vec![renderer.header().to_string()];
    let mut current: Option<String> = None;

    for (path, spec) in deep::iter(argument, 2) {
        let [group, field] = path.segments() else {
            continue;
        };
        if current.as_ref() != Some(group) {
            if current.is_some() {
                lines.push(String::new());
            }
            lines.push(renderer.group_marker(group));
            current = Some(group.clone());
        }

        let value = literal::coerce(spec.get("value").cloned().unwrap_or(Value::Null), spec);
        let typ = spec.get("type").and_then(Value::as_str).and_then(ArgType::parse);
        let mut line = renderer.declaration(&format!("{group}_{field}"), &value, typ);
        if let Some(option) = spec.get("option").and_then(Value::as_array) {
            if !option.is_empty() {
                line.push_str(&renderer.option_comment(option));
            }
        }
        lines.push(line);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out.push_str(renderer.footer());
    out
}

fn option_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct Python;

const PYTHON_HEADER: &str = r#"import datetime

# This file was automatically generated by confgen.
# Don't modify it manually.


class GeneratedConfig:
    """
    Auto generated configuration
    """
"#;

impl LiteralRenderer for Python {
    fn header(&self) -> &'static str {
        PYTHON_HEADER
    }

    fn group_marker(&self, group: &str) -> String {
        format!("    # Group `{group}`")
    }

    fn declaration(&self, name: &str, value: &Value, typ: Option<ArgType>) -> String {
        format!("    {name} = {}", python_literal(value, typ))
    }

    fn option_comment(&self, option: &[Value]) -> String {
        let items: Vec<String> = option.iter().map(option_text).collect();
        format!("  # {}", items.join(", "))
    }
}

fn python_literal(value: &Value, typ: Option<ArgType>) -> String {
    match (LiteralKind::of(value), value) {
        (kind, Value::String(s))
            if kind == LiteralKind::Datetime || typ == Some(ArgType::Datetime) =>
        {
            python_datetime(s).unwrap_or_else(|| python_str(s))
        }
        (_, Value::Null) => "None".to_string(),
        (_, Value::Bool(true)) => "True".to_string(),
        (_, Value::Bool(false)) => "False".to_string(),
        (_, Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) => python_float(f),
            _ => n.to_string(),
        },
        (_, Value::String(s)) => python_str(s),
        (_, Value::Array(items)) => {
            let items: Vec<String> = items.iter().map(|v| python_literal(v, None)).collect();
            format!("[{}]", items.join(", "))
        }
        (_, Value::Object(map)) => {
            let items: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", python_str(k), python_literal(v, None)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
    }
}

/// `repr()` of a Python `float`: exponent form below 1e-4 and from 1e16 up.
fn python_float(f: f64) -> String {
    let abs = f.abs();
    if f.is_finite() && f != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{f:e}");
        let Some((mantissa, exp)) = sci.split_once('e') else {
            return sci;
        };
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exp),
        };
        format!("{mantissa}e{sign}{digits:0>2}")
    } else if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

/// `repr()` of a Python `str`: single quotes unless the text contains a
/// single quote and no double quote.
fn python_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// `repr()` of a `datetime.datetime`; trailing zero seconds are omitted.
fn python_datetime(s: &str) -> Option<String> {
    let dt = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).ok()?;
    let mut parts = vec![
        dt.year().to_string(),
        dt.month().to_string(),
        dt.day().to_string(),
        dt.hour().to_string(),
        dt.minute().to_string(),
    ];
    if dt.second() != 0 {
        parts.push(dt.second().to_string());
    }
    Some(format!("datetime.datetime({})", parts.join(", ")))
}

pub struct Rust;

const RUST_HEADER: &str = "\
// This file was automatically generated by confgen.
// Don't modify it manually.
#![allow(non_upper_case_globals)]

/// Auto generated configuration
pub struct GeneratedConfig;

impl GeneratedConfig {";

impl LiteralRenderer for Rust {
    fn header(&self) -> &'static str {
        RUST_HEADER
    }

    fn footer(&self) -> &'static str {
        "}\n"
    }

    fn group_marker(&self, group: &str) -> String {
        format!("    // Group `{group}`")
    }

    fn declaration(&self, name: &str, value: &Value, _typ: Option<ArgType>) -> String {
        let (ty, literal) = rust_literal(value);
        format!("    pub const {name}: {ty} = {literal};")
    }

    fn option_comment(&self, option: &[Value]) -> String {
        let items: Vec<String> = option.iter().map(option_text).collect();
        format!("  // {}", items.join(", "))
    }
}

/// Rust type and literal for a value. Nested values are embedded as JSON text.
fn rust_literal(value: &Value) -> (&'static str, String) {
    match value {
        Value::Null => ("Option<&str>", "None".to_string()),
        Value::Bool(b) => ("bool", b.to_string()),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => ("i64", i.to_string()),
            (None, Some(f)) => ("f64", format!("{f:?}")),
            _ => ("&str", format!("{:?}", n.to_string())),
        },
        Value::String(s) => ("&str", format!("{s:?}")),
        Value::Array(_) | Value::Object(_) => ("&str", format!("{:?}", value.to_string())),
    }
}
