//! Literal kinds, argument type inference and value coercion.
//!
//! Raw sources are human-edited YAML, so a field's type is usually implied by
//! the shape of its default literal. The mapping is a closed table evaluated
//! once when the argument table is built:
//!
//! | literal / declaration          | type       |
//! |--------------------------------|------------|
//! | bool                           | `checkbox` |
//! | datetime-shaped string         | `datetime` |
//! | non-empty `option`             | `select`   |
//! | field name contains `Filter`   | `textarea` |
//! | anything else                  | `input`    |

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Timestamp format shared by datetime fields and audit stamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shape of a literal value as it appears in a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Datetime,
    Sequence,
    Mapping,
}

impl LiteralKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_f64() => Self::Float,
            Value::Number(_) => Self::Int,
            Value::String(s) if is_datetime(s) => Self::Datetime,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Sequence,
            Value::Object(_) => Self::Mapping,
        }
    }
}

/// Schema field type of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    Checkbox,
    Select,
    Textarea,
    Input,
    Datetime,
    Storage,
    State,
    Lock,
    Stored,
}

impl ArgType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Textarea => "textarea",
            Self::Input => "input",
            Self::Datetime => "datetime",
            Self::Storage => "storage",
            Self::State => "state",
            Self::Lock => "lock",
            Self::Stored => "stored",
        }
    }

    /// Parse a `type` attribute from a spec document. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        serde_json::from_value(Value::String(s.to_string())).ok()
    }

    /// Types whose value is owned by the schema, never by the user.
    pub fn is_schema_owned(self) -> bool {
        matches!(self, Self::Lock | Self::State)
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `YYYY-MM-DD HH:MM:SS`, zero-padded, and a real calendar date.
pub fn is_datetime(s: &str) -> bool {
    let shaped = s.len() == 19
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            10 => b == b' ',
            13 | 16 => b == b':',
            _ => b.is_ascii_digit(),
        });
    shaped && NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).is_ok()
}

/// Infer the field type of argument `name` from its (normalized) raw spec.
pub fn infer_type(name: &str, value: &Value, option: Option<&[Value]>) -> ArgType {
    match LiteralKind::of(value) {
        LiteralKind::Bool => ArgType::Checkbox,
        LiteralKind::Datetime => ArgType::Datetime,
        _ if option.is_some_and(|o| !o.is_empty()) => ArgType::Select,
        _ if name.contains("Filter") => ArgType::Textarea,
        _ => ArgType::Input,
    }
}

/// Coerce `value` against the spec of the field it is stored into.
///
/// - a value outside a declared option set reverts to the spec default
/// - empty strings become null
/// - "true"/"false" strings become booleans on boolean fields
/// - numeric strings become numbers on numeric fields
pub fn coerce(value: Value, spec: &Value) -> Value {
    let default = spec.get("value").cloned().unwrap_or(Value::Null);

    if let Some(option) = spec.get("option").and_then(Value::as_array) {
        if !option.is_empty() && !option.contains(&value) {
            return default;
        }
    }

    let Value::String(s) = &value else {
        return value;
    };
    if s.is_empty() {
        return Value::Null;
    }

    match LiteralKind::of(&default) {
        LiteralKind::Bool => match s.as_str() {
            "true" | "True" => Value::Bool(true),
            "false" | "False" => Value::Bool(false),
            _ => value,
        },
        LiteralKind::Int => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(value),
        LiteralKind::Float => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(value),
        _ => value,
    }
}

/// Whether `new` may replace `old` under the compile-time type check.
///
/// Absent old values accept anything.
pub fn same_kind(old: &Value, new: &Value) -> bool {
    old.is_null() || LiteralKind::of(old) == LiteralKind::of(new)
}
