//! Named value transforms referenced by redirection rules.
//!
//! Multi-source rules hand a transform the list of source values, in rule
//! order; single-source rules hand it the bare value. A transform that cannot
//! make sense of its input returns `None` and the rule is skipped.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Numeric sum of all sources.
    Sum,
    /// `(save, upload)` flags -> `save_and_upload | save | upload | do_not`.
    Upload,
    /// `(calculate, ignore_warning)` flags -> `calculate_ignore | calculate | ignore`.
    EmotionMode,
    /// `(change, equip)` flags -> `ship_equip | ship | disabled`.
    ChangeShip,
    /// Boolean not.
    Negate,
}

impl Transform {
    pub fn apply(self, value: &Value) -> Option<Value> {
        match self {
            Transform::Sum => sum(value),
            Transform::Upload => {
                let [save, upload] = flags(value)?;
                Some(json!(match (save, upload) {
                    (true, true) => "save_and_upload",
                    (true, false) => "save",
                    (false, true) => "upload",
                    (false, false) => "do_not",
                }))
            }
            Transform::EmotionMode => {
                let [calculate, ignore] = flags(value)?;
                Some(json!(match (calculate, ignore) {
                    (true, true) => "calculate_ignore",
                    (true, false) => "calculate",
                    (false, _) => "ignore",
                }))
            }
            Transform::ChangeShip => {
                let [change, equip] = flags(value)?;
                Some(json!(match (change, equip) {
                    (true, true) => "ship_equip",
                    (true, false) => "ship",
                    (false, _) => "disabled",
                }))
            }
            Transform::Negate => Some(Value::Bool(!truthy(value))),
        }
    }
}

fn sum(value: &Value) -> Option<Value> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    if items.iter().all(|v| v.is_i64()) {
        return Some(json!(items.iter().filter_map(|v| v.as_i64()).sum::<i64>()));
    }
    let mut total = 0.0;
    for item in items {
        total += item.as_f64()?;
    }
    Number::from_f64(total).map(Value::Number)
}

fn flags(value: &Value) -> Option<[bool; 2]> {
    match value.as_array()?.as_slice() {
        [a, b] => Some([truthy(a), truthy(b)]),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(m) => !m.is_empty(),
    }
}
