//! Argument table: argument.yaml normalized into full argument specs.
//!
//! <group>:
//!     <argument>:
//!         type: checkbox|select|textarea|input|datetime|...
//!         value: <default>
//!         option (optional): allowed values
//!         validate (optional): datetime
//!         display (optional): hide|disabled

use crate::deep;
use crate::literal::{ArgType, infer_type};
use serde_json::{Map, Value, json};

pub const STORAGE: &str = "Storage";

/// Build the argument table from the raw argument source.
///
/// Fields declared as a bare literal get their type inferred; a bare sequence
/// is shorthand for a select over its items, defaulting to the first.
/// Attributes written explicitly in the source always win over inferred ones.
pub fn build_argument_table(raw: &Value) -> Value {
    let mut data = Value::Object(Map::new());

    for (path, value) in deep::iter(raw, 2) {
        let name = path.leaf().unwrap_or_default();
        let declared = normalize(value);

        let default = declared.get("value").unwrap_or(&Value::Null);
        let option = declared.get("option").and_then(Value::as_array);
        let typ = infer_type(name, default, option.map(Vec::as_slice));

        let mut arg = Map::new();
        arg.insert("type".into(), json!(typ.as_str()));
        arg.insert("value".into(), json!(""));
        if typ == ArgType::Datetime {
            arg.insert("validate".into(), json!("datetime"));
        }
        if let Value::Object(declared) = declared {
            for (k, v) in declared {
                arg.insert(k, v);
            }
        }

        deep::set(&mut data, path, Value::Object(arg));
    }

    deep::set(&mut data, [STORAGE, STORAGE], storage_spec());
    data
}

/// Scratch space shared across tasks: never shown, never validated.
fn storage_spec() -> Value {
    json!({
        "type": ArgType::Storage.as_str(),
        "value": {},
        "valuetype": "ignore",
        "display": "disabled",
    })
}

fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(_) => value.clone(),
        Value::Array(items) => json!({
            "value": items.first().cloned().unwrap_or(Value::Null),
            "option": items,
        }),
        other => json!({ "value": other }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn infers_and_merges_explicit_fields() {
        let raw = json!({
            "Scheduler": {
                "Enable": false,
                "NextRun": "2020-01-01 00:00:00",
                "Command": "Alas",
                "ServerUpdate": {"value": "00:00", "display": "hide"},
            },
            "Campaign": {
                "Mode": {"value": "normal", "option": ["normal", "hard"]},
                "Fleet": [1, 2, 3],
                "Forced": {"value": 1, "type": "lock"},
            },
        });
        let table = build_argument_table(&raw);

        assert_eq!(table["Scheduler"]["Enable"], json!({"type": "checkbox", "value": false}));
        assert_eq!(
            table["Scheduler"]["NextRun"],
            json!({"type": "datetime", "value": "2020-01-01 00:00:00", "validate": "datetime"})
        );
        assert_eq!(
            table["Scheduler"]["ServerUpdate"],
            json!({"type": "input", "value": "00:00", "display": "hide"})
        );
        assert_eq!(table["Campaign"]["Mode"]["type"], json!("select"));
        assert_eq!(
            table["Campaign"]["Fleet"],
            json!({"type": "select", "value": 1, "option": [1, 2, 3]})
        );
        assert_eq!(table["Campaign"]["Forced"]["type"], json!("lock"));
    }

    #[test]
    fn storage_group_is_always_present() {
        let table = build_argument_table(&json!({}));
        assert_eq!(table["Storage"]["Storage"]["type"], json!("storage"));
        assert_eq!(table["Storage"]["Storage"]["display"], json!("disabled"));
        assert_eq!(table["Storage"]["Storage"]["value"], json!({}));
    }

    #[test]
    fn partial_spec_without_value_defaults_to_empty_string() {
        let table = build_argument_table(&json!({"G": {"F": {"option": ["a"]}}}));
        assert_eq!(table["G"]["F"], json!({"type": "select", "value": "", "option": ["a"]}));
    }
}
