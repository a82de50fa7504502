//! Forced overrides for the constrained (cloud phone) environment.

use crate::deep::{self, Path};
use serde_json::{Value, json};

/// Connectivity fields pinned to the only values that work there.
pub const CONSTRAINED_CONNECTIVITY: &[(&str, &str)] = &[
    ("Alas.Emulator.Serial", "127.0.0.1:5555"),
    ("Alas.Emulator.ScreenshotMethod", "DroidCast_raw"),
    ("Alas.Emulator.ControlMethod", "MaaTouch"),
];

const DROP_RECORD: &str = "Alas.DropRecord";

/// Pin connectivity fields and drop local saving from every drop-record
/// field. Fields are taken from the schema `args`, values live in `data`.
pub fn apply_constrained_overrides(data: &mut Value, args: &Value) {
    for (path, value) in CONSTRAINED_CONNECTIVITY {
        deep::set(data, *path, json!(value));
    }

    let fields: Vec<String> = deep::get(args, DROP_RECORD)
        .and_then(Value::as_object)
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default();
    for field in fields {
        let path = Path::from(DROP_RECORD).child(field);
        let replaced = match deep::get(data, &path).and_then(Value::as_str) {
            Some("save_and_upload") => "upload",
            Some("save") => "do_not",
            _ => continue,
        };
        tracing::debug!(%path, to = replaced, "local save disabled");
        deep::set(data, path, json!(replaced));
    }
}
