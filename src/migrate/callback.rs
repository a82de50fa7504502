//! Companion writes triggered by a single field change in the GUI.

use crate::deep::Path;
use crate::literal::DATETIME_FORMAT;
use chrono::{Local, NaiveDateTime};
use serde_json::{Value, json};

/// Extra `(key, value)` pairs to store after `key` was set to `value`.
///
/// Changing an emotion value (e.g. `Main.Emotion.Fleet1Value`) stamps the
/// matching record field (`Main.Emotion.Fleet1Record`) with the current time.
pub fn save_callback(key: &str, value: &Value) -> Vec<(String, Value)> {
    save_callback_at(key, value, Local::now().naive_local())
}

pub fn save_callback_at(key: &str, _value: &Value, now: NaiveDateTime) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    if key.contains("Emotion") && key.contains("Value") {
        let path = Path::from(key);
        let record = path.leaf().unwrap_or_default().replace("Value", "Record");
        out.push((
            path.sibling(record).to_string(),
            json!(now.format(DATETIME_FORMAT).to_string()),
        ));
    }
    out
}
