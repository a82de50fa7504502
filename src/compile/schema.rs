//! Schema tree: per-task argument specs with default and override layers.
//!
//! ```text
//!     task.yaml ---+
//! argument.yaml ---+-----> args.json
//! override.yaml ---+
//!  default.yaml ---+
//! ```

use crate::compile::argument::STORAGE;
use crate::deep::{self, Path};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::literal::{ArgType, LiteralKind, same_kind};
use crate::source::{DashboardTable, TaskTable};
use serde_json::{Map, Value, json};

/// Fields whose value type may legitimately differ between layers.
const INTERVAL_FIELDS: &[&str] = &["SuccessInterval", "FailureInterval"];

/// Which value source a layer represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// User-editable defaults.
    Default,
    /// Values the user may not change; hidden unless stated otherwise.
    Override,
}

/// Expand every task's group list into a `Task -> Group -> ArgumentSpec` tree.
///
/// Tasks come from the task groups first, then from the dashboard. Every task
/// implicitly carries the storage group. Unknown groups are reported and
/// skipped.
pub fn build_schema_tree(
    argument: &Value,
    task: &TaskTable,
    dashboard: &DashboardTable,
    diagnostics: &mut Diagnostics,
) -> Value {
    let mut data = Value::Object(Map::new());

    let grouped = task.values().flat_map(|g| g.tasks.iter());
    for (task_name, groups) in grouped.chain(dashboard.iter()) {
        let storage = STORAGE.to_string();
        let with_storage = groups
            .iter()
            .chain((!groups.contains(&storage)).then_some(&storage));

        for group in with_storage {
            match argument.get(group) {
                Some(spec) => {
                    deep::set(&mut data, [task_name.as_str(), group.as_str()], spec.clone());
                }
                None => diagnostics.push(Diagnostic::UnknownGroup {
                    task: task_name.clone(),
                    group: group.clone(),
                }),
            }
        }
    }

    data
}

/// Apply one layer (task -> group -> field -> value) onto the tree.
///
/// Default entries replace the field's `value`. Override entries are either a
/// bare value (sets `value`, hides the field) or a spec object whose keys are
/// merged in; a spec object that sets a non-null `value` is hidden unless it
/// sets `display` itself or is a `state`/`lock` marker.
///
/// With `validate`, entries naming unknown paths, changing the value type or
/// falling outside the option set are reported and skipped.
pub fn apply_layer(
    tree: &mut Value,
    layer: &Value,
    kind: Layer,
    validate: bool,
    diagnostics: &mut Diagnostics,
) {
    for (path, value) in deep::iter(layer, 3) {
        if validate && !check_entry(tree, &path, value, diagnostics) {
            continue;
        }

        match (kind, value) {
            (Layer::Override, Value::Object(fields)) => {
                let mut fields = fields.clone();
                let marker = fields
                    .get("type")
                    .and_then(Value::as_str)
                    .and_then(ArgType::parse)
                    .is_some_and(ArgType::is_schema_owned);
                let sets_value = fields.get("value").is_some_and(|v| !v.is_null());
                if !marker && sets_value && !fields.contains_key("display") {
                    fields.insert("display".into(), json!("hide"));
                }
                for (k, v) in fields {
                    deep::set(tree, path.child(k), v);
                }
            }
            (Layer::Override, _) => {
                deep::set(tree, path.child("value"), value.clone());
                deep::set(tree, path.child("display"), json!("hide"));
            }
            (Layer::Default, _) => {
                deep::set(tree, path.child("value"), value.clone());
            }
        }
    }
}

fn check_entry(tree: &Value, path: &Path, value: &Value, diagnostics: &mut Diagnostics) -> bool {
    let Some(old) = deep::get_some(tree, path) else {
        diagnostics.push(Diagnostic::UnknownPath {
            path: path.to_string(),
        });
        return false;
    };

    let new_value = match value {
        Value::Object(fields) => match fields.get("value") {
            Some(v) => v,
            None => return true,
        },
        other => other,
    };
    let old_value = old.get("value").unwrap_or(&Value::Null);

    let exempt = path.leaf().is_some_and(|f| INTERVAL_FIELDS.contains(&f));
    if !exempt && !same_kind(old_value, new_value) {
        diagnostics.push(Diagnostic::TypeMismatch {
            path: path.to_string(),
            value: new_value.clone(),
            new_kind: LiteralKind::of(new_value),
            old_kind: LiteralKind::of(old_value),
        });
        return false;
    }

    if let Some(option) = old.get("option").and_then(Value::as_array) {
        if !option.contains(new_value) {
            diagnostics.push(Diagnostic::NotAnOption {
                path: path.to_string(),
                value: new_value.clone(),
            });
            return false;
        }
    }

    true
}

/// Tie each task's `Scheduler.Command` to the task's own name and hide it.
pub fn bind_commands(tree: &mut Value, task: &TaskTable) {
    for task_name in task.values().flat_map(|g| g.task_names()) {
        let command = Path::from(vec![task_name.as_str(), "Scheduler", "Command"]);
        if deep::get_some(tree, &command).is_none() {
            continue;
        }
        deep::set(tree, command.child("value"), json!(task_name));
        deep::set(tree, command.child("display"), json!("hide"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::argument::build_argument_table;
    use crate::source::parse_task_table;
    use pretty_assertions::assert_eq;

    fn fixture() -> (Value, TaskTable) {
        let argument = build_argument_table(&json!({
            "Scheduler": {"Enable": false, "Command": "", "SuccessInterval": 0},
            "Campaign": {
                "Name": "12-4",
                "Mode": {"value": "normal", "option": ["normal", "hard"]},
            },
        }));
        let task = parse_task_table(&json!({
            "Farm": {"tasks": {
                "Main": ["Scheduler", "Campaign"],
                "Ghost": ["Scheduler", "Nope"],
            }},
        }))
        .unwrap();
        (argument, task)
    }

    fn tree() -> (Value, TaskTable, Diagnostics) {
        let (argument, task) = fixture();
        let mut diags = Diagnostics::new();
        let tree = build_schema_tree(&argument, &task, &DashboardTable::new(), &mut diags);
        (tree, task, diags)
    }

    #[test]
    fn tasks_get_groups_plus_storage() {
        let (tree, _, diags) = tree();
        let groups: Vec<&String> = tree["Main"].as_object().unwrap().keys().collect();
        assert_eq!(groups, vec!["Scheduler", "Campaign", "Storage"]);
        assert_eq!(
            diags.iter().cloned().collect::<Vec<_>>(),
            vec![Diagnostic::UnknownGroup {
                task: "Ghost".into(),
                group: "Nope".into()
            }]
        );
        assert!(tree["Ghost"]["Scheduler"].is_object());
    }

    #[test]
    fn dashboard_tasks_are_included() {
        let (argument, task) = fixture();
        let mut dashboard = DashboardTable::new();
        dashboard.insert("Dashboard".into(), vec!["Campaign".into()]);
        let mut diags = Diagnostics::new();
        let tree = build_schema_tree(&argument, &task, &dashboard, &mut diags);
        assert!(tree["Dashboard"]["Campaign"]["Name"].is_object());
        assert!(tree["Dashboard"]["Storage"]["Storage"].is_object());
    }

    #[test]
    fn override_wins_over_default() {
        let (mut tree, _, mut diags) = tree();
        let default = json!({"Main": {"Campaign": {"Name": "7-2", "Mode": "hard"}}});
        let overrides = json!({"Main": {"Campaign": {"Name": "3-4"}}});
        apply_layer(&mut tree, &default, Layer::Default, true, &mut diags);
        apply_layer(&mut tree, &overrides, Layer::Override, true, &mut diags);

        assert_eq!(tree["Main"]["Campaign"]["Name"]["value"], json!("3-4"));
        assert_eq!(tree["Main"]["Campaign"]["Name"]["display"], json!("hide"));
        assert_eq!(tree["Main"]["Campaign"]["Mode"]["value"], json!("hard"));
        assert!(tree["Main"]["Campaign"]["Mode"].get("display").is_none());
    }

    #[test]
    fn rejected_entries_are_skipped_not_fatal() {
        let (mut tree, _, _) = tree();
        let mut diags = Diagnostics::new();
        let default = json!({"Main": {
            "Campaign": {"Mode": "nightmare", "Name": 5, "Missing": 1},
            "Scheduler": {"SuccessInterval": "30, 60", "Enable": true},
        }});
        apply_layer(&mut tree, &default, Layer::Default, true, &mut diags);

        assert_eq!(diags.len(), 3);
        assert_eq!(tree["Main"]["Campaign"]["Mode"]["value"], json!("normal"));
        assert_eq!(tree["Main"]["Campaign"]["Name"]["value"], json!("12-4"));
        assert_eq!(tree["Main"]["Scheduler"]["SuccessInterval"]["value"], json!("30, 60"));
        assert_eq!(tree["Main"]["Scheduler"]["Enable"]["value"], json!(true));
    }

    #[test]
    fn structured_override_display_rules() {
        let (mut tree, _, _) = tree();
        let mut diags = Diagnostics::new();
        let overrides = json!({"Main": {
            "Campaign": {
                "Name": {"value": "1-1"},
                "Mode": {"value": "hard", "display": "disabled"},
            },
            "Scheduler": {"Enable": {"type": "lock", "value": true}},
        }});
        apply_layer(&mut tree, &overrides, Layer::Override, true, &mut diags);

        assert!(diags.is_empty());
        assert_eq!(tree["Main"]["Campaign"]["Name"]["display"], json!("hide"));
        assert_eq!(tree["Main"]["Campaign"]["Mode"]["display"], json!("disabled"));
        assert_eq!(tree["Main"]["Scheduler"]["Enable"]["type"], json!("lock"));
        assert!(tree["Main"]["Scheduler"]["Enable"].get("display").is_none());
    }

    #[test]
    fn commands_are_bound_to_task_names() {
        let (mut tree, task, _) = tree();
        bind_commands(&mut tree, &task);
        assert_eq!(tree["Main"]["Scheduler"]["Command"]["value"], json!("Main"));
        assert_eq!(tree["Ghost"]["Scheduler"]["Command"]["value"], json!("Ghost"));
        assert_eq!(tree["Main"]["Scheduler"]["Command"]["display"], json!("hide"));
    }
}
