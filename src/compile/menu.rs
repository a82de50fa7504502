//! Menu definitions.
//!
//! task.yaml --> menu.json

use crate::source::TaskTable;
use serde::Serialize;
use serde_json::Value;

const MENU_STYLES: &[&str] = &["collapse", "list"];
const PAGE_KINDS: &[&str] = &["setting", "tool"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuEntry {
    pub menu: String,
    pub page: String,
    pub tasks: Vec<String>,
}

/// One menu entry per task group, in task.yaml order.
///
/// Unknown or missing menu styles fall back to `collapse`, page kinds to
/// `setting`.
pub fn build_menu(task: &TaskTable) -> Vec<(String, MenuEntry)> {
    task.iter()
        .map(|(group, spec)| {
            let entry = MenuEntry {
                menu: pick(spec.menu.as_deref(), MENU_STYLES),
                page: pick(spec.page.as_deref(), PAGE_KINDS),
                tasks: spec.task_names().cloned().collect(),
            };
            (group.clone(), entry)
        })
        .collect()
}

/// Menu as a `task_group -> {menu, page, tasks}` document.
pub fn menu_document(menu: &[(String, MenuEntry)]) -> anyhow::Result<Value> {
    let mut doc = serde_json::Map::new();
    for (group, entry) in menu {
        doc.insert(group.clone(), serde_json::to_value(entry)?);
    }
    Ok(Value::Object(doc))
}

fn pick(value: Option<&str>, allowed: &[&str]) -> String {
    match value {
        Some(v) if allowed.contains(&v) => v.to_string(),
        _ => allowed[0].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_task_table;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn defaults_and_order() {
        let task = parse_task_table(&json!({
            "Alas": {"menu": "list", "page": "tool", "tasks": {"Alas": [], "Restart": []}},
            "Daily": {"menu": "grid", "tasks": {"Commission": []}},
            "Empty": {},
        }))
        .unwrap();
        let doc = menu_document(&build_menu(&task)).unwrap();
        assert_eq!(
            doc,
            json!({
                "Alas": {"menu": "list", "page": "tool", "tasks": ["Alas", "Restart"]},
                "Daily": {"menu": "collapse", "page": "setting", "tasks": ["Commission"]},
                "Empty": {"menu": "collapse", "page": "setting", "tasks": []},
            })
        );
    }
}
