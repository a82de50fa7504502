//! Task grouping (task.yaml) and dashboard (dashboard.yaml) tables.
//!
//! task.yaml shape:
//! {
//!   "<TaskGroup>": {
//!     "menu": "collapse" | "list",     // optional
//!     "page": "setting" | "tool",      // optional
//!     "tasks": { "<Task>": ["<Group>", ...] }
//!   }
//! }
//!
//! dashboard.yaml shape:
//! { "<Task>": ["<Group>", ...] }

use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Raw task group as it appears in task.yaml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskGroupSpec {
    #[serde(default)]
    pub menu: Option<String>,

    #[serde(default)]
    pub page: Option<String>,

    #[serde(default)]
    pub tasks: IndexMap<String, Vec<String>>,
}

pub type TaskTable = IndexMap<String, TaskGroupSpec>;

/// Task -> groups, for tasks that exist outside any task group.
pub type DashboardTable = IndexMap<String, Vec<String>>;

pub fn parse_task_table(raw: &Value) -> anyhow::Result<TaskTable> {
    serde_json::from_value(raw.clone()).context("task table is not shaped as <group>: {menu, page, tasks}")
}

pub fn parse_dashboard(raw: &Value) -> anyhow::Result<DashboardTable> {
    serde_json::from_value(raw.clone()).context("dashboard is not shaped as <task>: [groups]")
}

impl TaskGroupSpec {
    pub fn task_names(&self) -> impl Iterator<Item = &String> {
        self.tasks.keys()
    }
}
