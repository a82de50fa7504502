//! Schema loader: raw definition sources, normalized into documents.
//!
//! Layout of a source directory:
//! - argument.yaml   <group>: <field>: literal | partial spec
//! - task.yaml       <task_group>: {menu, page, tasks: <task>: [groups]}
//! - dashboard.yaml  <task>: [groups]
//! - default.yaml    <task>: <group>: <field>: literal
//! - override.yaml   <task>: <group>: <field>: literal | spec object
//! - gui.yaml        <gui_group>: <key>: text
//! - registry.yaml   packages / channel_packages / server_lists
//! - redirect.yaml   rules: [{since, source, target, transform}]
//! - events.md       event catalog table
//!
//! Every file except argument.yaml and task.yaml is optional.

pub mod task;

pub use task::{DashboardTable, TaskGroupSpec, TaskTable, parse_dashboard, parse_task_table};

use crate::event::{self, Event};
use crate::io;
use crate::migrate::redirect::{RedirectionRule, parse_rules};
use crate::registry::Registry;
use anyhow::{Context, bail};
use serde_json::{Map, Value};
use std::path::Path;

pub const ARGUMENT_FILE: &str = "argument.yaml";
pub const TASK_FILE: &str = "task.yaml";
pub const DASHBOARD_FILE: &str = "dashboard.yaml";
pub const DEFAULT_FILE: &str = "default.yaml";
pub const OVERRIDE_FILE: &str = "override.yaml";
pub const GUI_FILE: &str = "gui.yaml";
pub const REGISTRY_FILE: &str = "registry.yaml";
pub const REDIRECT_FILE: &str = "redirect.yaml";
pub const EVENT_FILE: &str = "events.md";

/// All raw inputs of one compile run.
#[derive(Debug, Clone)]
pub struct Sources {
    pub argument: Value,
    pub task: TaskTable,
    pub dashboard: DashboardTable,
    pub default: Value,
    pub overrides: Value,
    pub gui: Value,
    pub registry: Registry,
    pub redirects: Vec<RedirectionRule>,
    /// Latest first.
    pub events: Vec<Event>,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            argument: empty(),
            task: TaskTable::new(),
            dashboard: DashboardTable::new(),
            default: empty(),
            overrides: empty(),
            gui: empty(),
            registry: Registry::default(),
            redirects: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl Sources {
    /// Load and shape-check every source under `dir`.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let argument = io::read_document(&dir.join(ARGUMENT_FILE))?;
        check_argument_shape(&argument)
            .with_context(|| format!("bad {}", dir.join(ARGUMENT_FILE).display()))?;

        let task = parse_task_table(&io::read_document(&dir.join(TASK_FILE))?)
            .with_context(|| format!("bad {}", dir.join(TASK_FILE).display()))?;
        let dashboard = parse_dashboard(&io::read_optional(&dir.join(DASHBOARD_FILE))?)
            .with_context(|| format!("bad {}", dir.join(DASHBOARD_FILE).display()))?;

        let registry: Registry =
            serde_json::from_value(io::read_optional(&dir.join(REGISTRY_FILE))?)
                .with_context(|| format!("bad {}", dir.join(REGISTRY_FILE).display()))?;
        let redirects = parse_rules(&io::read_optional(&dir.join(REDIRECT_FILE))?)
            .with_context(|| format!("bad {}", dir.join(REDIRECT_FILE).display()))?;

        let event_path = dir.join(EVENT_FILE);
        let events = if event_path.exists() {
            event::parse_event_file(&event_path.to_string_lossy())?
        } else {
            tracing::debug!(path = %event_path.display(), "no event catalog");
            Vec::new()
        };

        let sources = Self {
            argument,
            task,
            dashboard,
            default: io::read_optional(&dir.join(DEFAULT_FILE))?,
            overrides: io::read_optional(&dir.join(OVERRIDE_FILE))?,
            gui: io::read_optional(&dir.join(GUI_FILE))?,
            registry,
            redirects,
            events,
        };
        tracing::info!(
            dir = %dir.display(),
            task_groups = sources.task.len(),
            events = sources.events.len(),
            rules = sources.redirects.len(),
            "loaded sources"
        );
        Ok(sources)
    }
}

/// argument.yaml must be <group>: <field>: ..., with every group a mapping.
fn check_argument_shape(argument: &Value) -> anyhow::Result<()> {
    let Some(groups) = argument.as_object() else {
        bail!("argument table must be a mapping");
    };
    for (group, fields) in groups {
        if !fields.is_object() {
            bail!("argument group `{}` must be a mapping of fields", group);
        }
    }
    Ok(())
}

fn empty() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn loads_directory_with_optional_files_missing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(ARGUMENT_FILE),
            "Scheduler:\n  Enable: false\n  Command: Alas\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(TASK_FILE),
            "Daily:\n  tasks:\n    Commission: [Scheduler]\n",
        )
        .unwrap();

        let sources = Sources::load(dir.path()).unwrap();
        assert_eq!(sources.task["Daily"].tasks["Commission"], vec!["Scheduler"]);
        assert!(sources.events.is_empty());
        assert!(sources.redirects.is_empty());
        assert_eq!(sources.default, empty());
    }

    #[test]
    fn scalar_group_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ARGUMENT_FILE), "Scheduler: 3\n").unwrap();
        fs::write(dir.path().join(TASK_FILE), "{}\n").unwrap();
        let err = Sources::load(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Scheduler"));
    }
}
