//! Migration engine: persisted user configs re-derived under the current
//! schema.
//!
//! ```text
//!  args.json -----+
//!                 +-----> migrate -----> <config_dir>/<name>.json
//! (old) <name>.json
//! ```
//!
//! The new document is always built from the schema defaults and selectively
//! filled from the old document. The old document is never modified.

pub mod callback;
pub mod env;
pub mod redirect;
pub mod transform;

pub use callback::{save_callback, save_callback_at};
pub use env::apply_constrained_overrides;
pub use redirect::{PathSpec, RedirectionRule, parse_rules};
pub use transform::Transform;

use crate::buckets::{
    CAMPAIGN_MAIN, COALITION_STAGE, COALITIONS, DEFAULT_STAGES, EVENT_STAGE, EVENTS,
    GEMS_FARMINGS, RAIDS, WAR_ARCHIVES,
};
use crate::compile::ARGS_FILE;
use crate::deep::{self, Path};
use crate::io;
use crate::literal::{ArgType, coerce};
use crate::registry::{Registry, Server};
use crate::settings::Settings;
use crate::source::{REDIRECT_FILE, REGISTRY_FILE};
use anyhow::Context;
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::time::Instant;
use tracing::instrument;

pub const STATS_ID: &str = "Alas.DropRecord.AzurStatsID";
pub const PACKAGE_NAME: &str = "Alas.Emulator.PackageName";
pub const TEMPLATE: &str = "template";

#[derive(Debug, Clone)]
pub struct ConfigUpdater {
    args: Value,
    registry: Registry,
    rules: Vec<RedirectionRule>,
    constrained_environment: bool,
    config_dir: PathBuf,
}

impl ConfigUpdater {
    pub fn new(args: Value, registry: Registry, rules: Vec<RedirectionRule>) -> Self {
        Self {
            args,
            registry,
            rules,
            constrained_environment: false,
            config_dir: PathBuf::from("./config"),
        }
    }

    /// Compiled schema from `output_dir`, registry and rules from `source_dir`.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let args_path = settings.output_dir.join(ARGS_FILE);
        let args = io::read_document(&args_path)
            .with_context(|| format!("no compiled schema at {}", args_path.display()))?;
        let registry: Registry =
            serde_json::from_value(io::read_optional(&settings.source_dir.join(REGISTRY_FILE))?)
                .context("bad registry")?;
        let rules = parse_rules(&io::read_optional(&settings.source_dir.join(REDIRECT_FILE))?)?;

        Ok(Self::new(args, registry, rules)
            .constrained_environment(settings.constrained_environment)
            .config_dir(settings.config_dir.clone()))
    }

    pub fn constrained_environment(mut self, enabled: bool) -> Self {
        self.constrained_environment = enabled;
        self
    }

    pub fn config_dir(mut self, dir: PathBuf) -> Self {
        self.config_dir = dir;
        self
    }

    /// Derive a config valid under the current schema from `old`.
    pub fn migrate(&self, old: &Value, is_template: bool) -> Value {
        let mut new = Value::Object(Map::new());

        for (path, spec) in deep::iter(&self.args, 3) {
            let value = resolve(old, &path, spec, is_template);
            deep::set(&mut new, path, coerce(value, spec));
        }

        if is_template {
            deep::set(&mut new, STATS_ID, Value::Null);
        } else {
            let id = deep::get_some(old, STATS_ID)
                .cloned()
                .unwrap_or_else(|| json!(uuid::Uuid::new_v4().simple().to_string()));
            deep::set_default(&mut new, STATS_ID, id);
        }

        let package = deep::get_str(&new, PACKAGE_NAME).unwrap_or("cn").to_string();
        let server = self.registry.to_server(&package);
        if !is_template {
            self.refresh_events(&mut new, server);
        }
        self.forbid_campaign_main(&mut new, server);
        force_stage(&mut new, EVENTS.iter().chain(WAR_ARCHIVES), EVENT_STAGE);
        force_stage(&mut new, COALITIONS.iter(), COALITION_STAGE);

        if !is_template {
            let mut fired = 0;
            for rule in &self.rules {
                if rule.apply(old, &mut new) {
                    fired += 1;
                }
            }
            tracing::debug!(fired, total = self.rules.len(), "redirections applied");
        }

        if self.constrained_environment {
            apply_constrained_overrides(&mut new, &self.args);
        }
        new
    }

    /// The latest event of `server` for `task`, as recorded at compile time.
    fn latest_event(&self, task: &str, server: Server) -> Option<Value> {
        deep::get(&self.args, [task, "Campaign", "Event", server.as_str()])
            .filter(|v| v.as_str().is_some_and(|s| !s.is_empty()))
            .cloned()
    }

    fn refresh_events(&self, new: &mut Value, server: Server) {
        for task in EVENTS.iter().chain(RAIDS).chain(COALITIONS) {
            if let Some(latest) = self.latest_event(task, server) {
                deep::set(new, [*task, "Campaign", "Event"], latest);
            }
        }
        for task in GEMS_FARMINGS {
            let current = deep::get(new, [*task, "Campaign", "Event"]);
            if current.is_none_or(|v| v.as_str() == Some(CAMPAIGN_MAIN)) {
                continue;
            }
            if let Some(latest) = self.latest_event(task, server) {
                deep::set(new, [*task, "Campaign", "Event"], latest);
            }
        }
    }

    /// War archives have no main campaign to fall back to.
    fn forbid_campaign_main(&self, new: &mut Value, server: Server) {
        for task in WAR_ARCHIVES {
            let current = deep::get(new, [*task, "Campaign", "Event"]);
            if current.and_then(Value::as_str) != Some(CAMPAIGN_MAIN) {
                continue;
            }
            if let Some(latest) = self.latest_event(task, server) {
                deep::set(new, [*task, "Campaign", "Event"], latest);
            }
        }
    }

    /// Read `<config_dir>/<name>.json` (empty if missing) and migrate it.
    pub fn read_file(&self, name: &str, is_template: bool) -> anyhow::Result<Value> {
        let old = io::read_optional(&self.config_path(name))?;
        Ok(self.migrate(&old, is_template))
    }

    pub fn write_file(&self, name: &str, data: &Value) -> anyhow::Result<()> {
        io::write_json(&self.config_path(name), data)
    }

    /// Read, migrate and write back one config.
    #[instrument(skip(self))]
    pub fn update_file(&self, name: &str, is_template: bool) -> anyhow::Result<Value> {
        let started = Instant::now();
        let data = self.read_file(name, is_template)?;
        self.write_file(name, &data)?;
        tracing::info!(elapsed = ?started.elapsed(), "config updated");
        Ok(data)
    }

    fn config_path(&self, name: &str) -> PathBuf {
        self.config_dir.join(format!("{name}.json"))
    }
}

/// Old value for `path`, unless the schema default must be used.
fn resolve(old: &Value, path: &Path, spec: &Value, is_template: bool) -> Value {
    let default = spec.get("value").cloned().unwrap_or(Value::Null);
    let typ = spec.get("type").and_then(Value::as_str).and_then(ArgType::parse);
    let hidden = spec.get("display").and_then(Value::as_str) == Some("hide");

    let schema_owned = typ.is_some_and(ArgType::is_schema_owned)
        || (hidden && typ != Some(ArgType::Stored));
    match deep::get(old, path) {
        _ if is_template || schema_owned => default,
        None | Some(Value::Null) => default,
        Some(Value::String(s)) if s.is_empty() => default,
        Some(value) => value.clone(),
    }
}

/// Time-limited content never keeps a main-campaign default stage.
fn force_stage<'a>(new: &mut Value, tasks: impl Iterator<Item = &'a &'static str>, stage: &str) {
    for task in tasks {
        let path = Path::from([*task, "Campaign", "Name"]);
        let is_default = deep::get(new, &path)
            .and_then(Value::as_str)
            .is_some_and(|name| DEFAULT_STAGES.contains(&name));
        if is_default {
            deep::set(new, path, json!(stage));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args() -> Value {
        json!({
            "Alas": {
                "Emulator": {
                    "PackageName": {"type": "select", "value": "auto", "option": ["auto", "com.YoStarEN.AzurLane"]},
                    "Serial": {"type": "input", "value": "auto"},
                },
                "DropRecord": {
                    "AzurStatsID": {"type": "input", "value": null, "display": "hide"},
                    "CombatRecord": {"type": "select", "value": "do_not", "option": ["do_not", "save", "upload", "save_and_upload"]},
                },
            },
            "Main": {
                "Scheduler": {
                    "Command": {"type": "input", "value": "Main", "display": "hide"},
                    "NextRun": {"type": "datetime", "value": "2020-01-01 00:00:00", "validate": "datetime"},
                    "Enable": {"type": "checkbox", "value": false},
                },
                "Campaign": {"Name": {"type": "input", "value": "7-2"}},
                "Storage": {"Storage": {"type": "storage", "value": {}, "valuetype": "ignore", "display": "disabled"}},
                "Fleet": {"Lock": {"type": "lock", "value": 1}},
            },
            "Event": {
                "Campaign": {
                    "Name": {"type": "input", "value": "12-4"},
                    "Event": {
                        "type": "select", "value": "campaign_main",
                        "option": ["event_a", "event_b"],
                        "cn": "event_b", "en": "event_a", "jp": "", "tw": "",
                        "option_bold": ["", "event_a", "event_b"],
                    },
                },
            },
            "WarArchives": {
                "Campaign": {
                    "Name": {"type": "input", "value": "12-4"},
                    "Event": {"type": "select", "value": "campaign_main", "option": ["war_archives_a"],
                              "cn": "war_archives_a", "en": "war_archives_a", "jp": "", "tw": ""},
                },
            },
            "GemsFarming": {
                "Campaign": {
                    "Event": {"type": "select", "value": "campaign_main", "option": ["event_a", "event_b"],
                              "cn": "event_b", "en": "event_a", "jp": "", "tw": ""},
                },
            },
        })
    }

    fn updater() -> ConfigUpdater {
        let registry: Registry =
            serde_yaml::from_str("packages: {com.YoStarEN.AzurLane: en}\n").unwrap();
        ConfigUpdater::new(args(), registry, Vec::new())
    }

    #[test]
    fn template_uses_schema_defaults() {
        let new = updater().migrate(&json!({"Main": {"Scheduler": {"Enable": true}}}), true);
        assert_eq!(new["Main"]["Scheduler"]["Enable"], json!(false));
        assert_eq!(new["Main"]["Scheduler"]["NextRun"], json!("2020-01-01 00:00:00"));
        assert_eq!(new["Main"]["Storage"]["Storage"], json!({}));
        assert_eq!(new["Alas"]["DropRecord"]["AzurStatsID"], Value::Null);
        // Stage invariants hold for templates too.
        assert_eq!(new["Event"]["Campaign"]["Name"], json!("D3"));
        assert_eq!(new["WarArchives"]["Campaign"]["Event"], json!("war_archives_a"));
    }

    #[test]
    fn user_values_survive_unless_schema_owned() {
        let old = json!({"Main": {
            "Scheduler": {"Enable": "True", "Command": "Other", "NextRun": ""},
            "Campaign": {"Name": "3-4"},
            "Fleet": {"Lock": 5},
        }});
        let new = updater().migrate(&old, false);
        assert_eq!(new["Main"]["Scheduler"]["Enable"], json!(true));
        assert_eq!(new["Main"]["Scheduler"]["Command"], json!("Main"));
        assert_eq!(new["Main"]["Scheduler"]["NextRun"], json!("2020-01-01 00:00:00"));
        assert_eq!(new["Main"]["Campaign"]["Name"], json!("3-4"));
        assert_eq!(new["Main"]["Fleet"]["Lock"], json!(1));
    }

    #[test]
    fn unknown_option_falls_back_to_default() {
        let old = json!({"Alas": {"DropRecord": {"CombatRecord": "print"}}});
        let new = updater().migrate(&old, false);
        assert_eq!(new["Alas"]["DropRecord"]["CombatRecord"], json!("do_not"));
    }

    #[test]
    fn old_document_is_untouched() {
        let old = json!({"Event": {"Campaign": {"Name": "12-4"}}});
        let before = old.clone();
        updater().migrate(&old, false);
        assert_eq!(old, before);
    }

    #[test]
    fn stats_id_is_generated_once() {
        let u = updater();
        let first = u.migrate(&json!({}), false);
        let id = first["Alas"]["DropRecord"]["AzurStatsID"].as_str().unwrap().to_string();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

        let second = u.migrate(&first, false);
        assert_eq!(second["Alas"]["DropRecord"]["AzurStatsID"], json!(id));
    }

    #[test]
    fn events_follow_acting_server() {
        let old = json!({"Alas": {"Emulator": {"PackageName": "com.YoStarEN.AzurLane"}}});
        let new = updater().migrate(&old, false);
        assert_eq!(new["Event"]["Campaign"]["Event"], json!("event_a"));

        let new = updater().migrate(&json!({}), false);
        assert_eq!(new["Event"]["Campaign"]["Event"], json!("event_b"));
    }

    #[test]
    fn default_stage_is_replaced() {
        let old = json!({"WarArchives": {"Campaign": {"Name": "12-4"}}, "Main": {"Campaign": {"Name": "12-4"}}});
        let new = updater().migrate(&old, false);
        assert_eq!(new["WarArchives"]["Campaign"]["Name"], json!("D3"));
        assert_eq!(new["Main"]["Campaign"]["Name"], json!("12-4"));
    }

    #[test]
    fn gems_farming_on_main_campaign_is_not_refreshed() {
        let old = json!({"GemsFarming": {"Campaign": {"Event": "campaign_main"}}});
        let new = updater().migrate(&old, false);
        assert_eq!(new["GemsFarming"]["Campaign"]["Event"], json!("campaign_main"));

        let old = json!({"GemsFarming": {"Campaign": {"Event": "event_a"}}});
        let new = updater().migrate(&old, false);
        assert_eq!(new["GemsFarming"]["Campaign"]["Event"], json!("event_b"));
    }

    #[test]
    fn redirections_run_for_user_configs_only() {
        let rule = RedirectionRule::new("Main.Old.Name", "Main.Campaign.Name", None);
        let u = ConfigUpdater::new(args(), Registry::default(), vec![rule]);
        let old = json!({"Main": {"Old": {"Name": "3-4"}}});
        assert_eq!(u.migrate(&old, false)["Main"]["Campaign"]["Name"], json!("3-4"));
        assert_eq!(u.migrate(&old, true)["Main"]["Campaign"]["Name"], json!("7-2"));
    }

    #[test]
    fn constrained_environment_overrides() {
        let u = updater().constrained_environment(true);
        let old = json!({"Alas": {"DropRecord": {"CombatRecord": "save"}}});
        let new = u.migrate(&old, false);
        assert_eq!(new["Alas"]["DropRecord"]["CombatRecord"], json!("do_not"));
        assert_eq!(new["Alas"]["Emulator"]["Serial"], json!("127.0.0.1:5555"));
    }

    #[test]
    fn update_file_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let u = updater().config_dir(dir.path().to_path_buf());
        std::fs::write(
            dir.path().join("alas.json"),
            r#"{"Main": {"Campaign": {"Name": "3-4"}}}"#,
        )
        .unwrap();

        let data = u.update_file("alas", false).unwrap();
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("alas.json")).unwrap())
                .unwrap();
        assert_eq!(written, data);
        assert_eq!(written["Main"]["Campaign"]["Name"], json!("3-4"));
    }
}
