//! Localization documents, one per locale.
//!
//! Known text is carried over from the previous document of the same locale.
//! Anything missing defaults to its own dotted key, so a fresh locale file
//! lists every key a translator has to fill in.

use crate::compile::Generator;
use crate::deep::{self, Path};
use crate::registry::{Server, region_prefix};
use serde_json::{Map, Value, json};
use std::collections::HashMap;

const NAME_HELP: &[&str] = &["name", "help"];

/// Literal substitutions applied to every zh-TW text.
const ZH_TW_REPLACEMENTS: &[(&str, &str)] = &[
    ("設置", "設定"),
    ("支持", "支援"),
    ("啓", "啟"),
    ("异", "異"),
    ("服務器", "伺服器"),
    ("文件", "檔案"),
];

/// Build the localization document for `lang`. `old` is only read.
pub fn build_i18n(lang: &str, old: &Value, generator: &Generator) -> Value {
    let mut loader = Loader {
        old,
        new: Value::Object(Map::new()),
    };
    let sources = &generator.sources;

    // Menu and tasks
    for (group, spec) in &sources.task {
        loader.load(Path::from(vec!["Menu", group.as_str()]), NAME_HELP, true);
        for task in spec.task_names() {
            loader.load(Path::from(vec!["Task", task.as_str()]), NAME_HELP, true);
        }
    }

    // Arguments
    let mut current: Option<String> = None;
    for (path, spec) in deep::iter(&generator.argument, 2) {
        let group = &path.segments()[0];
        if current.as_ref() != Some(group) {
            loader.load(Path::from(vec![group.as_str(), "_info"]), NAME_HELP, true);
            current = Some(group.clone());
        }
        loader.load(path.clone(), NAME_HELP, true);
        if let Some(option) = spec.get("option").and_then(Value::as_array) {
            let words: Vec<String> = option.iter().map(option_word).collect();
            let words: Vec<&str> = words.iter().map(String::as_str).collect();
            loader.load(path, &words, false);
        }
    }

    // Event names: same-language server first, then en > cn > jp > tw.
    let own_server = Server::from_lang(lang);
    let chain = own_server
        .into_iter()
        .chain([Server::En, Server::Cn, Server::Jp, Server::Tw]);
    let mut names: HashMap<&str, &str> = HashMap::new();
    for server in chain {
        for event in &sources.events {
            if let Some(name) = event.name(server).filter(|n| !n.is_empty()) {
                names.entry(event.directory.as_str()).or_insert(name);
            }
        }
    }
    let mut events: Vec<_> = sources.events.iter().collect();
    events.sort();
    for event in events {
        let name = names
            .get(event.directory.as_str())
            .copied()
            .unwrap_or(event.directory.as_str());
        deep::set(
            &mut loader.new,
            vec!["Campaign", "Event", event.directory.as_str()],
            json!(name),
        );
    }

    // Package names
    let registry = &sources.registry;
    for (package, server) in &registry.packages {
        let path = vec!["Emulator", "PackageName", package.as_str()];
        if deep::get(&loader.new, path.clone()).and_then(Value::as_str) == Some(package.as_str()) {
            deep::set(
                &mut loader.new,
                path,
                json!(server.as_str().to_uppercase()),
            );
        }
    }
    for (package, (server, channel)) in &registry.channel_packages {
        let main = registry.to_package(*server);
        let name = deep::get(&loader.new, vec!["Emulator", "PackageName", main.as_str()])
            .map(option_word)
            .unwrap_or_else(|| "None".to_string());
        let value = if lang == server.lang() {
            format!("{name} {channel}渠道服 {package}")
        } else {
            format!("{name} {package}")
        };
        deep::set(
            &mut loader.new,
            vec!["Emulator", "PackageName", package.as_str()],
            json!(value),
        );
    }

    // Game server names
    for (server, list) in &registry.server_lists {
        let prefix = region_prefix(server);
        for (index, name) in list.iter().enumerate() {
            let key = format!("{server}-{index}");
            deep::set(
                &mut loader.new,
                vec!["Emulator", "ServerName", key.as_str()],
                json!(format!("[{prefix}] {name}")),
            );
        }
    }

    // GUI text
    for (path, _) in deep::iter(&sources.gui, 2) {
        let [group, key] = path.segments() else {
            continue;
        };
        loader.load(
            Path::from(vec!["Gui", group.as_str()]),
            &[key.as_str()],
            true,
        );
    }

    let mut new = loader.new;
    if lang == "zh-TW" {
        normalize_zh_tw(&mut new);
    }
    new
}

struct Loader<'a> {
    old: &'a Value,
    new: Value,
}

impl Loader<'_> {
    /// Copy `path.<word>` from the old document for each word. Missing text
    /// defaults to the full dotted key, or to the bare word without
    /// `path_default`.
    fn load(&mut self, path: Path, words: &[&str], path_default: bool) {
        for word in words {
            let key = path.child(*word);
            let default = if path_default {
                key.to_string()
            } else {
                word.to_string()
            };
            let value = deep::get_or(self.old, &key, json!(default));
            deep::set(&mut self.new, key, value);
        }
    }
}

fn option_word(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Apply [`ZH_TW_REPLACEMENTS`] to every text three levels deep.
fn normalize_zh_tw(doc: &mut Value) {
    for path in deep::paths(doc, 3) {
        let Some(Value::String(s)) = deep::get_mut(doc, &path) else {
            continue;
        };
        for (before, after) in ZH_TW_REPLACEMENTS {
            if s.contains(before) {
                *s = s.replace(before, after);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::parse_event_text;
    use crate::source::{Sources, parse_task_table};
    use pretty_assertions::assert_eq;

    fn generator() -> Generator {
        let sources = Sources {
            argument: json!({
                "Emulator": {
                    "PackageName": {"value": "auto", "option": ["auto"]},
                    "ServerName": {"value": "disabled", "option": ["disabled"]},
                },
                "Campaign": {"Mode": ["normal", "hard"]},
            }),
            task: parse_task_table(&json!({
                "Alas": {"tasks": {"Alas": ["Emulator"]}},
            }))
            .unwrap(),
            gui: json!({"Button": {"Start": "Start", "Stop": "Stop"}}),
            registry: serde_yaml::from_str(
                "packages:\n  com.bilibili.azurlane: cn\n  com.YoStarEN.AzurLane: en\n\
                 channel_packages:\n  com.bilibili.azurlane.vivo: [cn, vivo]\n\
                 server_lists:\n  cn_android: [紫绯之缘]\n  en: [Avrora]\n",
            )
            .unwrap(),
            events: parse_event_text(
                "| 20230101 | event_a | 活动A | - | イベントA | 活動A |\n\
                 | 20230201 | event_b | - | Event B | - | - |\n",
                "events.md",
            )
            .unwrap(),
            ..Sources::default()
        };
        Generator::compile(sources)
    }

    #[test]
    fn keys_default_to_their_path() {
        let doc = build_i18n("en-US", &json!({}), &generator());
        assert_eq!(doc["Menu"]["Alas"]["name"], json!("Menu.Alas.name"));
        assert_eq!(doc["Task"]["Alas"]["help"], json!("Task.Alas.help"));
        assert_eq!(doc["Campaign"]["_info"]["name"], json!("Campaign._info.name"));
        assert_eq!(doc["Campaign"]["Mode"]["hard"], json!("hard"));
        assert_eq!(doc["Gui"]["Button"]["Stop"], json!("Gui.Button.Stop"));
    }

    #[test]
    fn old_text_is_kept_and_not_mutated() {
        let old = json!({"Task": {"Alas": {"name": "Alas", "help": "Core"}}});
        let before = old.clone();
        let doc = build_i18n("en-US", &old, &generator());
        assert_eq!(doc["Task"]["Alas"], json!({"name": "Alas", "help": "Core"}));
        assert_eq!(old, before);
    }

    #[test]
    fn event_names_follow_locale_priority() {
        let g = generator();
        let jp = build_i18n("ja-JP", &json!({}), &g);
        assert_eq!(jp["Campaign"]["Event"]["event_a"], json!("イベントA"));
        assert_eq!(jp["Campaign"]["Event"]["event_b"], json!("Event B"));

        let cn = build_i18n("zh-CN", &json!({}), &g);
        assert_eq!(cn["Campaign"]["Event"]["event_a"], json!("活动A"));
        assert_eq!(cn["Campaign"]["Event"]["event_b"], json!("Event B"));
    }

    #[test]
    fn package_and_server_names() {
        let g = generator();
        let cn = build_i18n("zh-CN", &json!({}), &g);
        let packages = &cn["Emulator"]["PackageName"];
        assert_eq!(packages["com.bilibili.azurlane"], json!("CN"));
        assert_eq!(
            packages["com.bilibili.azurlane.vivo"],
            json!("CN vivo渠道服 com.bilibili.azurlane.vivo")
        );
        assert_eq!(cn["Emulator"]["ServerName"]["cn_android-0"], json!("[国服] 紫绯之缘"));
        assert_eq!(cn["Emulator"]["ServerName"]["en-0"], json!("[EN] Avrora"));

        let en = build_i18n("en-US", &json!({}), &g);
        assert_eq!(
            en["Emulator"]["PackageName"]["com.bilibili.azurlane.vivo"],
            json!("CN com.bilibili.azurlane.vivo")
        );
    }

    #[test]
    fn zh_tw_text_is_normalized() {
        let old = json!({"Task": {"Alas": {"name": "設置", "help": "支持文件"}}});
        let doc = build_i18n("zh-TW", &old, &generator());
        assert_eq!(doc["Task"]["Alas"], json!({"name": "設定", "help": "支援檔案"}));
    }
}
