//! Computed option sets: events, emulator packages and game servers.
//!
//! ./campaign/events.md -----+
//!                           v
//!            args.json -----+-----> args.json

use crate::buckets::{self, CAMPAIGN_MAIN};
use crate::deep::{self, Path};
use crate::event::Event;
use crate::registry::{Registry, Server};
use serde_json::{Value, json};

fn event_field(task: &str) -> Path {
    Path::from(vec![task, "Campaign", "Event"])
}

/// Add every event to the `Campaign.Event` options of the tasks in its bucket.
///
/// `events` must be ordered latest first: the first event seen with a name on
/// a server becomes that server's latest event for the task. Afterwards the
/// options are sorted, the main-campaign sentinel is dropped, and the set of
/// per-server latest events is stored as `option_bold`.
pub fn inject_event_options(tree: &mut Value, events: &[Event]) {
    for event in events {
        for server in Server::ALL {
            if event.name(server).is_none_or(str::is_empty) {
                continue;
            }
            for task in buckets::tasks_for(event.kind()) {
                insert_event(tree, task, event, server);
            }
        }
    }

    for task in buckets::event_tasks() {
        let field = event_field(task);
        let Some(options) = deep::get(tree, field.child("option")).and_then(Value::as_array)
        else {
            tracing::debug!(task, "no event selector, skipping");
            continue;
        };

        let mut options: Vec<Value> = options
            .iter()
            .filter(|o| o.as_str() != Some(CAMPAIGN_MAIN))
            .cloned()
            .collect();
        options.sort_by(|a, b| option_key(a).cmp(&option_key(b)));
        deep::set(tree, field.child("option"), Value::Array(options));

        let latest: Vec<(Server, Value)> = Server::ALL
            .into_iter()
            .map(|server| {
                let value = deep::pop_or(tree, field.child(server.as_str()), json!(""));
                (server, value)
            })
            .collect();

        let mut bold: Vec<String> = latest.iter().map(|(_, v)| option_key(v)).collect();
        bold.sort();
        bold.dedup();
        deep::set(tree, field.child("option_bold"), json!(bold));

        for (server, value) in latest {
            deep::set(tree, field.child(server.as_str()), value);
        }
    }
}

fn insert_event(tree: &mut Value, task: &str, event: &Event, server: Server) {
    let field = event_field(task);
    let Some(Value::Array(options)) = deep::get_mut(tree, field.child("option")) else {
        return;
    };
    let id = json!(event.directory);
    if !options.contains(&id) {
        options.push(id.clone());
    }
    deep::set_default(tree, field.child(server.as_str()), id);
}

fn option_key(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extend the package selector with every registered package.
pub fn inject_packages(argument: &mut Value, tree: &mut Value, registry: &Registry) {
    extend_option(
        argument,
        tree,
        ["Emulator", "PackageName"],
        registry.all_packages(),
    );
}

/// Extend the server selector with `<server>-<index>` for every instance.
pub fn inject_servers(argument: &mut Value, tree: &mut Value, registry: &Registry) {
    extend_option(
        argument,
        tree,
        ["Emulator", "ServerName"],
        registry.server_instance_keys(),
    );
}

/// Append `extra` to the option list of `group.field` in the argument table,
/// and mirror the result into the `Alas` task of the tree.
fn extend_option(argument: &mut Value, tree: &mut Value, field: [&str; 2], extra: Vec<String>) {
    let option_path = Path::from(vec![field[0], field[1], "option"]);
    let Some(Value::Array(current)) = deep::get(argument, &option_path) else {
        tracing::debug!(field = %option_path, "no option list, skipping injection");
        return;
    };

    let mut option = current.clone();
    option.extend(extra.into_iter().map(Value::String));
    deep::set(argument, &option_path, Value::Array(option.clone()));

    let in_tree = Path::from(vec!["Alas", field[0], field[1]]);
    if deep::get_some(tree, &in_tree).is_some() {
        deep::set(tree, in_tree.child("option"), Value::Array(option));
    }
}
