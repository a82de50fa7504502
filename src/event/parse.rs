use crate::event::row::Event;
use crate::registry::Server;
use anyhow::{Context, bail};
use regex::Regex;
use std::fs;

/// Parse an event catalog file into events, latest first.
pub fn parse_event_file(path: &str) -> anyhow::Result<Vec<Event>> {
    let text = fs::read_to_string(path).with_context(|| format!("read event catalog {}", path))?;
    parse_event_text(&text, path)
}

/// Parse event catalog text into events, latest first.
///
/// Rows are the lines carrying an 8-digit date token. Expected columns
/// (pipe-delimited, outer pipes optional):
/// date | directory | cn | en | jp | tw
///
/// The older layout with a generic name column after the directory is also
/// accepted:
/// date | directory | name | cn | en | jp | tw
///
/// Example:
/// | 20240101 | raid_20240101 | 复刻活动 | Rerun Event | - | 復刻活動 |
///
/// The result is sorted by date token, latest first, whatever the file order.
pub fn parse_event_text(text: &str, origin: &str) -> anyhow::Result<Vec<Event>> {
    let date_re = Regex::new(r"\d{8}")?;

    let mut events = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;

        if !date_re.is_match(line) {
            continue;
        }

        let cols: Vec<&str> = line
            .trim_matches(|c| c == '|' || c == ' ' || c == '\n' || c == '\r')
            .split('|')
            .map(str::trim)
            .collect();

        let (date, directory, names) = match cols.as_slice() {
            [date, directory, cn, en, jp, tw] => (*date, *directory, [*cn, *en, *jp, *tw]),
            [date, directory, _name, cn, en, jp, tw] => {
                (*date, *directory, [*cn, *en, *jp, *tw])
            }
            _ => {
                bail!(
                    "event catalog parse error at {}:{}: expected 6 or 7 columns, found {}: {:?}",
                    origin,
                    lno,
                    cols.len(),
                    line
                );
            }
        };

        let Some(date) = date_re.find(date).map(|m| m.as_str()) else {
            bail!(
                "event catalog parse error at {}:{}: first column is not a date: {:?}",
                origin,
                lno,
                date
            );
        };
        if directory.is_empty() {
            bail!(
                "event catalog parse error at {}:{}: empty event directory",
                origin,
                lno
            );
        }

        events.push(build_event(date, directory, names));
    }

    // Latest first; rows sharing a date keep reverse file order.
    events.reverse();
    events.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(events)
}

fn build_event(date: &str, directory: &str, names: [&str; 4]) -> Event {
    let directory = directory.replace(' ', "_");
    let war_archives = directory.starts_with("war_archives");

    let mut localized = Server::ALL.iter().zip(names).map(|(server, raw)| {
        let name = match server {
            Server::En => raw.replace([',', '\'', '\\'], ""),
            _ => raw.replace('、', ""),
        };
        if name == "-" {
            return None;
        }
        if war_archives {
            Some(format!("{}{}", server.archives_prefix(), name))
        } else {
            Some(name)
        }
    });

    Event {
        date: date.to_string(),
        directory,
        cn: localized.next().flatten(),
        en: localized.next().flatten(),
        jp: localized.next().flatten(),
        tw: localized.next().flatten(),
    }
}
