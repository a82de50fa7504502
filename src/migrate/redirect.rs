//! Declarative field redirections for schema evolution.
//!
//! redirect.yaml:
//!
//! ```yaml
//! rules:
//!   - since: "2023-02-17"
//!     source: [GemsFarming.GemsFarming.FlagshipChange, GemsFarming.GemsFarming.FlagshipEquipChange]
//!     target: GemsFarming.GemsFarming.ChangeFlagship
//!     transform: change_ship
//! ```
//!
//! The table is append-only: new rules go at the end and `since` dates never
//! decrease.

use super::transform::Transform;
use crate::deep;
use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One dotted path, or several applied positionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSpec {
    One(String),
    Many(Vec<String>),
}

impl PathSpec {
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        let paths: &[String] = match self {
            PathSpec::One(path) => std::slice::from_ref(path),
            PathSpec::Many(paths) => paths,
        };
        paths.iter().map(String::as_str)
    }
}

impl From<&str> for PathSpec {
    fn from(path: &str) -> Self {
        PathSpec::One(path.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for PathSpec {
    fn from(paths: [&str; N]) -> Self {
        PathSpec::Many(paths.iter().map(|p| p.to_string()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectionRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    pub source: PathSpec,
    pub target: PathSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

#[derive(Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<RedirectionRule>,
}

/// Parse the `rules:` list of a redirect document. An empty document has no
/// rules.
pub fn parse_rules(raw: &Value) -> anyhow::Result<Vec<RedirectionRule>> {
    let file: RuleFile =
        serde_json::from_value(raw.clone()).context("redirect rules must be `rules: [...]`")?;

    let mut last_since: Option<&str> = None;
    for (idx, rule) in file.rules.iter().enumerate() {
        if let PathSpec::Many(paths) = &rule.source {
            if paths.is_empty() {
                bail!("redirect rule #{} has no source paths", idx);
            }
        }
        let no_target = matches!(&rule.target, PathSpec::Many(paths) if paths.is_empty());
        if no_target || rule.source.paths().chain(rule.target.paths()).any(str::is_empty) {
            bail!("redirect rule #{} has an empty path", idx);
        }
        if let (PathSpec::Many(sources), PathSpec::Many(targets)) = (&rule.source, &rule.target) {
            if rule.transform.is_none() && sources.len() != targets.len() {
                bail!(
                    "redirect rule #{} maps {} sources onto {} targets",
                    idx,
                    sources.len(),
                    targets.len()
                );
            }
        }
        if let Some(since) = rule.since.as_deref() {
            if last_since.is_some_and(|last| since < last) {
                bail!(
                    "redirect rule #{} (since {}) is older than the rule before it",
                    idx,
                    since
                );
            }
            last_since = Some(since);
        }
    }
    Ok(file.rules)
}

impl RedirectionRule {
    pub fn new(
        source: impl Into<PathSpec>,
        target: impl Into<PathSpec>,
        transform: Option<Transform>,
    ) -> Self {
        Self {
            since: None,
            source: source.into(),
            target: target.into(),
            transform,
        }
    }

    /// Copy the source value(s) of `old` into `new`.
    ///
    /// Skipped when any source is missing or null. A target is only written
    /// when it is null in `old`, or when the rule rewrites a path in place.
    /// Returns whether the rule fired.
    pub fn apply(&self, old: &Value, new: &mut Value) -> bool {
        let value = match &self.source {
            PathSpec::One(path) => match deep::get_some(old, path.as_str()) {
                Some(v) => v.clone(),
                None => return false,
            },
            PathSpec::Many(paths) => {
                let mut values = Vec::with_capacity(paths.len());
                for path in paths {
                    match deep::get_some(old, path.as_str()) {
                        Some(v) => values.push(v.clone()),
                        None => return false,
                    }
                }
                Value::Array(values)
            }
        };

        let value = match self.transform {
            Some(transform) => match transform.apply(&value) {
                Some(v) => v,
                None => {
                    tracing::debug!(rule = ?self, "transform rejected its input");
                    return false;
                }
            },
            None => value,
        };

        let in_place = self.source == self.target;
        let writable = |path: &str| in_place || deep::get_some(old, path).is_none();

        match &self.target {
            PathSpec::One(path) => {
                if writable(path) {
                    deep::set(new, path.as_str(), value);
                }
            }
            PathSpec::Many(paths) => {
                let Value::Array(values) = value else {
                    tracing::debug!(rule = ?self, "multi-target rule needs a list value");
                    return false;
                };
                for (path, v) in paths.iter().zip(values) {
                    if writable(path) {
                        deep::set(new, path.as_str(), v);
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn sum_of_two_sources() {
        let rule = RedirectionRule::new(["A.G.X", "A.G.Y"], "A.G.Z", Some(Transform::Sum));
        let old = json!({"A": {"G": {"X": 1, "Y": 2}}});
        let mut new = json!({"A": {"G": {"Z": null}}});
        assert!(rule.apply(&old, &mut new));
        assert_eq!(new["A"]["G"]["Z"], json!(3));
    }

    #[test]
    fn missing_source_aborts_rule() {
        let rule = RedirectionRule::new(["A.G.X", "A.G.Y"], "A.G.Z", Some(Transform::Sum));
        let old = json!({"A": {"G": {"X": 1, "Y": null}}});
        let mut new = json!({"A": {"G": {"Z": 5}}});
        assert!(!rule.apply(&old, &mut new));
        assert_eq!(new["A"]["G"]["Z"], json!(5));
    }

    #[test]
    fn existing_target_is_not_overwritten() {
        let rule = RedirectionRule::new("A.G.Old", "A.G.New", None);
        let old = json!({"A": {"G": {"Old": "x", "New": "kept"}}});
        let mut new = json!({"A": {"G": {"New": "kept"}}});
        rule.apply(&old, &mut new);
        assert_eq!(new["A"]["G"]["New"], json!("kept"));
    }

    #[test]
    fn in_place_rewrite() {
        let rule = RedirectionRule::new("A.G.Flag", "A.G.Flag", Some(Transform::Negate));
        let old = json!({"A": {"G": {"Flag": true}}});
        let mut new = old.clone();
        rule.apply(&old, &mut new);
        assert_eq!(new["A"]["G"]["Flag"], json!(false));
    }

    #[test]
    fn targets_zip_with_sources() {
        let rule = RedirectionRule::new(["A.G.X", "A.G.Y"], ["B.G.X", "B.G.Y"], None);
        let old = json!({"A": {"G": {"X": 1, "Y": 2}}, "B": {"G": {"Y": 9}}});
        let mut new = json!({});
        rule.apply(&old, &mut new);
        assert_eq!(new, json!({"B": {"G": {"X": 1}}}));
    }

    #[test]
    fn parses_rule_table() {
        let raw = json!({"rules": [
            {"since": "2023-01-01", "source": "A.G.X", "target": "A.G.Y"},
            {"since": "2023-02-17", "source": ["A.G.X", "A.G.Y"], "target": "A.G.Z", "transform": "sum"},
        ]});
        let rules = parse_rules(&raw).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].source, PathSpec::from(["A.G.X", "A.G.Y"]));
        assert_eq!(rules[1].transform, Some(Transform::Sum));
        assert!(parse_rules(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn rejects_empty_paths() {
        for raw in [
            json!({"rules": [{"source": "", "target": ""}]}),
            json!({"rules": [{"source": "A.G.X", "target": ["A.G.Y", ""]}]}),
            json!({"rules": [{"source": ["A.G.X"], "target": [], "transform": "sum"}]}),
        ] {
            let err = parse_rules(&raw).unwrap_err();
            assert!(err.to_string().contains("empty path"));
        }
    }

    #[test]
    fn rejects_out_of_order_rules() {
        let raw = json!({"rules": [
            {"since": "2023-02-17", "source": "A.G.X", "target": "A.G.Y"},
            {"since": "2022-12-01", "source": "A.G.Y", "target": "A.G.Z"},
        ]});
        let err = parse_rules(&raw).unwrap_err();
        assert!(err.to_string().contains("#1"));
    }
}
