//! Layered tool settings, loaded with figment.
//!
//! Priority, highest wins:
//! 1. Environment variables (`CONFGEN_*`, `__` separates nested keys)
//! 2. `confgen.toml` in the working directory, or the file given by `--config`
//! 3. Built-in defaults

use crate::emit::CodeTarget;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "confgen.toml";
pub const ENV_PREFIX: &str = "CONFGEN_";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Raw definition sources.
    pub source_dir: PathBuf,
    /// Compiled schema, menu and generated code.
    pub output_dir: PathBuf,
    pub i18n_dir: PathBuf,
    /// Persisted user configs, `<name>.json`.
    pub config_dir: PathBuf,
    pub locales: Vec<String>,
    pub code_target: CodeTarget,
    /// Running on a cloud phone: pins connectivity and disables local saves.
    pub constrained_environment: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("./module/config/argument"),
            output_dir: PathBuf::from("./module/config/argument"),
            i18n_dir: PathBuf::from("./module/config/i18n"),
            config_dir: PathBuf::from("./config"),
            locales: ["zh-CN", "en-US", "ja-JP", "zh-TW"]
                .into_iter()
                .map(String::from)
                .collect(),
            code_target: CodeTarget::default(),
            constrained_environment: false,
        }
    }
}

impl Settings {
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        Ok(Self::figment(config_file).extract()?)
    }

    /// Provider chain; a missing settings file is not an error.
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let file = config_file.map_or_else(|| PathBuf::from(SETTINGS_FILE), Path::to_path_buf);
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
