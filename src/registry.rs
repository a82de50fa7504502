//! Static server registries.
//!
//! Which package identifiers exist, which server each belongs to, and the
//! game-server instances of each region. Read-only input: used to populate
//! option sets and localized display names, and to resolve the acting server
//! of a persisted config.
//!
//! YAML shape (registry.yaml):
//! ```yaml
//! packages:
//!   com.bilibili.azurlane: cn
//!   com.YoStarEN.AzurLane: en
//! channel_packages:
//!   com.bilibili.blhx.huawei: [cn, 华为]
//! server_lists:
//!   cn_android: [莱茵演习, 神盾计划]
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content region. Events carry one display name per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Server {
    Cn,
    En,
    Jp,
    Tw,
}

impl Server {
    pub const ALL: [Server; 4] = [Server::Cn, Server::En, Server::Jp, Server::Tw];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cn => "cn",
            Self::En => "en",
            Self::Jp => "jp",
            Self::Tw => "tw",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|server| server.as_str() == s)
    }

    /// Locale whose players use this server.
    pub fn lang(self) -> &'static str {
        match self {
            Self::Cn => "zh-CN",
            Self::En => "en-US",
            Self::Jp => "ja-JP",
            Self::Tw => "zh-TW",
        }
    }

    /// Server whose players use `lang`, if any.
    pub fn from_lang(lang: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|server| server.lang() == lang)
    }

    /// Prefix put in front of war-archive event names.
    pub fn archives_prefix(self) -> &'static str {
        match self {
            Self::Cn => "档案 ",
            Self::En => "archives ",
            Self::Jp | Self::Tw => "檔案 ",
        }
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Registry {
    /// Package identifier -> server.
    #[serde(default)]
    pub packages: IndexMap<String, Server>,

    /// Channel package identifier -> (server, channel name).
    #[serde(default)]
    pub channel_packages: IndexMap<String, (Server, String)>,

    /// Server region key (e.g. `cn_android`) -> ordered instance names.
    #[serde(default)]
    pub server_lists: IndexMap<String, Vec<String>>,
}

impl Registry {
    /// Resolve a package identifier or bare server name to its server.
    ///
    /// Unknown identifiers fall back to `cn`.
    pub fn to_server(&self, package_or_server: &str) -> Server {
        if let Some(server) = Server::parse(package_or_server) {
            return server;
        }
        if let Some(server) = self.packages.get(package_or_server) {
            return *server;
        }
        if let Some((server, _)) = self.channel_packages.get(package_or_server) {
            return *server;
        }
        tracing::debug!(package = package_or_server, "unknown package, assuming cn");
        Server::Cn
    }

    /// Main package of `server`, or the bare server name if none is registered.
    pub fn to_package(&self, server: Server) -> String {
        self.packages
            .iter()
            .find(|(_, s)| **s == server)
            .map(|(package, _)| package.clone())
            .unwrap_or_else(|| server.as_str().to_string())
    }

    /// Option values for the game-server instance selector: `<server>-<index>`.
    pub fn server_instance_keys(&self) -> Vec<String> {
        self.server_lists
            .iter()
            .flat_map(|(server, list)| (0..list.len()).map(move |i| format!("{server}-{i}")))
            .collect()
    }

    /// Every package and channel package, registry order.
    pub fn all_packages(&self) -> Vec<String> {
        self.packages
            .keys()
            .chain(self.channel_packages.keys())
            .cloned()
            .collect()
    }
}

/// Display prefix for a server region key: `cn_android` -> `国服`, `en` -> `EN`.
pub fn region_prefix(server_key: &str) -> String {
    let prefix = server_key
        .split('_')
        .next()
        .unwrap_or(server_key)
        .to_uppercase();
    if prefix == "CN" {
        "国服".to_string()
    } else {
        prefix
    }
}
