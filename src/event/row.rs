use crate::registry::Server;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Which task bucket an event feeds, derived from its identifier prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Standard,
    Raid,
    WarArchives,
    Coalition,
}

/// One dated row of the event catalog.
///
/// Identity is the `directory` alone: two rows with the same directory are the
/// same event regardless of names or date.
#[derive(Debug, Clone)]
pub struct Event {
    /// `YYYYMMDD` token; orders the catalog.
    pub date: String,
    pub directory: String,
    pub cn: Option<String>,
    pub en: Option<String>,
    pub jp: Option<String>,
    pub tw: Option<String>,
}

impl Event {
    pub fn name(&self, server: Server) -> Option<&str> {
        match server {
            Server::Cn => self.cn.as_deref(),
            Server::En => self.en.as_deref(),
            Server::Jp => self.jp.as_deref(),
            Server::Tw => self.tw.as_deref(),
        }
    }

    pub fn is_raid(&self) -> bool {
        self.directory.starts_with("raid_")
    }

    pub fn is_war_archives(&self) -> bool {
        self.directory.starts_with("war_archives")
    }

    pub fn is_coalition(&self) -> bool {
        self.directory.starts_with("coalition_")
    }

    pub fn kind(&self) -> EventKind {
        if self.is_raid() {
            EventKind::Raid
        } else if self.is_war_archives() {
            EventKind::WarArchives
        } else if self.is_coalition() {
            EventKind::Coalition
        } else {
            EventKind::Standard
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.directory == other.directory
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.directory.hash(state);
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.directory.cmp(&other.directory)
    }
}
