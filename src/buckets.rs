//! Task buckets with event-specific behavior.
//!
//! The event catalog feeds a task's `Campaign.Event` options according to the
//! bucket the task belongs to, and migration enforces per-bucket stage rules.

use crate::event::EventKind;

pub const EVENTS: &[&str] = &[
    "Event", "Event2", "Event3", "EventA", "EventB", "EventC", "EventD", "EventSp",
];
pub const GEMS_FARMINGS: &[&str] = &["GemsFarming"];
pub const RAIDS: &[&str] = &["Raid", "RaidDaily"];
pub const WAR_ARCHIVES: &[&str] = &["WarArchives"];
pub const COALITIONS: &[&str] = &["Coalition", "CoalitionSp"];

/// Sentinel event id meaning "main campaign, no event".
pub const CAMPAIGN_MAIN: &str = "campaign_main";

/// Stages that event-like tasks must not keep (main-campaign farming defaults).
pub const DEFAULT_STAGES: &[&str] = &["7-2", "12-4"];

/// Replacement stage for event and war-archive tasks.
pub const EVENT_STAGE: &str = "D3";

/// Replacement stage for coalition tasks.
pub const COALITION_STAGE: &str = "TC-3";

/// Tasks whose event options receive events of `kind`.
pub fn tasks_for(kind: EventKind) -> Vec<&'static str> {
    match kind {
        EventKind::Raid => RAIDS.to_vec(),
        EventKind::WarArchives => WAR_ARCHIVES.to_vec(),
        EventKind::Coalition => COALITIONS.to_vec(),
        EventKind::Standard => EVENTS.iter().chain(GEMS_FARMINGS).copied().collect(),
    }
}

/// Every task carrying a `Campaign.Event` selector.
pub fn event_tasks() -> Vec<&'static str> {
    EVENTS
        .iter()
        .chain(GEMS_FARMINGS)
        .chain(WAR_ARCHIVES)
        .chain(RAIDS)
        .chain(COALITIONS)
        .copied()
        .collect()
}
