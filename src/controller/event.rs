// ABOUTME: Lifecycle events delivered by the platform, one at a time.
// ABOUTME: Event kinds map onto three handler paths: configure, status refresh, and stop.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::Config;

/// Lifecycle event kinds, named as the platform names its hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Start,
    ConfigChanged,
    UpgradeCharm,
    UpdateStatus,
    Stop,
}

/// Which handler an event kind runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerPath {
    /// Validate, render, and apply the pod spec.
    Configure,
    /// Periodic health refresh.
    UpdateStatus,
    /// Unit teardown.
    Stop,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Start,
        EventKind::ConfigChanged,
        EventKind::UpgradeCharm,
        EventKind::UpdateStatus,
        EventKind::Stop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::ConfigChanged => "config-changed",
            EventKind::UpgradeCharm => "upgrade-charm",
            EventKind::UpdateStatus => "update-status",
            EventKind::Stop => "stop",
        }
    }

    pub fn path(&self) -> HandlerPath {
        match self {
            EventKind::Start | EventKind::ConfigChanged | EventKind::UpgradeCharm => {
                HandlerPath::Configure
            }
            EventKind::UpdateStatus => HandlerPath::UpdateStatus,
            EventKind::Stop => HandlerPath::Stop,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', "-");
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown event: {s}"))
    }
}

/// A delivered event. Only config-changed carries a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Start,
    ConfigChanged { config: Config },
    UpgradeCharm,
    UpdateStatus,
    Stop,
}

impl Event {
    /// Rebuild an event of the given kind. Config-changed events carry
    /// `config`, which should be the current configuration.
    pub fn from_kind(kind: EventKind, config: Config) -> Self {
        match kind {
            EventKind::Start => Event::Start,
            EventKind::ConfigChanged => Event::ConfigChanged { config },
            EventKind::UpgradeCharm => Event::UpgradeCharm,
            EventKind::UpdateStatus => Event::UpdateStatus,
            EventKind::Stop => Event::Stop,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Start => EventKind::Start,
            Event::ConfigChanged { .. } => EventKind::ConfigChanged,
            Event::UpgradeCharm => EventKind::UpgradeCharm,
            Event::UpdateStatus => EventKind::UpdateStatus,
            Event::Stop => EventKind::Stop,
        }
    }
}
