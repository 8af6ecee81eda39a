use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle bindings: command ids run around workspace start and stop
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Events {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_start: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_start: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_stop: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_stop: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EventPhase {
    PreStart,
    PostStart,
    PreStop,
    PostStop,
}

impl EventPhase {
    pub const ALL: [EventPhase; 4] = [
        EventPhase::PreStart,
        EventPhase::PostStart,
        EventPhase::PreStop,
        EventPhase::PostStop,
    ];
}

impl fmt::Display for EventPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventPhase::PreStart => "preStart",
            EventPhase::PostStart => "postStart",
            EventPhase::PreStop => "preStop",
            EventPhase::PostStop => "postStop",
        };
        f.write_str(name)
    }
}

impl Events {
    pub fn phase(&self, phase: EventPhase) -> &[String] {
        match phase {
            EventPhase::PreStart => &self.pre_start,
            EventPhase::PostStart => &self.post_start,
            EventPhase::PreStop => &self.pre_stop,
            EventPhase::PostStop => &self.post_stop,
        }
    }

    pub fn is_empty(&self) -> bool {
        EventPhase::ALL.iter().all(|phase| self.phase(*phase).is_empty())
    }
}
