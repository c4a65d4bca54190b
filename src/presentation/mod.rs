//! Outbound side of the engine: what gets shown on the dashboard.

mod sink;

pub use sink::{LogSink, StatsSink, WatchSink};

use serde::{Deserialize, Serialize};

/// Integer-rounded stats pushed to the dashboard after every sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DisplayStats {
    pub attention_score: u32,
    pub blink_rate: u32,
    pub distractions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionClock {
    pub elapsed_secs: u64,
    pub display: String,
}

impl SessionClock {
    pub fn from_elapsed(elapsed_secs: u64) -> Self {
        Self {
            elapsed_secs,
            display: format_session_time(elapsed_secs),
        }
    }
}

/// Renders elapsed seconds as `MM:SS`. Minutes keep growing past 99.
pub fn format_session_time(elapsed_secs: u64) -> String {
    format!("{:02}:{:02}", elapsed_secs / 60, elapsed_secs % 60)
}
