//! Focus session data models.
//!
//! `SessionSummary` is what `stop` hands back and what the history store
//! persists; `BlinkEvent` is one entry of its append-only blink log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Active,
    Closed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlinkEvent {
    pub timestamp: DateTime<Utc>,
    pub eye_openness: f64,
}

/// Frozen snapshot of a closed session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub blink_rate: f64,
    pub attention_score: f64,
    pub distractions: u32,
    pub blink_events: Vec<BlinkEvent>,
}

/// History row without the blink log, used by list views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub blink_rate: f64,
    pub attention_score: f64,
    pub distractions: u32,
    pub blink_count: u32,
}

impl SessionRecord {
    pub fn duration_secs(&self) -> u64 {
        (self.end_time - self.start_time).num_seconds().max(0) as u64
    }
}

impl From<&SessionSummary> for SessionRecord {
    fn from(summary: &SessionSummary) -> Self {
        Self {
            id: summary.id.clone(),
            start_time: summary.start_time,
            end_time: summary.end_time,
            blink_rate: summary.blink_rate,
            attention_score: summary.attention_score,
            distractions: summary.distractions,
            blink_count: summary.blink_events.len() as u32,
        }
    }
}
