use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BlinkEvent, PerceptionSample, SessionStatus, SessionSummary};
use crate::presentation::DisplayStats;

use super::scoring::{adjust_attention, blink_rate, MAX_SCORE};

/// Running state of the current (or last) focus session.
///
/// All mutation goes through `begin_session`, `ingest_sample` and `close`,
/// each of which is a no-op outside the state it expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FocusState {
    pub status: SessionStatus,
    pub session_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub blink_rate: f64,
    pub attention_score: f64,
    pub distractions: u32,
    pub blink_events: Vec<BlinkEvent>,
}

impl Default for FocusState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            session_id: None,
            start_time: None,
            end_time: None,
            blink_rate: 0.0,
            attention_score: MAX_SCORE,
            distractions: 0,
            blink_events: Vec::new(),
        }
    }
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Opens a fresh session. Returns `false` and leaves everything untouched
    /// when a session is already active.
    pub fn begin_session(&mut self, session_id: String, now: DateTime<Utc>) -> bool {
        if self.is_active() {
            return false;
        }

        *self = Self {
            status: SessionStatus::Active,
            session_id: Some(session_id),
            start_time: Some(now),
            ..Self::default()
        };
        true
    }

    /// Applies one sample and returns the stats to publish, or `None` when
    /// no session is active.
    pub fn ingest_sample(
        &mut self,
        sample: &PerceptionSample,
        now: DateTime<Utc>,
    ) -> Option<DisplayStats> {
        if !self.is_active() {
            return None;
        }

        if sample.is_blinking {
            self.blink_events.push(BlinkEvent {
                timestamp: now,
                eye_openness: sample.eye_openness,
            });
        }

        self.blink_rate = blink_rate(self.blink_events.len(), self.elapsed_minutes(now));

        let adjustment = adjust_attention(self.attention_score, sample.face_detected, self.blink_rate);
        self.attention_score = adjustment.score;
        if adjustment.is_distraction() {
            self.distractions += 1;
        }

        Some(self.display_stats())
    }

    /// Freezes the active session and returns its summary.
    pub fn close(&mut self, now: DateTime<Utc>) -> Option<SessionSummary> {
        if !self.is_active() {
            return None;
        }

        self.status = SessionStatus::Closed;
        self.end_time = Some(now);

        Some(SessionSummary {
            id: self.session_id.clone().unwrap_or_default(),
            start_time: self.start_time.unwrap_or(now),
            end_time: now,
            blink_rate: self.blink_rate,
            attention_score: self.attention_score,
            distractions: self.distractions,
            blink_events: self.blink_events.clone(),
        })
    }

    pub fn display_stats(&self) -> DisplayStats {
        DisplayStats {
            attention_score: round_for_display(self.attention_score),
            blink_rate: round_for_display(self.blink_rate),
            distractions: self.distractions,
        }
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        let Some(start) = self.start_time else {
            return 0;
        };
        let end = match self.status {
            SessionStatus::Active => now,
            _ => self.end_time.unwrap_or(now),
        };
        (end - start).num_seconds().max(0) as u64
    }

    fn elapsed_minutes(&self, now: DateTime<Utc>) -> f64 {
        self.start_time
            .map(|start| (now - start).num_milliseconds().max(0) as f64 / 60_000.0)
            .unwrap_or(0.0)
    }
}

fn round_for_display(value: f64) -> u32 {
    value.round().max(0.0) as u32
}
