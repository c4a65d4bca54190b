//! Dashboard statistics over stored focus sessions.
//!
//! Aggregates closed sessions into totals, per-day buckets for charts and a
//! this-week vs previous-week comparison.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::SessionRecord;

/// Aggregated focus statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusStats {
    pub total_sessions: u32,
    pub total_focus_secs: u64,
    /// Mean final attention score (0-100)
    pub average_attention: f64,
    pub average_blink_rate: f64,
    pub total_distractions: u32,
}

impl FocusStats {
    pub fn from_sessions<'a, I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = &'a SessionRecord>,
    {
        let mut stats = Self::default();
        let mut attention_sum = 0.0;
        let mut blink_rate_sum = 0.0;

        for session in sessions {
            stats.total_sessions += 1;
            stats.total_focus_secs += session.duration_secs();
            stats.total_distractions += session.distractions;
            attention_sum += session.attention_score;
            blink_rate_sum += session.blink_rate;
        }

        if stats.total_sessions > 0 {
            let n = f64::from(stats.total_sessions);
            stats.average_attention = attention_sum / n;
            stats.average_blink_rate = blink_rate_sum / n;
        }
        stats
    }

    /// Total focus time as (hours, minutes)
    pub fn total_time(&self) -> (u64, u64) {
        let minutes = self.total_focus_secs / 60;
        (minutes / 60, minutes % 60)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyFocus {
    pub date: NaiveDate,
    pub sessions: u32,
    pub focus_secs: u64,
    pub average_attention: f64,
}

/// One bucket per UTC day for the `days` days ending at `today`, oldest first.
/// Days without sessions are present with zeroes.
pub fn daily_breakdown(sessions: &[SessionRecord], today: NaiveDate, days: u32) -> Vec<DailyFocus> {
    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(i64::from(offset));
            let stats = FocusStats::from_sessions(
                sessions.iter().filter(|s| s.start_time.date_naive() == date),
            );
            DailyFocus {
                date,
                sessions: stats.total_sessions,
                focus_secs: stats.total_focus_secs,
                average_attention: stats.average_attention,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekComparison {
    pub this_week: FocusStats,
    pub previous_week: FocusStats,
    pub attention_delta: f64,
    pub focus_secs_delta: i64,
}

impl WeekComparison {
    /// "This week" is the seven days ending at `today`; "previous" the seven before.
    pub fn compute(sessions: &[SessionRecord], today: NaiveDate) -> Self {
        let this_start = today - Duration::days(6);
        let previous_start = this_start - Duration::days(7);

        let in_range = |from: NaiveDate, to: NaiveDate| {
            sessions.iter().filter(move |s| {
                let date = s.start_time.date_naive();
                date >= from && date <= to
            })
        };

        let this_week = FocusStats::from_sessions(in_range(this_start, today));
        let previous_week =
            FocusStats::from_sessions(in_range(previous_start, this_start - Duration::days(1)));

        Self {
            attention_delta: this_week.average_attention - previous_week.average_attention,
            focus_secs_delta: this_week.total_focus_secs as i64 - previous_week.total_focus_secs as i64,
            this_week,
            previous_week,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn record(start: DateTime<Utc>, minutes: i64, attention: f64, distractions: u32) -> SessionRecord {
        SessionRecord {
            id: format!("{start}"),
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            blink_rate: 12.0,
            attention_score: attention,
            distractions,
            blink_count: 0,
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn empty_stats() {
        let stats = FocusStats::from_sessions(&Vec::<SessionRecord>::new());
        assert_eq!(stats, FocusStats::default());
        assert_eq!(stats.total_time(), (0, 0));
    }

    #[test]
    fn stats_calculation() {
        let sessions = vec![
            record(at(10, 9), 25, 90.0, 1),
            record(at(10, 14), 50, 70.0, 4),
            record(at(11, 9), 60, 80.0, 0),
        ];
        let stats = FocusStats::from_sessions(&sessions);
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.total_focus_secs, 135 * 60);
        assert_eq!(stats.total_distractions, 5);
        assert!((stats.average_attention - 80.0).abs() < 1e-9);
        assert_eq!(stats.average_blink_rate, 12.0);
        assert_eq!(stats.total_time(), (2, 15));
    }

    #[test]
    fn daily_breakdown_fills_gaps() {
        let sessions = vec![
            record(at(8, 9), 30, 60.0, 0),
            record(at(10, 9), 20, 90.0, 0),
            record(at(10, 20), 40, 70.0, 0),
        ];
        let days = daily_breakdown(&sessions, date(10), 3);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, date(8));
        assert_eq!(days[0].sessions, 1);
        assert_eq!(days[1].sessions, 0);
        assert_eq!(days[1].focus_secs, 0);
        assert_eq!(days[2].date, date(10));
        assert_eq!(days[2].sessions, 2);
        assert_eq!(days[2].focus_secs, 60 * 60);
        assert!((days[2].average_attention - 80.0).abs() < 1e-9);
    }

    #[test]
    fn week_comparison_uses_real_history() {
        let sessions = vec![
            // previous week: Mar 1..=7
            record(at(2, 9), 30, 60.0, 2),
            record(at(7, 9), 30, 70.0, 1),
            // this week: Mar 8..=14
            record(at(8, 9), 45, 85.0, 0),
            record(at(14, 9), 45, 95.0, 0),
            // outside both
            record(at(15, 9), 45, 10.0, 9),
        ];
        let cmp = WeekComparison::compute(&sessions, date(14));
        assert_eq!(cmp.this_week.total_sessions, 2);
        assert_eq!(cmp.previous_week.total_sessions, 2);
        assert!((cmp.attention_delta - 25.0).abs() < 1e-9);
        assert_eq!(cmp.focus_secs_delta, 30 * 60);
        assert_eq!(cmp.previous_week.total_distractions, 3);
    }
}
