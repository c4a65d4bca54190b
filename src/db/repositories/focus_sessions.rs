use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{format_datetime, parse_datetime, to_u32},
};
use crate::models::{BlinkEvent, SessionRecord, SessionSummary};

const RECORD_COLUMNS: &str = "s.id, s.started_at, s.ended_at, s.blink_rate, s.attention_score, s.distractions,
     (SELECT COUNT(*) FROM blink_events b WHERE b.session_id = s.id) AS blink_count";

fn row_to_record(row: &Row) -> Result<SessionRecord> {
    let started_at: String = row.get("started_at")?;
    let ended_at: String = row.get("ended_at")?;
    let distractions: i64 = row.get("distractions")?;
    let blink_count: i64 = row.get("blink_count")?;

    Ok(SessionRecord {
        id: row.get("id")?,
        start_time: parse_datetime(&started_at, "started_at")?,
        end_time: parse_datetime(&ended_at, "ended_at")?,
        blink_rate: row.get("blink_rate")?,
        attention_score: row.get("attention_score")?,
        distractions: to_u32(distractions, "distractions")?,
        blink_count: to_u32(blink_count, "blink_count")?,
    })
}

fn row_to_blink_event(row: &Row) -> Result<BlinkEvent> {
    let timestamp: String = row.get("timestamp")?;
    Ok(BlinkEvent {
        timestamp: parse_datetime(&timestamp, "timestamp")?,
        eye_openness: row.get("eye_openness")?,
    })
}

impl Database {
    /// Stores a closed session and its blink log in one transaction.
    pub async fn insert_focus_session(&self, summary: &SessionSummary) -> Result<()> {
        let record = summary.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO focus_sessions (id, started_at, ended_at, blink_rate, attention_score, distractions, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    format_datetime(&record.start_time),
                    format_datetime(&record.end_time),
                    record.blink_rate,
                    record.attention_score,
                    i64::from(record.distractions),
                    format_datetime(&Utc::now()),
                ],
            )?;

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO blink_events (session_id, seq, timestamp, eye_openness)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for (seq, event) in record.blink_events.iter().enumerate() {
                    stmt.execute(params![
                        record.id,
                        seq as i64,
                        format_datetime(&event.timestamp),
                        event.eye_openness,
                    ])?;
                }
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn get_focus_session(&self, session_id: &str) -> Result<Option<SessionSummary>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let record = conn
                .query_row(
                    &format!("SELECT {RECORD_COLUMNS} FROM focus_sessions s WHERE s.id = ?1"),
                    params![session_id],
                    |row| Ok(row_to_record(row)),
                )
                .optional()?
                .transpose()?;

            let Some(record) = record else {
                return Ok(None);
            };

            let mut stmt = conn.prepare(
                "SELECT timestamp, eye_openness
                 FROM blink_events
                 WHERE session_id = ?1
                 ORDER BY seq ASC",
            )?;
            let mut rows = stmt.query(params![record.id])?;
            let mut blink_events = Vec::new();
            while let Some(row) = rows.next()? {
                blink_events.push(row_to_blink_event(row)?);
            }

            Ok(Some(SessionSummary {
                id: record.id,
                start_time: record.start_time,
                end_time: record.end_time,
                blink_rate: record.blink_rate,
                attention_score: record.attention_score,
                distractions: record.distractions,
                blink_events,
            }))
        })
        .await
    }

    /// All stored sessions, newest first, without their blink logs.
    pub async fn list_focus_sessions(&self) -> Result<Vec<SessionRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM focus_sessions s ORDER BY s.started_at DESC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_record(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    /// Sessions that started in `[from, to)`, oldest first.
    pub async fn list_focus_sessions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM focus_sessions s
                 WHERE s.started_at >= ?1 AND s.started_at < ?2
                 ORDER BY s.started_at ASC"
            ))?;

            let mut rows = stmt.query(params![format_datetime(&from), format_datetime(&to)])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_record(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    /// Returns whether a session was removed.
    pub async fn delete_focus_session(&self, session_id: &str) -> Result<bool> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let removed = conn.execute("DELETE FROM focus_sessions WHERE id = ?1", params![session_id])?;
            Ok(removed > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn summary(id: &str, start: DateTime<Utc>, blinks: usize) -> SessionSummary {
        SessionSummary {
            id: id.into(),
            start_time: start,
            end_time: start + Duration::minutes(25),
            blink_rate: 14.5,
            attention_score: 82.0,
            distractions: 3,
            blink_events: (0..blinks)
                .map(|i| BlinkEvent {
                    timestamp: start + Duration::milliseconds(1_234 * i as i64 + 7),
                    eye_openness: 0.1 + i as f64 / 100.0,
                })
                .collect(),
        }
    }

    fn open(dir: &TempDir) -> Database {
        Database::new(dir.path().join("history").join("curriq.sqlite3")).unwrap()
    }

    fn day(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn stored_session_reads_back_identically() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        let original = summary("a", day(3, 9), 5);

        db.insert_focus_session(&original).await.unwrap();
        let loaded = db.get_focus_session("a").await.unwrap().unwrap();

        assert_eq!(loaded, original);
        assert!(db.get_focus_session("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first_with_blink_counts() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        db.insert_focus_session(&summary("old", day(1, 9), 2)).await.unwrap();
        db.insert_focus_session(&summary("new", day(2, 9), 0)).await.unwrap();

        let listed = db.list_focus_sessions().await.unwrap();
        let ids: Vec<_> = listed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["new", "old"]);
        assert_eq!(listed[0].blink_count, 0);
        assert_eq!(listed[1].blink_count, 2);
        assert_eq!(listed[1].duration_secs(), 25 * 60);
    }

    #[tokio::test]
    async fn range_query_is_half_open() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        for (id, start) in [("a", day(1, 9)), ("b", day(2, 9)), ("c", day(3, 9))] {
            db.insert_focus_session(&summary(id, start, 1)).await.unwrap();
        }

        let found = db
            .list_focus_sessions_between(day(2, 0), day(3, 9))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "b");
    }

    #[tokio::test]
    async fn delete_cascades_to_blink_events() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        db.insert_focus_session(&summary("gone", day(4, 9), 3)).await.unwrap();

        assert!(db.delete_focus_session("gone").await.unwrap());
        assert!(!db.delete_focus_session("gone").await.unwrap());

        let leftover: i64 = db
            .execute(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM blink_events", [], |row| row.get(0))?)
            })
            .await
            .unwrap();
        assert_eq!(leftover, 0);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        db.insert_focus_session(&summary("dup", day(5, 9), 1)).await.unwrap();
        assert!(db.insert_focus_session(&summary("dup", day(5, 10), 1)).await.is_err());
        assert_eq!(db.list_focus_sessions().await.unwrap().len(), 1);
    }
}
