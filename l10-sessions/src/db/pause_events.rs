//! Pause history persistence

use chrono::{DateTime, Utc};
use l10_common::time::seconds_between;
use l10_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::{parse_ts, parse_ts_opt, parse_uuid, ts, ts_opt};
use crate::models::PauseEvent;

pub async fn insert_pause_event(conn: &mut SqliteConnection, event: &PauseEvent) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO meeting_pause_events (
            id, session_id, pause_time, resume_time, duration_seconds,
            paused_by, resumed_by, reason
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(event.id.to_string())
    .bind(event.session_id.to_string())
    .bind(ts(event.pause_time))
    .bind(ts_opt(event.resume_time))
    .bind(event.duration_seconds)
    .bind(&event.paused_by)
    .bind(&event.resumed_by)
    .bind(&event.reason)
    .execute(conn)
    .await?;

    Ok(())
}

/// Close the open pause event of a session, if there is one
pub async fn close_open_pause_event(
    conn: &mut SqliteConnection,
    session_id: Uuid,
    resumed_by: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<PauseEvent>> {
    let row = sqlx::query(
        r#"
        SELECT id, session_id, pause_time, resume_time, duration_seconds,
               paused_by, resumed_by, reason
        FROM meeting_pause_events
        WHERE session_id = ? AND resume_time IS NULL
        ORDER BY pause_time DESC
        LIMIT 1
        "#,
    )
    .bind(session_id.to_string())
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut event = pause_event_from_row(&row)?;
    event.resume_time = Some(now);
    event.duration_seconds = Some(seconds_between(event.pause_time, now));
    event.resumed_by = resumed_by.map(str::to_string);

    sqlx::query(
        r#"
        UPDATE meeting_pause_events
        SET resume_time = ?, duration_seconds = ?, resumed_by = ?
        WHERE id = ?
        "#,
    )
    .bind(ts(now))
    .bind(event.duration_seconds)
    .bind(&event.resumed_by)
    .bind(event.id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(Some(event))
}

/// Pause history of a session, newest first
pub async fn list_pause_events(
    conn: &mut SqliteConnection,
    session_id: Uuid,
) -> Result<Vec<PauseEvent>> {
    let rows = sqlx::query(
        r#"
        SELECT id, session_id, pause_time, resume_time, duration_seconds,
               paused_by, resumed_by, reason
        FROM meeting_pause_events
        WHERE session_id = ?
        ORDER BY pause_time DESC
        "#,
    )
    .bind(session_id.to_string())
    .fetch_all(conn)
    .await?;

    rows.iter().map(pause_event_from_row).collect()
}

fn pause_event_from_row(row: &SqliteRow) -> Result<PauseEvent> {
    let id: String = row.try_get("id")?;
    let session_id: String = row.try_get("session_id")?;
    let pause_time: String = row.try_get("pause_time")?;

    Ok(PauseEvent {
        id: parse_uuid("id", &id)?,
        session_id: parse_uuid("session_id", &session_id)?,
        pause_time: parse_ts("pause_time", &pause_time)?,
        resume_time: parse_ts_opt("resume_time", row.try_get("resume_time")?)?,
        duration_seconds: row.try_get("duration_seconds")?,
        paused_by: row.try_get("paused_by")?,
        resumed_by: row.try_get("resumed_by")?,
        reason: row.try_get("reason")?,
    })
}
