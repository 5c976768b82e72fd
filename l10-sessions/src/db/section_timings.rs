//! Section timing persistence

use l10_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::{parse_ts_opt, parse_uuid, ts_opt};
use crate::models::SectionTiming;

const TIMING_COLUMNS: &str = r#"
    session_id, section_id, allocated_seconds, started_at, ended_at, interval_start,
    cumulative_seconds, overrun_seconds, visits
"#;

pub async fn load_timing(
    conn: &mut SqliteConnection,
    session_id: Uuid,
    section_id: &str,
) -> Result<Option<SectionTiming>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM section_timings WHERE session_id = ? AND section_id = ?",
        TIMING_COLUMNS
    ))
    .bind(session_id.to_string())
    .bind(section_id)
    .fetch_optional(conn)
    .await?;

    row.as_ref().map(timing_from_row).transpose()
}

/// Insert or overwrite the timing row of one section
pub async fn save_timing(conn: &mut SqliteConnection, timing: &SectionTiming) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO section_timings (
            session_id, section_id, allocated_seconds, started_at, ended_at, interval_start,
            cumulative_seconds, overrun_seconds, visits
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(session_id, section_id) DO UPDATE SET
            allocated_seconds = excluded.allocated_seconds,
            started_at = excluded.started_at,
            ended_at = excluded.ended_at,
            interval_start = excluded.interval_start,
            cumulative_seconds = excluded.cumulative_seconds,
            overrun_seconds = excluded.overrun_seconds,
            visits = excluded.visits
        "#,
    )
    .bind(timing.session_id.to_string())
    .bind(&timing.section_id)
    .bind(timing.allocated_seconds)
    .bind(ts_opt(timing.started_at))
    .bind(ts_opt(timing.ended_at))
    .bind(ts_opt(timing.interval_start))
    .bind(timing.cumulative_seconds)
    .bind(timing.overrun_seconds)
    .bind(timing.visits)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn list_timings(conn: &mut SqliteConnection, session_id: Uuid) -> Result<Vec<SectionTiming>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM section_timings WHERE session_id = ? ORDER BY section_id",
        TIMING_COLUMNS
    ))
    .bind(session_id.to_string())
    .fetch_all(conn)
    .await?;

    rows.iter().map(timing_from_row).collect()
}

/// Sections with a visit in progress (normally at most one)
pub async fn list_in_progress(
    conn: &mut SqliteConnection,
    session_id: Uuid,
) -> Result<Vec<SectionTiming>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {} FROM section_timings
        WHERE session_id = ? AND started_at IS NOT NULL AND ended_at IS NULL
        ORDER BY started_at
        "#,
        TIMING_COLUMNS
    ))
    .bind(session_id.to_string())
    .fetch_all(conn)
    .await?;

    rows.iter().map(timing_from_row).collect()
}

fn timing_from_row(row: &SqliteRow) -> Result<SectionTiming> {
    let session_id: String = row.try_get("session_id")?;

    Ok(SectionTiming {
        session_id: parse_uuid("session_id", &session_id)?,
        section_id: row.try_get("section_id")?,
        allocated_seconds: row.try_get("allocated_seconds")?,
        started_at: parse_ts_opt("started_at", row.try_get("started_at")?)?,
        ended_at: parse_ts_opt("ended_at", row.try_get("ended_at")?)?,
        interval_start: parse_ts_opt("interval_start", row.try_get("interval_start")?)?,
        cumulative_seconds: row.try_get("cumulative_seconds")?,
        overrun_seconds: row.try_get("overrun_seconds")?,
        visits: row.try_get("visits")?,
    })
}
