//! Meeting session persistence

use chrono::{DateTime, Utc};
use l10_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::{parse_ts, parse_ts_opt, parse_uuid, ts, ts_opt};
use crate::models::MeetingSession;

const SESSION_COLUMNS: &str = r#"
    id, organization_id, team_id, meeting_type, facilitator_id, start_time,
    is_active, is_paused, last_pause_time, last_resume_time, total_paused_duration,
    current_section, current_section_start, last_checkpoint_at, last_checkpoint_elapsed,
    ended_at, created_at, updated_at
"#;

/// Insert a new session
///
/// Returns `Conflict` when the one-active-session index rejects the row.
pub async fn insert_session(conn: &mut SqliteConnection, session: &MeetingSession) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO meeting_sessions (
            id, organization_id, team_id, meeting_type, facilitator_id, start_time,
            is_active, is_paused, last_pause_time, last_resume_time, total_paused_duration,
            current_section, current_section_start, last_checkpoint_at, last_checkpoint_elapsed,
            ended_at, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(session.id.to_string())
    .bind(&session.organization_id)
    .bind(&session.team_id)
    .bind(&session.meeting_type)
    .bind(&session.facilitator_id)
    .bind(ts(session.start_time))
    .bind(session.is_active)
    .bind(session.is_paused)
    .bind(ts_opt(session.last_pause_time))
    .bind(ts_opt(session.last_resume_time))
    .bind(session.total_paused_duration)
    .bind(&session.current_section)
    .bind(ts_opt(session.current_section_start))
    .bind(ts_opt(session.last_checkpoint_at))
    .bind(session.last_checkpoint_elapsed)
    .bind(ts_opt(session.ended_at))
    .bind(ts(session.created_at))
    .bind(ts(session.updated_at))
    .execute(conn)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(Error::Conflict(format!(
                "An active {} meeting already exists for team {}",
                session.meeting_type, session.team_id
            )))
        }
        Err(e) => Err(Error::Database(e)),
    }
}

pub async fn load_session(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<MeetingSession>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM meeting_sessions WHERE id = ?",
        SESSION_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(conn)
    .await?;

    row.as_ref().map(session_from_row).transpose()
}

/// The active session for an organization/team/meeting type, if any
pub async fn find_active(
    conn: &mut SqliteConnection,
    organization_id: &str,
    team_id: &str,
    meeting_type: &str,
) -> Result<Option<MeetingSession>> {
    let row = sqlx::query(&format!(
        r#"
        SELECT {} FROM meeting_sessions
        WHERE organization_id = ? AND team_id = ? AND meeting_type = ? AND is_active = 1
        "#,
        SESSION_COLUMNS
    ))
    .bind(organization_id)
    .bind(team_id)
    .bind(meeting_type)
    .fetch_optional(conn)
    .await?;

    row.as_ref().map(session_from_row).transpose()
}

/// Flip a running session to paused
///
/// Returns false when the session is not active-and-running.
pub async fn mark_paused(conn: &mut SqliteConnection, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE meeting_sessions
        SET is_paused = 1, last_pause_time = ?, updated_at = ?
        WHERE id = ? AND is_active = 1 AND is_paused = 0
        "#,
    )
    .bind(ts(now))
    .bind(ts(now))
    .bind(id.to_string())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Close the pause that started at `paused_at`
///
/// Guarding on `last_pause_time` keeps two racing resumes from adding the
/// same interval twice.
pub async fn mark_resumed(
    conn: &mut SqliteConnection,
    id: Uuid,
    paused_at: DateTime<Utc>,
    paused_seconds: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE meeting_sessions
        SET is_paused = 0,
            last_pause_time = NULL,
            last_resume_time = ?,
            total_paused_duration = total_paused_duration + ?,
            updated_at = ?
        WHERE id = ? AND is_active = 1 AND is_paused = 1 AND last_pause_time = ?
        "#,
    )
    .bind(ts(now))
    .bind(paused_seconds)
    .bind(ts(now))
    .bind(id.to_string())
    .bind(ts(paused_at))
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Conclude an active session, folding any open pause into the total
pub async fn mark_ended(
    conn: &mut SqliteConnection,
    id: Uuid,
    open_pause_seconds: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE meeting_sessions
        SET is_active = 0,
            is_paused = 0,
            last_pause_time = NULL,
            total_paused_duration = total_paused_duration + ?,
            ended_at = ?,
            updated_at = ?
        WHERE id = ? AND is_active = 1
        "#,
    )
    .bind(open_pause_seconds)
    .bind(ts(now))
    .bind(ts(now))
    .bind(id.to_string())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Record an advisory elapsed-time checkpoint
pub async fn save_checkpoint(
    conn: &mut SqliteConnection,
    id: Uuid,
    elapsed_seconds: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE meeting_sessions
        SET last_checkpoint_at = ?, last_checkpoint_elapsed = ?, updated_at = ?
        WHERE id = ? AND is_active = 1
        "#,
    )
    .bind(ts(now))
    .bind(elapsed_seconds)
    .bind(ts(now))
    .bind(id.to_string())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn set_current_section(
    conn: &mut SqliteConnection,
    id: Uuid,
    section: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE meeting_sessions
        SET current_section = ?, current_section_start = ?, updated_at = ?
        WHERE id = ? AND is_active = 1
        "#,
    )
    .bind(section)
    .bind(ts(now))
    .bind(ts(now))
    .bind(id.to_string())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Ids of active sessions that started before `cutoff`
/// Active sessions started before `cutoff`, oldest first
pub async fn list_stale(
    conn: &mut SqliteConnection,
    cutoff: DateTime<Utc>,
) -> Result<Vec<MeetingSession>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM meeting_sessions WHERE is_active = 1 AND start_time < ? ORDER BY start_time",
        SESSION_COLUMNS
    ))
    .bind(ts(cutoff))
    .fetch_all(conn)
    .await?;

    rows.iter().map(session_from_row).collect()
}

/// Sessions created at or after `since`, active or not
pub async fn list_created_since(
    conn: &mut SqliteConnection,
    since: DateTime<Utc>,
) -> Result<Vec<MeetingSession>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM meeting_sessions WHERE created_at >= ? ORDER BY created_at",
        SESSION_COLUMNS
    ))
    .bind(ts(since))
    .fetch_all(conn)
    .await?;

    rows.iter().map(session_from_row).collect()
}

/// Number of active sessions and of organizations that have one
pub async fn count_active(conn: &mut SqliteConnection) -> Result<(i64, i64)> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS active_count, COUNT(DISTINCT organization_id) AS organizations
        FROM meeting_sessions WHERE is_active = 1
        "#,
    )
    .fetch_one(conn)
    .await?;

    Ok((row.try_get("active_count")?, row.try_get("organizations")?))
}

fn session_from_row(row: &SqliteRow) -> Result<MeetingSession> {
    let id: String = row.try_get("id")?;
    let start_time: String = row.try_get("start_time")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(MeetingSession {
        id: parse_uuid("id", &id)?,
        organization_id: row.try_get("organization_id")?,
        team_id: row.try_get("team_id")?,
        meeting_type: row.try_get("meeting_type")?,
        facilitator_id: row.try_get("facilitator_id")?,
        start_time: parse_ts("start_time", &start_time)?,
        is_active: row.try_get("is_active")?,
        is_paused: row.try_get("is_paused")?,
        last_pause_time: parse_ts_opt("last_pause_time", row.try_get("last_pause_time")?)?,
        last_resume_time: parse_ts_opt("last_resume_time", row.try_get("last_resume_time")?)?,
        total_paused_duration: row.try_get("total_paused_duration")?,
        current_section: row.try_get("current_section")?,
        current_section_start: parse_ts_opt(
            "current_section_start",
            row.try_get("current_section_start")?,
        )?,
        last_checkpoint_at: parse_ts_opt("last_checkpoint_at", row.try_get("last_checkpoint_at")?)?,
        last_checkpoint_elapsed: row.try_get("last_checkpoint_elapsed")?,
        ended_at: parse_ts_opt("ended_at", row.try_get("ended_at")?)?,
        created_at: parse_ts("created_at", &created_at)?,
        updated_at: parse_ts("updated_at", &updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;
    use chrono::Duration;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs)
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let session = MeetingSession::new("org", "team", "weekly", Some("u1".into()), at(0));
        insert_session(&mut conn, &session).await.unwrap();

        let loaded = load_session(&mut conn, session.id).await.unwrap().unwrap();
        assert_eq!(loaded, session);
        assert!(load_session(&mut conn, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_active_insert_conflicts() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let first = MeetingSession::new("org", "team", "weekly", None, at(0));
        insert_session(&mut conn, &first).await.unwrap();

        let second = MeetingSession::new("org", "team", "weekly", None, at(5));
        let result = insert_session(&mut conn, &second).await;
        assert!(matches!(result, Err(Error::Conflict(_))));

        // Other meeting types and teams are independent
        let other_type = MeetingSession::new("org", "team", "quarterly", None, at(5));
        insert_session(&mut conn, &other_type).await.unwrap();
        let other_team = MeetingSession::new("org", "team-2", "weekly", None, at(5));
        insert_session(&mut conn, &other_team).await.unwrap();
    }

    #[tokio::test]
    async fn test_ended_session_frees_the_slot() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let first = MeetingSession::new("org", "team", "weekly", None, at(0));
        insert_session(&mut conn, &first).await.unwrap();
        assert!(mark_ended(&mut conn, first.id, 0, at(60)).await.unwrap());

        let second = MeetingSession::new("org", "team", "weekly", None, at(70));
        insert_session(&mut conn, &second).await.unwrap();

        let active = find_active(&mut conn, "org", "team", "weekly").await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
    }

    #[tokio::test]
    async fn test_guarded_pause_and_resume() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let session = MeetingSession::new("org", "team", "weekly", None, at(0));
        insert_session(&mut conn, &session).await.unwrap();

        assert!(mark_paused(&mut conn, session.id, at(300)).await.unwrap());
        assert!(!mark_paused(&mut conn, session.id, at(310)).await.unwrap());

        // A resume for a different pause instant does not apply
        assert!(!mark_resumed(&mut conn, session.id, at(299), 121, at(420)).await.unwrap());
        assert!(mark_resumed(&mut conn, session.id, at(300), 120, at(420)).await.unwrap());
        assert!(!mark_resumed(&mut conn, session.id, at(300), 120, at(421)).await.unwrap());

        let loaded = load_session(&mut conn, session.id).await.unwrap().unwrap();
        assert!(!loaded.is_paused);
        assert!(loaded.last_pause_time.is_none());
        assert_eq!(loaded.total_paused_duration, 120);
        assert_eq!(loaded.last_resume_time, Some(at(420)));
    }

    #[tokio::test]
    async fn test_list_stale() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let old = MeetingSession::new("org", "team-a", "weekly", None, at(0));
        let fresh = MeetingSession::new("org", "team-b", "weekly", None, at(10_000));
        insert_session(&mut conn, &old).await.unwrap();
        insert_session(&mut conn, &fresh).await.unwrap();

        let stale = list_stale(&mut conn, at(5_000)).await.unwrap();
        assert_eq!(stale.iter().map(|s| s.id).collect::<Vec<_>>(), vec![old.id]);

        let recent = list_created_since(&mut conn, at(5_000)).await.unwrap();
        assert_eq!(recent.iter().map(|s| s.id).collect::<Vec<_>>(), vec![fresh.id]);

        assert_eq!(count_active(&mut conn).await.unwrap(), (2, 1));
    }
}
