//! Database access for meeting sessions
//!
//! SQLite holds the authoritative session state. Row updates are guarded by
//! `WHERE` clauses on the expected prior state; a guard that matches no row
//! means another caller won the race.

pub mod pause_events;
pub mod section_timings;
pub mod sessions;

use chrono::{DateTime, SecondsFormat, Utc};
use l10_common::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Open (creating if needed) the service database and ensure the schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_tables(&pool).await?;
    Ok(pool)
}

/// Begin a transaction that takes the write lock up front
///
/// A deferred transaction that reads before writing cannot upgrade its
/// snapshot once another connection has committed, and SQLite fails it with
/// `SQLITE_BUSY` without waiting. `BEGIN IMMEDIATE` queues on `busy_timeout`
/// instead, so the later caller reads the committed row and its state guard
/// reports the lost race.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Private in-memory database with the full schema
///
/// A single connection that never expires, so every query sees the same data.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    init_tables(&pool).await?;
    Ok(pool)
}

/// Create tables and indexes (idempotent)
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meeting_sessions (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            team_id TEXT NOT NULL,
            meeting_type TEXT NOT NULL,
            facilitator_id TEXT,
            start_time TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1 CHECK (is_active IN (0, 1)),
            is_paused INTEGER NOT NULL DEFAULT 0 CHECK (is_paused IN (0, 1)),
            last_pause_time TEXT,
            last_resume_time TEXT,
            total_paused_duration INTEGER NOT NULL DEFAULT 0 CHECK (total_paused_duration >= 0),
            current_section TEXT,
            current_section_start TEXT,
            last_checkpoint_at TEXT,
            last_checkpoint_elapsed INTEGER,
            ended_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK ((is_paused = 1) = (last_pause_time IS NOT NULL))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // At most one active session per organization/team/meeting type
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_meeting_sessions_one_active
        ON meeting_sessions (organization_id, team_id, meeting_type)
        WHERE is_active = 1
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meeting_pause_events (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL REFERENCES meeting_sessions(id) ON DELETE CASCADE,
            pause_time TEXT NOT NULL,
            resume_time TEXT,
            duration_seconds INTEGER,
            paused_by TEXT,
            resumed_by TEXT,
            reason TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pause_events_session ON meeting_pause_events (session_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS section_timings (
            session_id TEXT NOT NULL REFERENCES meeting_sessions(id) ON DELETE CASCADE,
            section_id TEXT NOT NULL,
            allocated_seconds INTEGER NOT NULL,
            started_at TEXT,
            ended_at TEXT,
            interval_start TEXT,
            cumulative_seconds INTEGER NOT NULL DEFAULT 0 CHECK (cumulative_seconds >= 0),
            overrun_seconds INTEGER NOT NULL DEFAULT 0,
            visits INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (session_id, section_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Fixed-width RFC3339 text so stored timestamps compare lexically
pub(crate) fn ts(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn ts_opt(instant: Option<DateTime<Utc>>) -> Option<String> {
    instant.map(ts)
}

pub(crate) fn parse_ts(column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

pub(crate) fn parse_ts_opt(column: &str, value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.map(|v| parse_ts(column, &v)).transpose()
}

pub(crate) fn parse_uuid(column: &str, value: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(value)
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}
