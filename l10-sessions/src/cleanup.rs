//! Stale session cleanup and maintenance
//!
//! Sessions left active after everyone walked away would block the next
//! meeting of the team. A periodic sweep ends sessions that have been active
//! longer than the configured limit, through the normal `end` path. The same
//! sweep, the stuck-session report and forced ends are exposed to operators.

use chrono::Duration as ChronoDuration;
use l10_common::config::CleanupConfig;
use l10_common::time::seconds_between;
use l10_common::{Error, Result};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::sessions;
use crate::lifecycle::{EndOutcome, SessionLifecycle};
use crate::models::MeetingSession;

/// An active session older than the stuck threshold
#[derive(Debug, Clone)]
pub struct StuckSession {
    pub session: MeetingSession,
    pub hours_active: f64,
}

/// Session activity summary for operators
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingHealth {
    pub active_count: i64,
    pub organizations_with_meetings: i64,
    pub window_hours: u64,
    /// Sessions created inside the window
    pub meetings_in_window: usize,
    pub completed_meetings: usize,
    /// Mean active minutes of the completed ones
    pub avg_duration_minutes: i64,
}

/// End every session active for longer than `stale_after_hours`
///
/// Returns the number of sessions ended by this sweep.
pub async fn end_stale_sessions(
    lifecycle: &SessionLifecycle,
    pool: &sqlx::SqlitePool,
    config: &CleanupConfig,
) -> Result<usize> {
    let cutoff = lifecycle.now() - ChronoDuration::hours(config.stale_after_hours as i64);
    let stale = {
        let mut conn = pool.acquire().await?;
        sessions::list_stale(&mut conn, cutoff).await?
    };

    let mut ended = 0;
    for session_id in stale.iter().map(|s| s.id) {
        match lifecycle.end(session_id).await {
            Ok(EndOutcome::Concluded {
                final_duration_seconds,
                ..
            }) => {
                warn!(
                    "Ended stale session {} ({}s active, older than {}h)",
                    session_id, final_duration_seconds, config.stale_after_hours
                );
                ended += 1;
            }
            Ok(EndOutcome::AlreadyConcluded) => {
                debug!("Stale session {} concluded concurrently", session_id);
            }
            Err(e) => warn!("Failed to end stale session {}: {}", session_id, e),
        }
    }

    Ok(ended)
}

/// Active sessions started more than `threshold_hours` ago, oldest first
pub async fn list_stuck_sessions(
    lifecycle: &SessionLifecycle,
    pool: &sqlx::SqlitePool,
    threshold_hours: u64,
) -> Result<Vec<StuckSession>> {
    let now = lifecycle.now();
    let cutoff = now - ChronoDuration::hours(threshold_hours as i64);
    let mut conn = pool.acquire().await?;
    let stuck = sessions::list_stale(&mut conn, cutoff).await?;

    Ok(stuck
        .into_iter()
        .map(|session| StuckSession {
            hours_active: seconds_between(session.start_time, now) as f64 / 3600.0,
            session,
        })
        .collect())
}

/// Operator-initiated end of a session
///
/// Unlike a participant's end, an unknown session id is `NotFound`.
pub async fn force_end(
    lifecycle: &SessionLifecycle,
    session_id: Uuid,
    reason: Option<&str>,
    ended_by: Option<&str>,
) -> Result<EndOutcome> {
    let session = lifecycle.get(session_id).await?;
    let hours = seconds_between(session.start_time, lifecycle.now()) / 3600;
    let outcome = lifecycle.end(session_id).await?;

    if let EndOutcome::Concluded { .. } = outcome {
        warn!(
            "Session {} force-ended by {} after {}h: {}",
            session_id,
            ended_by.unwrap_or("operator"),
            hours,
            reason.unwrap_or("No reason provided")
        );
    }
    Ok(outcome)
}

/// Counts of active sessions and the recent completion record
pub async fn meeting_health(
    lifecycle: &SessionLifecycle,
    pool: &sqlx::SqlitePool,
    window_hours: u64,
) -> Result<MeetingHealth> {
    if window_hours == 0 {
        return Err(Error::InvalidInput("hours must be positive".to_string()));
    }
    let now = lifecycle.now();
    let since = now - ChronoDuration::hours(window_hours as i64);

    let mut conn = pool.acquire().await?;
    let (active_count, organizations_with_meetings) = sessions::count_active(&mut conn).await?;
    let recent = sessions::list_created_since(&mut conn, since).await?;

    let completed: Vec<i64> = recent
        .iter()
        .filter(|s| !s.is_active)
        .map(|s| s.active_duration_seconds(now))
        .collect();
    let avg_duration_minutes = if completed.is_empty() {
        0
    } else {
        let mean_seconds = completed.iter().sum::<i64>() as f64 / completed.len() as f64;
        (mean_seconds / 60.0).round() as i64
    };

    Ok(MeetingHealth {
        active_count,
        organizations_with_meetings,
        window_hours,
        meetings_in_window: recent.len(),
        completed_meetings: completed.len(),
        avg_duration_minutes,
    })
}

/// Run the sweep at startup and then every `interval_minutes` until cancelled
pub fn spawn_cleanup_task(
    lifecycle: SessionLifecycle,
    pool: sqlx::SqlitePool,
    config: CleanupConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Stale session cleanup every {} min (limit {}h)",
            config.interval_minutes, config.stale_after_hours
        );
        // First tick completes immediately, which gives the startup sweep
        let mut ticker = interval(Duration::from_secs(config.interval_minutes.max(1) * 60));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Stale session cleanup stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match end_stale_sessions(&lifecycle, &pool, &config).await {
                        Ok(0) => debug!("No stale sessions"),
                        Ok(n) => info!("Cleanup ended {} stale session(s)", n),
                        Err(e) => warn!("Stale session cleanup failed: {}", e),
                    }
                }
            }
        }
    })
}
