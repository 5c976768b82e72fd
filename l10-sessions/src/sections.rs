//! Section timing tracker
//!
//! Attributes active meeting time to agenda sections. A section accrues time
//! only while a visit is in progress and the session is running; session
//! pause/resume freeze and thaw the in-progress visit inside the same
//! transaction that flips the session state.

use chrono::{DateTime, Utc};
use l10_common::api::Pace;
use l10_common::config::PaceThresholds;
use l10_common::events::{EventBus, MeetingEvent};
use l10_common::time::Clock;
use l10_common::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agenda::AgendaConfig;
use crate::db::{self, section_timings, sessions};
use crate::models::{MeetingSession, SectionTiming};
use crate::pace;

/// Section timings of one session plus the derived pace
#[derive(Debug, Clone)]
pub struct SectionsSnapshot {
    /// Agenda order; visited sections no longer on the agenda come last
    pub sections: Vec<SectionTiming>,
    pub current_section_seconds: i64,
    pub pace: Pace,
    pub as_of: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SectionTracker {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    agenda: Arc<AgendaConfig>,
    thresholds: PaceThresholds,
}

impl SectionTracker {
    pub fn new(
        pool: SqlitePool,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
        agenda: Arc<AgendaConfig>,
        thresholds: PaceThresholds,
    ) -> Self {
        Self {
            pool,
            clock,
            event_bus,
            agenda,
            thresholds,
        }
    }

    pub fn agenda(&self) -> &AgendaConfig {
        &self.agenda
    }

    /// Begin (or continue) time attribution for a section
    ///
    /// Any other section with a visit in progress is closed first. Starting
    /// the section that is already in progress changes nothing.
    pub async fn start_section(&self, session_id: Uuid, raw_section: &str) -> Result<SectionTiming> {
        let now = self.clock.now();
        let mut tx = db::begin_write(&self.pool).await?;

        let session = sessions::load_session(&mut tx, session_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Meeting session {} not found", session_id)))?;
        if !session.is_active {
            return Err(Error::InvalidState(format!(
                "Meeting session {} has already ended",
                session_id
            )));
        }

        let agenda = self.agenda.for_meeting_type(&session.meeting_type);
        let section = agenda.resolve(raw_section).ok_or_else(|| {
            Error::NotFound(format!(
                "Unknown section '{}' for {} meeting",
                raw_section, session.meeting_type
            ))
        })?;

        let mut current: Option<SectionTiming> = None;
        for mut open in section_timings::list_in_progress(&mut tx, session_id).await? {
            if open.section_id == section.id {
                current = Some(open);
                continue;
            }
            let added = open.finish_visit(now);
            if let Err(e) = section_timings::save_timing(&mut tx, &open).await {
                warn!(
                    "Failed to end section {} of session {}: {}",
                    open.section_id, session_id, e
                );
                continue;
            }
            debug!(
                "Ended section {} of session {} (+{}s, overrun {}s)",
                open.section_id, session_id, added, open.overrun_seconds
            );
        }

        if let Some(timing) = current {
            tx.commit().await?;
            debug!("Section {} already in progress for session {}", section.id, session_id);
            return Ok(timing);
        }

        let mut timing = section_timings::load_timing(&mut tx, session_id, &section.id)
            .await?
            .unwrap_or_else(|| SectionTiming::new(session_id, &section.id, section.allocated_seconds()));
        timing.allocated_seconds = section.allocated_seconds();
        timing.begin_visit(now, session.is_paused);
        section_timings::save_timing(&mut tx, &timing).await?;
        sessions::set_current_section(&mut tx, session_id, &section.id, now).await?;
        tx.commit().await?;

        info!(
            "Session {} entered section {} (visit {}, {}s so far)",
            session_id, section.id, timing.visits, timing.cumulative_seconds
        );
        self.event_bus.emit_lossy(MeetingEvent::SectionChange {
            session_id,
            section_id: section.id.clone(),
            timestamp: now,
        });

        Ok(timing)
    }

    /// Close the in-progress visit of a section and record its overrun
    pub async fn end_section(&self, session_id: Uuid, raw_section: &str) -> Result<SectionTiming> {
        let now = self.clock.now();
        let mut tx = db::begin_write(&self.pool).await?;

        let session = sessions::load_session(&mut tx, session_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Meeting session {} not found", session_id)))?;
        let section_id = self
            .agenda
            .for_meeting_type(&session.meeting_type)
            .resolve(raw_section)
            .map(|s| s.id.clone())
            .unwrap_or_else(|| raw_section.trim().to_string());

        let mut timing = section_timings::load_timing(&mut tx, session_id, &section_id)
            .await?
            .filter(SectionTiming::in_progress)
            .ok_or_else(|| {
                Error::InvalidState(format!("Section {} has no visit in progress", section_id))
            })?;

        let added = timing.finish_visit(now);
        section_timings::save_timing(&mut tx, &timing).await?;
        tx.commit().await?;

        info!(
            "Session {} left section {} (+{}s, total {}s, overrun {}s)",
            session_id, section_id, added, timing.cumulative_seconds, timing.overrun_seconds
        );
        Ok(timing)
    }

    /// All section timings of a session with live values and pace
    pub async fn snapshot(&self, session_id: Uuid) -> Result<SectionsSnapshot> {
        let mut conn = self.pool.acquire().await?;
        let session = sessions::load_session(&mut conn, session_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Meeting session {} not found", session_id)))?;
        self.snapshot_in(&mut conn, &session).await
    }

    pub(crate) async fn snapshot_in(
        &self,
        conn: &mut SqliteConnection,
        session: &MeetingSession,
    ) -> Result<SectionsSnapshot> {
        let now = self.clock.now();
        let agenda = self.agenda.for_meeting_type(&session.meeting_type);
        let mut stored = section_timings::list_timings(conn, session.id).await?;

        let mut sections = Vec::with_capacity(agenda.sections().len());
        for entry in agenda.sections() {
            match stored.iter().position(|t| t.section_id == entry.id) {
                Some(i) => sections.push(stored.swap_remove(i)),
                None => sections.push(SectionTiming::new(
                    session.id,
                    &entry.id,
                    entry.allocated_seconds(),
                )),
            }
        }
        sections.extend(stored);

        let current_section = session
            .current_section
            .as_deref()
            .and_then(|raw| agenda.resolve(raw))
            .map(|s| s.id.as_str());
        let current_section_seconds = current_section
            .and_then(|id| sections.iter().find(|t| t.section_id == id))
            .map(|t| t.live_cumulative_seconds(now))
            .unwrap_or(0);
        let pace = pace::classify(
            agenda,
            current_section,
            current_section_seconds,
            session.active_duration_seconds(now),
            &self.thresholds,
        );

        Ok(SectionsSnapshot {
            sections,
            current_section_seconds,
            pace,
            as_of: now,
        })
    }
}

/// Stop the clock of the in-progress section when the session pauses
pub(crate) async fn freeze_in_progress(
    conn: &mut SqliteConnection,
    session_id: Uuid,
    now: DateTime<Utc>,
) -> Result<()> {
    for mut timing in section_timings::list_in_progress(conn, session_id).await? {
        let added = timing.freeze(now);
        section_timings::save_timing(conn, &timing).await?;
        debug!("Froze section {} (+{}s)", timing.section_id, added);
    }
    Ok(())
}

/// Restart the clock of the in-progress section when the session resumes
pub(crate) async fn thaw_in_progress(
    conn: &mut SqliteConnection,
    session_id: Uuid,
    now: DateTime<Utc>,
) -> Result<()> {
    for mut timing in section_timings::list_in_progress(conn, session_id).await? {
        timing.thaw(now);
        section_timings::save_timing(conn, &timing).await?;
    }
    Ok(())
}

/// Close every in-progress visit when the session ends
pub(crate) async fn finish_in_progress(
    conn: &mut SqliteConnection,
    session_id: Uuid,
    now: DateTime<Utc>,
) -> Result<()> {
    for mut timing in section_timings::list_in_progress(conn, session_id).await? {
        timing.finish_visit(now);
        section_timings::save_timing(conn, &timing).await?;
    }
    Ok(())
}
