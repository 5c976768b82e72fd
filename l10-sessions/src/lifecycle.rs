//! Session lifecycle service
//!
//! start / get_active / pause / resume / end / save_timer_state /
//! update_section / status. Every mutation runs in one transaction whose
//! `UPDATE` is guarded on the expected prior state, so of two racing callers
//! exactly one succeeds and the other receives `InvalidState` or `Conflict`.

use chrono::{DateTime, Utc};
use l10_common::api::{DEFAULT_MEETING_TYPE, SessionStatusResponse};
use l10_common::events::{EventBus, MeetingEvent};
use l10_common::time::{seconds_between, Clock};
use l10_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::{self, pause_events, sessions};
use crate::models::{MeetingSession, PauseEvent};
use crate::sections::{self, SectionTracker, SectionsSnapshot};

/// Result of ending a session
///
/// Ending is idempotent: a missing or already inactive session is reported
/// as `AlreadyConcluded` rather than as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum EndOutcome {
    Concluded {
        session: MeetingSession,
        final_duration_seconds: i64,
    },
    AlreadyConcluded,
}

/// Everything the status endpoint reports about one session
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub session: MeetingSession,
    pub pause_history: Vec<PauseEvent>,
    pub sections: SectionsSnapshot,
}

impl SessionStatus {
    pub fn to_response(&self) -> SessionStatusResponse {
        let now = self.sections.as_of;
        SessionStatusResponse {
            session: self.session.to_view(now),
            pause_history: self.pause_history.iter().map(PauseEvent::to_view).collect(),
            sections: self.sections.sections.iter().map(|t| t.to_view(now)).collect(),
            current_section_seconds: self.sections.current_section_seconds,
            pace: self.sections.pace,
        }
    }
}

#[derive(Clone)]
pub struct SessionLifecycle {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    tracker: SectionTracker,
}

impl SessionLifecycle {
    pub fn new(
        pool: SqlitePool,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
        tracker: SectionTracker,
    ) -> Self {
        Self {
            pool,
            clock,
            event_bus,
            tracker,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create a new active session
    ///
    /// `Conflict` when one is already active for the organization, team and
    /// meeting type.
    pub async fn start(
        &self,
        organization_id: &str,
        team_id: &str,
        meeting_type: Option<&str>,
        facilitator_id: Option<&str>,
    ) -> Result<MeetingSession> {
        let meeting_type = meeting_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_MEETING_TYPE);
        if organization_id.trim().is_empty() || team_id.trim().is_empty() {
            return Err(Error::InvalidInput(
                "organization_id and team_id are required".to_string(),
            ));
        }

        let now = self.clock.now();
        let mut tx = db::begin_write(&self.pool).await?;

        if let Some(existing) =
            sessions::find_active(&mut tx, organization_id, team_id, meeting_type).await?
        {
            return Err(Error::Conflict(format!(
                "An active {} meeting already exists for team {} (session {})",
                meeting_type, team_id, existing.id
            )));
        }

        let session = MeetingSession::new(
            organization_id,
            team_id,
            meeting_type,
            facilitator_id.map(str::to_string),
            now,
        );
        sessions::insert_session(&mut tx, &session).await?;
        tx.commit().await?;

        info!(
            "Started {} session {} for team {}",
            meeting_type, session.id, team_id
        );
        self.event_bus.emit_lossy(MeetingEvent::SessionStarted {
            session_id: session.id,
            organization_id: session.organization_id.clone(),
            team_id: session.team_id.clone(),
            meeting_type: session.meeting_type.clone(),
            timestamp: now,
        });

        Ok(session)
    }

    pub async fn get_active(
        &self,
        organization_id: &str,
        team_id: &str,
        meeting_type: &str,
    ) -> Result<Option<MeetingSession>> {
        let mut conn = self.pool.acquire().await?;
        sessions::find_active(&mut conn, organization_id, team_id, meeting_type).await
    }

    /// Load a session by id, active or not
    pub async fn get(&self, session_id: Uuid) -> Result<MeetingSession> {
        let mut conn = self.pool.acquire().await?;
        sessions::load_session(&mut conn, session_id)
            .await?
            .ok_or_else(|| not_found(session_id))
    }

    pub async fn pause(
        &self,
        session_id: Uuid,
        reason: Option<&str>,
        paused_by: Option<&str>,
    ) -> Result<MeetingSession> {
        let now = self.clock.now();
        let mut tx = db::begin_write(&self.pool).await?;

        let session = sessions::load_session(&mut tx, session_id)
            .await?
            .ok_or_else(|| not_found(session_id))?;
        if !session.is_active {
            return Err(ended(session_id));
        }
        if session.is_paused || !sessions::mark_paused(&mut tx, session_id, now).await? {
            return Err(Error::InvalidState("Session is already paused".to_string()));
        }

        let event = PauseEvent::open(
            session_id,
            now,
            paused_by.map(str::to_string),
            reason.map(str::to_string),
        );
        pause_events::insert_pause_event(&mut tx, &event).await?;
        sections::freeze_in_progress(&mut tx, session_id, now).await?;

        let session = sessions::load_session(&mut tx, session_id)
            .await?
            .ok_or_else(|| not_found(session_id))?;
        tx.commit().await?;

        info!(
            "Paused session {} at {}s active",
            session_id,
            session.active_duration_seconds(now)
        );
        self.event_bus.emit_lossy(MeetingEvent::TimerPaused {
            session_id,
            reason: reason.map(str::to_string),
            timestamp: now,
        });

        Ok(session)
    }

    pub async fn resume(&self, session_id: Uuid, resumed_by: Option<&str>) -> Result<MeetingSession> {
        let now = self.clock.now();
        let mut tx = db::begin_write(&self.pool).await?;

        let session = sessions::load_session(&mut tx, session_id)
            .await?
            .ok_or_else(|| not_found(session_id))?;
        if !session.is_active {
            return Err(ended(session_id));
        }
        let paused_at = match (session.is_paused, session.last_pause_time) {
            (true, Some(paused_at)) => paused_at,
            _ => return Err(Error::InvalidState("Session is not paused".to_string())),
        };

        let paused_seconds = seconds_between(paused_at, now);
        if !sessions::mark_resumed(&mut tx, session_id, paused_at, paused_seconds, now).await? {
            return Err(Error::InvalidState("Session is not paused".to_string()));
        }
        if pause_events::close_open_pause_event(&mut tx, session_id, resumed_by, now)
            .await?
            .is_none()
        {
            warn!("Session {} resumed without an open pause event", session_id);
        }
        sections::thaw_in_progress(&mut tx, session_id, now).await?;

        let session = sessions::load_session(&mut tx, session_id)
            .await?
            .ok_or_else(|| not_found(session_id))?;
        tx.commit().await?;

        let active_duration_seconds = session.active_duration_seconds(now);
        info!(
            "Resumed session {} after {}s pause ({}s active)",
            session_id, paused_seconds, active_duration_seconds
        );
        self.event_bus.emit_lossy(MeetingEvent::TimerResumed {
            session_id,
            active_duration_seconds,
            timestamp: now,
        });

        Ok(session)
    }

    /// Conclude a session
    pub async fn end(&self, session_id: Uuid) -> Result<EndOutcome> {
        let now = self.clock.now();
        let mut tx = db::begin_write(&self.pool).await?;

        let session = match sessions::load_session(&mut tx, session_id).await? {
            Some(session) if session.is_active => session,
            _ => {
                debug!("Session {} already concluded", session_id);
                return Ok(EndOutcome::AlreadyConcluded);
            }
        };

        let open_pause_seconds = session.open_pause_seconds(now);
        if !sessions::mark_ended(&mut tx, session_id, open_pause_seconds, now).await? {
            return Ok(EndOutcome::AlreadyConcluded);
        }
        if session.is_paused {
            pause_events::close_open_pause_event(&mut tx, session_id, None, now).await?;
        }
        sections::finish_in_progress(&mut tx, session_id, now).await?;

        let session = sessions::load_session(&mut tx, session_id)
            .await?
            .ok_or_else(|| not_found(session_id))?;
        tx.commit().await?;

        let final_duration_seconds = session.active_duration_seconds(now);
        info!(
            "Ended session {} after {}s active ({}s paused)",
            session_id, final_duration_seconds, session.total_paused_duration
        );
        self.event_bus.emit_lossy(MeetingEvent::SessionEnded {
            session_id,
            final_duration_seconds,
            timestamp: now,
        });

        Ok(EndOutcome::Concluded {
            session,
            final_duration_seconds,
        })
    }

    /// Record a client checkpoint of the displayed elapsed time
    ///
    /// The value is advisory; durations are always derived from timestamps.
    pub async fn save_timer_state(&self, session_id: Uuid, elapsed_seconds: i64) -> Result<()> {
        if elapsed_seconds < 0 {
            return Err(Error::InvalidInput(
                "elapsed_seconds must not be negative".to_string(),
            ));
        }

        let now = self.clock.now();
        let mut conn = self.pool.acquire().await?;
        if !sessions::save_checkpoint(&mut conn, session_id, elapsed_seconds, now).await? {
            return Err(Error::NotFound(format!(
                "No active meeting session {}",
                session_id
            )));
        }
        debug!("Checkpoint for session {}: {}s", session_id, elapsed_seconds);
        Ok(())
    }

    /// Record which agenda section the meeting is on
    pub async fn update_section(&self, session_id: Uuid, section: &str) -> Result<MeetingSession> {
        let section = section.trim();
        if section.is_empty() {
            return Err(Error::InvalidInput("section is required".to_string()));
        }

        let now = self.clock.now();
        let mut tx = db::begin_write(&self.pool).await?;

        let session = sessions::load_session(&mut tx, session_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| Error::NotFound(format!("No active meeting session {}", session_id)))?;
        let section_id = self
            .tracker
            .agenda()
            .for_meeting_type(&session.meeting_type)
            .resolve(section)
            .map(|s| s.id.clone())
            .unwrap_or_else(|| section.to_string());

        if !sessions::set_current_section(&mut tx, session_id, &section_id, now).await? {
            return Err(Error::NotFound(format!("No active meeting session {}", session_id)));
        }
        let session = sessions::load_session(&mut tx, session_id)
            .await?
            .ok_or_else(|| not_found(session_id))?;
        tx.commit().await?;

        debug!("Session {} current section: {}", session_id, section_id);
        self.event_bus.emit_lossy(MeetingEvent::SectionChange {
            session_id,
            section_id,
            timestamp: now,
        });

        Ok(session)
    }

    /// Session with pause history, section timings and pace
    pub async fn status(&self, session_id: Uuid) -> Result<SessionStatus> {
        let mut conn = self.pool.acquire().await?;
        let session = sessions::load_session(&mut conn, session_id)
            .await?
            .ok_or_else(|| not_found(session_id))?;
        let pause_history = pause_events::list_pause_events(&mut conn, session_id).await?;
        let sections = self.tracker.snapshot_in(&mut conn, &session).await?;

        Ok(SessionStatus {
            session,
            pause_history,
            sections,
        })
    }
}

fn not_found(session_id: Uuid) -> Error {
    Error::NotFound(format!("Meeting session {} not found", session_id))
}

fn ended(session_id: Uuid) -> Error {
    Error::InvalidState(format!("Meeting session {} has already ended", session_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agenda::AgendaConfig;
    use crate::db::init_memory_database;
    use l10_common::api::{AgendaSection, Pace};
    use l10_common::config::PaceThresholds;
    use l10_common::time::ManualClock;
    use std::collections::HashMap;

    struct Fixture {
        clock: ManualClock,
        lifecycle: SessionLifecycle,
        tracker: SectionTracker,
        event_bus: EventBus,
    }

    async fn fixture_with_agenda(agenda: AgendaConfig) -> Fixture {
        let pool = init_memory_database().await.unwrap();
        let clock = ManualClock::at_epoch();
        let event_bus = EventBus::new(64);
        let clock_arc: Arc<dyn Clock> = Arc::new(clock.clone());
        let tracker = SectionTracker::new(
            pool.clone(),
            clock_arc.clone(),
            event_bus.clone(),
            Arc::new(agenda),
            PaceThresholds::default(),
        );
        let lifecycle = SessionLifecycle::new(pool, clock_arc, event_bus.clone(), tracker.clone());
        Fixture {
            clock,
            lifecycle,
            tracker,
            event_bus,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with_agenda(AgendaConfig::default()).await
    }

    #[tokio::test]
    async fn test_pause_resume_accounting_scenario() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();

        f.clock.advance(300);
        let paused = f.lifecycle.pause(session.id, Some("break"), None).await.unwrap();
        assert!(paused.is_paused);
        assert_eq!(paused.active_duration_seconds(f.lifecycle.now()), 300);

        f.clock.advance(120);
        let resumed = f.lifecycle.resume(session.id, None).await.unwrap();
        assert!(!resumed.is_paused);
        assert_eq!(resumed.total_paused_duration, 120);

        f.clock.advance(80);
        let current = f.lifecycle.get(session.id).await.unwrap();
        assert_eq!(current.active_duration_seconds(f.lifecycle.now()), 380);
    }

    #[tokio::test]
    async fn test_double_pause_and_resume_not_paused() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();

        let resume_running = f.lifecycle.resume(session.id, None).await;
        assert!(matches!(resume_running, Err(Error::InvalidState(_))));

        f.lifecycle.pause(session.id, None, None).await.unwrap();
        f.clock.advance(30);
        let second_pause = f.lifecycle.pause(session.id, None, None).await;
        assert!(matches!(second_pause, Err(Error::InvalidState(_))));

        // The failed pause must not disturb accounting
        let current = f.lifecycle.get(session.id).await.unwrap();
        assert_eq!(current.last_pause_time, Some(session.start_time));
    }

    #[tokio::test]
    async fn test_pause_unknown_session_is_not_found() {
        let f = fixture().await;
        let result = f.lifecycle.pause(Uuid::new_v4(), None, None).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        let result = f.lifecycle.resume(Uuid::new_v4(), None).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_total_paused_never_decreases() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();

        let mut last_total = 0;
        for pause_len in [10, 0, 45] {
            f.clock.advance(20);
            f.lifecycle.pause(session.id, None, None).await.unwrap();
            f.clock.advance(pause_len);
            let resumed = f.lifecycle.resume(session.id, None).await.unwrap();
            assert!(resumed.total_paused_duration >= last_total);
            last_total = resumed.total_paused_duration;
        }
        assert_eq!(last_total, 55);
    }

    #[tokio::test]
    async fn test_start_conflicts_with_active_session() {
        let f = fixture().await;
        f.lifecycle.start("org", "team", Some("weekly"), None).await.unwrap();

        let second = f.lifecycle.start("org", "team", Some("weekly"), None).await;
        assert!(matches!(second, Err(Error::Conflict(_))));

        f.lifecycle.start("org", "team", Some("quarterly"), None).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_active_lookup() {
        let f = fixture().await;
        assert!(f.lifecycle.get_active("org", "team", "weekly").await.unwrap().is_none());

        let session = f.lifecycle.start("org", "team", None, Some("u1")).await.unwrap();
        let active = f.lifecycle.get_active("org", "team", "weekly").await.unwrap().unwrap();
        assert_eq!(active.id, session.id);
        assert_eq!(active.facilitator_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_end_is_idempotent() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();
        f.clock.advance(600);

        match f.lifecycle.end(session.id).await.unwrap() {
            EndOutcome::Concluded {
                session,
                final_duration_seconds,
            } => {
                assert!(!session.is_active);
                assert_eq!(final_duration_seconds, 600);
            }
            EndOutcome::AlreadyConcluded => panic!("first end should conclude"),
        }

        assert_eq!(
            f.lifecycle.end(session.id).await.unwrap(),
            EndOutcome::AlreadyConcluded
        );
        assert_eq!(
            f.lifecycle.end(Uuid::new_v4()).await.unwrap(),
            EndOutcome::AlreadyConcluded
        );
        assert!(f.lifecycle.get_active("org", "team", "weekly").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_end_while_paused_closes_pause() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();
        f.clock.advance(100);
        f.lifecycle.pause(session.id, None, None).await.unwrap();
        f.clock.advance(50);

        let EndOutcome::Concluded {
            session: ended,
            final_duration_seconds,
        } = f.lifecycle.end(session.id).await.unwrap()
        else {
            panic!("expected conclusion");
        };
        assert_eq!(final_duration_seconds, 100);
        assert_eq!(ended.total_paused_duration, 50);
        assert!(!ended.is_paused);
        assert!(ended.last_pause_time.is_none());

        let status = f.lifecycle.status(session.id).await.unwrap();
        assert_eq!(status.pause_history[0].duration_seconds, Some(50));
    }

    #[tokio::test]
    async fn test_mutations_on_ended_session_are_invalid() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();
        f.lifecycle.end(session.id).await.unwrap();

        assert!(matches!(
            f.lifecycle.pause(session.id, None, None).await,
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            f.tracker.start_section(session.id, "segue").await,
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            f.lifecycle.save_timer_state(session.id, 10).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            f.lifecycle.update_section(session.id, "ids").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_timer_state_is_advisory() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();
        f.clock.advance(60);

        f.lifecycle.save_timer_state(session.id, 9999).await.unwrap();
        let current = f.lifecycle.get(session.id).await.unwrap();
        assert_eq!(current.last_checkpoint_elapsed, Some(9999));
        assert_eq!(current.active_duration_seconds(f.lifecycle.now()), 60);

        assert!(matches!(
            f.lifecycle.save_timer_state(session.id, -1).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_update_section_resolves_aliases() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();
        let mut events = f.event_bus.subscribe();

        let updated = f.lifecycle.update_section(session.id, "issues").await.unwrap();
        assert_eq!(updated.current_section.as_deref(), Some("ids"));
        assert!(updated.current_section_start.is_some());

        let event = events.recv().await.unwrap();
        assert_eq!(event.event_type(), "section-change");
    }

    #[tokio::test]
    async fn test_section_revisit_accumulates() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();

        f.tracker.start_section(session.id, "segue").await.unwrap();
        f.clock.advance(30);
        f.tracker.start_section(session.id, "scorecard").await.unwrap();
        f.clock.advance(20);
        f.tracker.start_section(session.id, "segue").await.unwrap();
        f.clock.advance(10);
        let segue = f.tracker.end_section(session.id, "segue").await.unwrap();

        assert_eq!(segue.cumulative_seconds, 40);
        assert_eq!(segue.visits, 2);

        let snapshot = f.tracker.snapshot(session.id).await.unwrap();
        let scorecard = snapshot
            .sections
            .iter()
            .find(|t| t.section_id == "scorecard")
            .unwrap();
        assert_eq!(scorecard.cumulative_seconds, 20);
        assert!(!scorecard.in_progress());
    }

    #[tokio::test]
    async fn test_restart_in_progress_section_is_noop() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();

        f.tracker.start_section(session.id, "ids").await.unwrap();
        f.clock.advance(15);
        let again = f.tracker.start_section(session.id, "issues").await.unwrap();
        assert_eq!(again.visits, 1);
        assert_eq!(again.live_cumulative_seconds(f.lifecycle.now()), 15);
    }

    #[tokio::test]
    async fn test_pause_freezes_section() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();

        f.tracker.start_section(session.id, "ids").await.unwrap();
        f.clock.advance(100);
        f.lifecycle.pause(session.id, None, None).await.unwrap();
        f.clock.advance(300);

        let status = f.lifecycle.status(session.id).await.unwrap();
        assert_eq!(status.sections.current_section_seconds, 100);

        f.lifecycle.resume(session.id, None).await.unwrap();
        f.clock.advance(50);
        let ids = f.tracker.end_section(session.id, "ids").await.unwrap();
        assert_eq!(ids.cumulative_seconds, 150);
    }

    #[tokio::test]
    async fn test_section_errors() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();

        assert!(matches!(
            f.tracker.start_section(Uuid::new_v4(), "segue").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            f.tracker.start_section(session.id, "lunch").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            f.tracker.end_section(session.id, "segue").await,
            Err(Error::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_end_closes_section_visit() {
        let f = fixture().await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();
        f.tracker.start_section(session.id, "segue").await.unwrap();
        f.clock.advance(400);
        f.lifecycle.end(session.id).await.unwrap();

        let snapshot = f.tracker.snapshot(session.id).await.unwrap();
        let segue = &snapshot.sections[0];
        assert!(!segue.in_progress());
        assert_eq!(segue.cumulative_seconds, 400);
        assert_eq!(segue.overrun_seconds, 100);
    }

    #[tokio::test]
    async fn test_status_reports_critical_pace() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "weekly".to_string(),
            vec![
                AgendaSection::new("one", "One", 20),
                AgendaSection::new("two", "Two", 20),
                AgendaSection::new("three", "Three", 20),
            ],
        );
        let f = fixture_with_agenda(AgendaConfig::new(overrides)).await;
        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();

        f.tracker.start_section(session.id, "one").await.unwrap();
        f.clock.advance(2000);

        let status = f.lifecycle.status(session.id).await.unwrap();
        assert_eq!(status.sections.current_section_seconds, 2000);
        assert_eq!(status.sections.pace, Pace::Critical);

        let response = status.to_response();
        assert_eq!(response.sections.len(), 3);
        assert_eq!(response.session.active_duration_seconds, 2000);
    }

    #[tokio::test]
    async fn test_lifecycle_emits_events() {
        let f = fixture().await;
        let mut events = f.event_bus.subscribe();

        let session = f.lifecycle.start("org", "team", None, None).await.unwrap();
        f.lifecycle.pause(session.id, None, None).await.unwrap();
        f.clock.advance(5);
        f.lifecycle.resume(session.id, None).await.unwrap();
        f.lifecycle.end(session.id).await.unwrap();

        let mut names = Vec::new();
        while let Ok(event) = events.try_recv() {
            assert_eq!(event.session_id(), session.id);
            names.push(event.event_type());
        }
        assert_eq!(
            names,
            vec!["session-started", "timer-paused", "timer-resumed", "session-ended"]
        );
    }
}
