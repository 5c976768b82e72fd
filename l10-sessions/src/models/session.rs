//! Meeting session model
//!
//! One occurrence of a recurring team meeting, from start to conclusion.
//! Active duration is derived from the stored timestamps every time it is
//! read; nothing client-supplied feeds into it.

use chrono::{DateTime, Utc};
use l10_common::api::SessionView;
use l10_common::time::seconds_between;
use uuid::Uuid;

/// Persisted meeting session
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingSession {
    pub id: Uuid,
    pub organization_id: String,
    pub team_id: String,
    pub meeting_type: String,
    pub facilitator_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub is_active: bool,
    pub is_paused: bool,
    /// Set exactly while `is_paused`
    pub last_pause_time: Option<DateTime<Utc>>,
    pub last_resume_time: Option<DateTime<Utc>>,
    /// Seconds spent in completed pauses; never decreases
    pub total_paused_duration: i64,
    pub current_section: Option<String>,
    pub current_section_start: Option<DateTime<Utc>>,
    /// Advisory client checkpoint, never used for duration accounting
    pub last_checkpoint_at: Option<DateTime<Utc>>,
    pub last_checkpoint_elapsed: Option<i64>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MeetingSession {
    /// Create a new running session starting at `now`
    pub fn new(
        organization_id: &str,
        team_id: &str,
        meeting_type: &str,
        facilitator_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id: organization_id.to_string(),
            team_id: team_id.to_string(),
            meeting_type: meeting_type.to_string(),
            facilitator_id,
            start_time: now,
            is_active: true,
            is_paused: false,
            last_pause_time: None,
            last_resume_time: None,
            total_paused_duration: 0,
            current_section: None,
            current_section_start: None,
            last_checkpoint_at: None,
            last_checkpoint_elapsed: None,
            ended_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Seconds of the currently open pause, 0 when running
    pub fn open_pause_seconds(&self, now: DateTime<Utc>) -> i64 {
        match (self.is_paused, self.last_pause_time) {
            (true, Some(paused_at)) => seconds_between(paused_at, self.effective_now(now)),
            _ => 0,
        }
    }

    /// Wall-clock seconds since start, excluding completed and open pauses
    ///
    /// Ended sessions are measured up to `ended_at`.
    pub fn active_duration_seconds(&self, now: DateTime<Utc>) -> i64 {
        let end = self.effective_now(now);
        let gross = seconds_between(self.start_time, end);
        (gross - self.total_paused_duration - self.open_pause_seconds(now)).max(0)
    }

    /// Whether the session lives under the given organization and team
    pub fn belongs_to(&self, organization_id: &str, team_id: &str) -> bool {
        self.organization_id == organization_id && self.team_id == team_id
    }

    fn effective_now(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if self.is_active {
            now
        } else {
            self.ended_at.unwrap_or(now)
        }
    }

    /// Wire representation with the derived duration filled in
    pub fn to_view(&self, now: DateTime<Utc>) -> SessionView {
        SessionView {
            id: self.id,
            organization_id: self.organization_id.clone(),
            team_id: self.team_id.clone(),
            meeting_type: self.meeting_type.clone(),
            facilitator_id: self.facilitator_id.clone(),
            start_time: self.start_time,
            is_active: self.is_active,
            is_paused: self.is_paused,
            last_pause_time: self.last_pause_time,
            last_resume_time: self.last_resume_time,
            total_paused_duration: self.total_paused_duration,
            current_section: self.current_section.clone(),
            current_section_start: self.current_section_start,
            ended_at: self.ended_at,
            active_duration_seconds: self.active_duration_seconds(now),
            final_duration_seconds: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs)
    }

    #[test]
    fn test_new_session_defaults() {
        let session = MeetingSession::new("org", "team", "weekly", None, at(0));
        assert!(session.is_active);
        assert!(!session.is_paused);
        assert_eq!(session.total_paused_duration, 0);
        assert_eq!(session.active_duration_seconds(at(90)), 90);
    }

    #[test]
    fn test_open_pause_is_excluded() {
        let mut session = MeetingSession::new("org", "team", "weekly", None, at(0));
        session.is_paused = true;
        session.last_pause_time = Some(at(300));

        // Paused at 300, now 420: the 120s open pause is not active time
        assert_eq!(session.open_pause_seconds(at(420)), 120);
        assert_eq!(session.active_duration_seconds(at(420)), 300);
    }

    #[test]
    fn test_completed_pauses_are_excluded() {
        let mut session = MeetingSession::new("org", "team", "weekly", None, at(0));
        session.total_paused_duration = 120;
        assert_eq!(session.active_duration_seconds(at(500)), 380);
    }

    #[test]
    fn test_ended_session_measured_to_end() {
        let mut session = MeetingSession::new("org", "team", "weekly", None, at(0));
        session.is_active = false;
        session.ended_at = Some(at(600));
        assert_eq!(session.active_duration_seconds(at(5000)), 600);
    }

    #[test]
    fn test_duration_never_negative() {
        let session = MeetingSession::new("org", "team", "weekly", None, at(100));
        assert_eq!(session.active_duration_seconds(at(50)), 0);
    }

    #[test]
    fn test_belongs_to_scope() {
        let session = MeetingSession::new("org-1", "team-1", "weekly", None, at(0));
        assert!(session.belongs_to("org-1", "team-1"));
        assert!(!session.belongs_to("org-1", "team-2"));
        assert!(!session.belongs_to("org-2", "team-1"));
    }

    #[test]
    fn test_view_carries_derived_duration() {
        let session = MeetingSession::new("org", "team", "weekly", Some("u1".into()), at(0));
        let view = session.to_view(at(42));
        assert_eq!(view.active_duration_seconds, 42);
        assert_eq!(view.facilitator_id.as_deref(), Some("u1"));
        assert!(view.final_duration_seconds.is_none());
    }
}
