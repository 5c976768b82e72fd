//! Pause history entry

use chrono::{DateTime, Utc};
use l10_common::api::PauseEventView;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct PauseEvent {
    pub id: Uuid,
    pub session_id: Uuid,
    pub pause_time: DateTime<Utc>,
    pub resume_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub paused_by: Option<String>,
    pub resumed_by: Option<String>,
    pub reason: Option<String>,
}

impl PauseEvent {
    pub fn open(
        session_id: Uuid,
        pause_time: DateTime<Utc>,
        paused_by: Option<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            pause_time,
            resume_time: None,
            duration_seconds: None,
            paused_by,
            resumed_by: None,
            reason,
        }
    }

    pub fn to_view(&self) -> PauseEventView {
        PauseEventView {
            id: self.id,
            session_id: self.session_id,
            pause_time: self.pause_time,
            resume_time: self.resume_time,
            duration_seconds: self.duration_seconds,
            paused_by: self.paused_by.clone(),
            resumed_by: self.resumed_by.clone(),
            reason: self.reason.clone(),
        }
    }
}
