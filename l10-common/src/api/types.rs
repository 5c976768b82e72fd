//! Shared API request/response types
//!
//! Wire shapes of the meeting-session HTTP surface. The service serializes
//! these and the facade deserializes them, so both sides agree on field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Meeting type used when a request does not name one
pub const DEFAULT_MEETING_TYPE: &str = "weekly";

fn default_meeting_type() -> String {
    DEFAULT_MEETING_TYPE.to_string()
}

// ========================================
// Session Types
// ========================================

/// One meeting session as returned by every session endpoint
///
/// `active_duration_seconds` is always computed by the service from the
/// stored timestamps; clients seed their display from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub organization_id: String,
    pub team_id: String,
    pub meeting_type: String,
    #[serde(default)]
    pub facilitator_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub is_active: bool,
    pub is_paused: bool,
    #[serde(default)]
    pub last_pause_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_resume_time: Option<DateTime<Utc>>,
    /// Seconds spent in completed pauses
    pub total_paused_duration: i64,
    #[serde(default)]
    pub current_section: Option<String>,
    #[serde(default)]
    pub current_section_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    pub active_duration_seconds: i64,
    /// Present on the response to `end`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_duration_seconds: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One pause interval of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseEventView {
    pub id: Uuid,
    pub session_id: Uuid,
    pub pause_time: DateTime<Utc>,
    #[serde(default)]
    pub resume_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    pub paused_by: Option<String>,
    #[serde(default)]
    pub resumed_by: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

// ========================================
// Section Types
// ========================================

/// One agenda item from the agenda configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaSection {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
}

impl AgendaSection {
    pub fn new(id: &str, name: &str, duration_minutes: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            duration_minutes,
        }
    }

    /// Planned time for this section in seconds
    pub fn allocated_seconds(&self) -> i64 {
        i64::from(self.duration_minutes) * 60
    }
}

/// Time attributed to one agenda section of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTimingView {
    pub section_id: String,
    pub allocated_seconds: i64,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    /// Seconds across all visits, including the running interval
    pub cumulative_seconds: i64,
    pub overrun_seconds: i64,
    pub visits: i64,
    /// A visit is open (started, not yet ended)
    pub in_progress: bool,
    /// The interval clock is ticking (in progress and session not paused)
    pub running: bool,
}

/// Advisory pacing signal for the whole agenda
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pace {
    Ahead,
    OnTrack,
    Behind,
    Critical,
}

impl Pace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pace::Ahead => "ahead",
            Pace::OnTrack => "on-track",
            Pace::Behind => "behind",
            Pace::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Pace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ========================================
// Requests
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub organization_id: String,
    pub team_id: String,
    #[serde(default = "default_meeting_type")]
    pub meeting_type: String,
    #[serde(default)]
    pub facilitator_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveSessionQuery {
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub meeting_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PauseRequest {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSectionRequest {
    pub section: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveStateRequest {
    pub elapsed_seconds: i64,
}

/// Body of `sections/start` and `sections/end`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRequest {
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<Uuid>,
    #[serde(alias = "sectionId")]
    pub section_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgendaQuery {
    #[serde(default)]
    pub meeting_type: Option<String>,
}

// ========================================
// Responses
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: SessionView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveSessionResponse {
    pub session: Option<SessionView>,
}

/// Response of `end`; `already_concluded` is the typed idempotence signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndSessionResponse {
    pub session: Option<SessionView>,
    pub already_concluded: bool,
}

/// Response of `status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    pub session: SessionView,
    #[serde(rename = "pauseHistory", alias = "pause_history")]
    pub pause_history: Vec<PauseEventView>,
    pub sections: Vec<SectionTimingView>,
    pub current_section_seconds: i64,
    pub pace: Pace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionResponse {
    pub section: SectionTimingView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsResponse {
    pub sections: Vec<SectionTimingView>,
    pub pace: Pace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaResponse {
    pub meeting_type: String,
    pub sections: Vec<AgendaSection>,
}

// ========================================
// Error Response Types
// ========================================

/// Error body returned by every failing endpoint
///
/// ```
/// use l10_common::api::types::ErrorResponse;
///
/// let body: ErrorResponse = serde_json::from_str(
///     r#"{"error":{"code":"INVALID_STATE","message":"Session is already paused"}}"#,
/// ).unwrap();
/// assert_eq!(body.error.code, "INVALID_STATE");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pace_serializes_kebab_case() {
        assert_eq!(serde_json::to_value(Pace::OnTrack).unwrap(), "on-track");
        assert_eq!(serde_json::to_value(Pace::Critical).unwrap(), "critical");
        assert_eq!(Pace::Ahead.to_string(), "ahead");
    }

    #[test]
    fn test_start_request_defaults_meeting_type() {
        let req: StartSessionRequest =
            serde_json::from_str(r#"{"organization_id":"org","team_id":"team"}"#).unwrap();
        assert_eq!(req.meeting_type, "weekly");
        assert!(req.facilitator_id.is_none());
    }

    #[test]
    fn test_section_request_accepts_camel_case() {
        let req: SectionRequest = serde_json::from_str(r#"{"sectionId":"issues"}"#).unwrap();
        assert_eq!(req.section_id, "issues");
        assert!(req.session_id.is_none());
    }

    #[test]
    fn test_agenda_section_allocation() {
        let section = AgendaSection::new("ids", "IDS", 60);
        assert_eq!(section.allocated_seconds(), 3600);
    }
}
