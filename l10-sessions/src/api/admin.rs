//! Maintenance endpoints for operators
//!
//! Routes under `/admin`: stuck-session report, forced end, a manual run of
//! the stale sweep and a session activity summary. Not scoped to a team.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use l10_common::api::{EndSessionResponse, SessionView};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::sessions::parse_session_id;
use crate::cleanup::{self, MeetingHealth};
use crate::error::ApiResult;
use crate::lifecycle::EndOutcome;
use crate::AppState;

const DEFAULT_HEALTH_WINDOW_HOURS: u64 = 24;

#[derive(Debug, Default, Deserialize)]
pub struct HoursQuery {
    #[serde(default)]
    pub hours: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForceEndRequest {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StuckSessionView {
    pub session: SessionView,
    pub hours_active: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StuckSessionsResponse {
    pub threshold_hours: u64,
    pub sessions: Vec<StuckSessionView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub cleaned: usize,
    pub stale_after_hours: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeetingHealthResponse {
    pub active_count: i64,
    pub organizations_with_meetings: i64,
    pub window_hours: u64,
    pub meetings_in_window: usize,
    pub completed_meetings: usize,
    pub avg_duration_minutes: i64,
}

impl From<MeetingHealth> for MeetingHealthResponse {
    fn from(health: MeetingHealth) -> Self {
        Self {
            active_count: health.active_count,
            organizations_with_meetings: health.organizations_with_meetings,
            window_hours: health.window_hours,
            meetings_in_window: health.meetings_in_window,
            completed_meetings: health.completed_meetings,
            avg_duration_minutes: health.avg_duration_minutes,
        }
    }
}

/// GET /admin/meeting-sessions/stuck?hours=
pub async fn stuck_sessions(
    State(state): State<AppState>,
    Query(query): Query<HoursQuery>,
) -> ApiResult<Json<StuckSessionsResponse>> {
    let threshold_hours = query.hours.unwrap_or(state.cleanup.stuck_after_hours);
    let stuck = cleanup::list_stuck_sessions(&state.lifecycle, &state.db, threshold_hours).await?;
    let now = state.lifecycle.now();

    Ok(Json(StuckSessionsResponse {
        threshold_hours,
        sessions: stuck
            .iter()
            .map(|s| StuckSessionView {
                session: s.session.to_view(now),
                hours_active: s.hours_active,
            })
            .collect(),
    }))
}

/// POST /admin/meeting-sessions/:session_id/force-end
pub async fn force_end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Option<Json<ForceEndRequest>>,
) -> ApiResult<Json<EndSessionResponse>> {
    let session_id = parse_session_id(&session_id)?;
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let outcome = cleanup::force_end(
        &state.lifecycle,
        session_id,
        request.reason.as_deref(),
        request.user_id.as_deref(),
    )
    .await?;

    let response = match outcome {
        EndOutcome::Concluded {
            session,
            final_duration_seconds,
        } => {
            let mut view = session.to_view(state.lifecycle.now());
            view.final_duration_seconds = Some(final_duration_seconds);
            EndSessionResponse {
                session: Some(view),
                already_concluded: false,
            }
        }
        EndOutcome::AlreadyConcluded => EndSessionResponse {
            session: None,
            already_concluded: true,
        },
    };
    Ok(Json(response))
}

/// POST /admin/meeting-sessions/cleanup
pub async fn run_cleanup(State(state): State<AppState>) -> ApiResult<Json<CleanupResponse>> {
    let cleaned = cleanup::end_stale_sessions(&state.lifecycle, &state.db, &state.cleanup).await?;
    info!("Manual cleanup ended {} stale session(s)", cleaned);

    Ok(Json(CleanupResponse {
        cleaned,
        stale_after_hours: state.cleanup.stale_after_hours,
    }))
}

/// GET /admin/meeting-health?hours=
pub async fn meeting_health(
    State(state): State<AppState>,
    Query(query): Query<HoursQuery>,
) -> ApiResult<Json<MeetingHealthResponse>> {
    let window = query.hours.unwrap_or(DEFAULT_HEALTH_WINDOW_HOURS);
    let health = cleanup::meeting_health(&state.lifecycle, &state.db, window).await?;
    Ok(Json(health.into()))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/meeting-sessions/stuck", get(stuck_sessions))
        .route("/admin/meeting-sessions/cleanup", post(run_cleanup))
        .route(
            "/admin/meeting-sessions/:session_id/force-end",
            post(force_end_session),
        )
        .route("/admin/meeting-health", get(meeting_health))
}
