//! Meeting session endpoints
//!
//! All routes live under `/organizations/:org_id/teams/:team_id/meeting-sessions`.
//! A session addressed under an organization or team it does not belong to
//! is rejected with 403.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use l10_common::api::{
    ActiveSessionQuery, ActiveSessionResponse, EndSessionResponse, PauseRequest, ResumeRequest,
    SaveStateRequest, SessionResponse, SessionStatusResponse, StartSessionRequest,
    UpdateSectionRequest, DEFAULT_MEETING_TYPE,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::lifecycle::EndOutcome;
use crate::models::MeetingSession;
use crate::AppState;

/// Parse the `:session_id` path segment
pub(crate) fn parse_session_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid session id: {}", raw)))
}

/// Load a session and verify it lives under the addressed organization/team
pub(crate) async fn load_scoped(
    state: &AppState,
    org_id: &str,
    team_id: &str,
    session_id: Uuid,
) -> ApiResult<MeetingSession> {
    let session = state.lifecycle.get(session_id).await?;
    ensure_scope(&session, org_id, team_id)?;
    Ok(session)
}

pub(crate) fn ensure_scope(session: &MeetingSession, org_id: &str, team_id: &str) -> ApiResult<()> {
    if session.belongs_to(org_id, team_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "Meeting session {} does not belong to team {}",
            session.id, team_id
        )))
    }
}

fn session_response(state: &AppState, session: &MeetingSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        session: session.to_view(state.lifecycle.now()),
    })
}

/// POST /meeting-sessions/start
pub async fn start_session(
    State(state): State<AppState>,
    Path((org_id, team_id)): Path<(String, String)>,
    Json(request): Json<StartSessionRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    if request.organization_id != org_id || request.team_id != team_id {
        return Err(ApiError::Forbidden(
            "Request body organization/team does not match the path".to_string(),
        ));
    }

    let session = state
        .lifecycle
        .start(
            &org_id,
            &team_id,
            Some(&request.meeting_type),
            request.facilitator_id.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, session_response(&state, &session)))
}

/// GET /meeting-sessions/active?team_id&meeting_type
pub async fn get_active_session(
    State(state): State<AppState>,
    Path((org_id, team_id)): Path<(String, String)>,
    Query(query): Query<ActiveSessionQuery>,
) -> ApiResult<Json<ActiveSessionResponse>> {
    if let Some(query_team) = query.team_id.as_deref() {
        if query_team != team_id {
            return Err(ApiError::Forbidden(
                "team_id query parameter does not match the path".to_string(),
            ));
        }
    }
    let meeting_type = query.meeting_type.as_deref().unwrap_or(DEFAULT_MEETING_TYPE);

    let session = state
        .lifecycle
        .get_active(&org_id, &team_id, meeting_type)
        .await?;
    debug!(
        "Active {} session for team {}: {:?}",
        meeting_type,
        team_id,
        session.as_ref().map(|s| s.id)
    );

    Ok(Json(ActiveSessionResponse {
        session: session.map(|s| s.to_view(state.lifecycle.now())),
    }))
}

/// POST /meeting-sessions/:session_id/pause
pub async fn pause_session(
    State(state): State<AppState>,
    Path((org_id, team_id, session_id)): Path<(String, String, String)>,
    body: Option<Json<PauseRequest>>,
) -> ApiResult<Json<SessionResponse>> {
    let session_id = parse_session_id(&session_id)?;
    load_scoped(&state, &org_id, &team_id, session_id).await?;
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let session = state
        .lifecycle
        .pause(session_id, request.reason.as_deref(), request.user_id.as_deref())
        .await?;
    Ok(session_response(&state, &session))
}

/// POST /meeting-sessions/:session_id/resume
pub async fn resume_session(
    State(state): State<AppState>,
    Path((org_id, team_id, session_id)): Path<(String, String, String)>,
    body: Option<Json<ResumeRequest>>,
) -> ApiResult<Json<SessionResponse>> {
    let session_id = parse_session_id(&session_id)?;
    load_scoped(&state, &org_id, &team_id, session_id).await?;
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let session = state
        .lifecycle
        .resume(session_id, request.user_id.as_deref())
        .await?;
    Ok(session_response(&state, &session))
}

/// GET /meeting-sessions/:session_id/status
pub async fn session_status(
    State(state): State<AppState>,
    Path((org_id, team_id, session_id)): Path<(String, String, String)>,
) -> ApiResult<Json<SessionStatusResponse>> {
    let session_id = parse_session_id(&session_id)?;
    let status = state.lifecycle.status(session_id).await?;
    ensure_scope(&status.session, &org_id, &team_id)?;
    Ok(Json(status.to_response()))
}

/// PATCH /meeting-sessions/:session_id/section
pub async fn update_section(
    State(state): State<AppState>,
    Path((org_id, team_id, session_id)): Path<(String, String, String)>,
    Json(request): Json<UpdateSectionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let session_id = parse_session_id(&session_id)?;
    load_scoped(&state, &org_id, &team_id, session_id).await?;

    let session = state
        .lifecycle
        .update_section(session_id, &request.section)
        .await?;
    Ok(session_response(&state, &session))
}

/// POST /meeting-sessions/:session_id/save-state
pub async fn save_timer_state(
    State(state): State<AppState>,
    Path((org_id, team_id, session_id)): Path<(String, String, String)>,
    Json(request): Json<SaveStateRequest>,
) -> ApiResult<StatusCode> {
    let session_id = parse_session_id(&session_id)?;
    load_scoped(&state, &org_id, &team_id, session_id).await?;

    state
        .lifecycle
        .save_timer_state(session_id, request.elapsed_seconds)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /meeting-sessions/:session_id/end
///
/// Ending a missing or already ended session succeeds with
/// `already_concluded: true`.
pub async fn end_session(
    State(state): State<AppState>,
    Path((org_id, team_id, session_id)): Path<(String, String, String)>,
) -> ApiResult<Json<EndSessionResponse>> {
    let session_id = parse_session_id(&session_id)?;
    match state.lifecycle.get(session_id).await {
        Ok(session) => ensure_scope(&session, &org_id, &team_id)?,
        Err(l10_common::Error::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let response = match state.lifecycle.end(session_id).await? {
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

/// Build meeting session routes
pub fn session_routes() -> Router<AppState> {
    let base = "/organizations/:org_id/teams/:team_id/meeting-sessions";
    Router::new()
        .route(&format!("{}/start", base), post(start_session))
        .route(&format!("{}/active", base), get(get_active_session))
        .route(&format!("{}/:session_id/pause", base), post(pause_session))
        .route(&format!("{}/:session_id/resume", base), post(resume_session))
        .route(&format!("{}/:session_id/status", base), get(session_status))
        .route(&format!("{}/:session_id/section", base), patch(update_section))
        .route(&format!("{}/:session_id/save-state", base), post(save_timer_state))
        .route(&format!("{}/:session_id/end", base), post(end_session))
}
