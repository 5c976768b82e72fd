//! Section timing endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use l10_common::api::{SectionRequest, SectionResponse, SectionsResponse};
use uuid::Uuid;

use super::sessions::{load_scoped, parse_session_id};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// The body may repeat the session id; it must agree with the path
fn check_body_session(path_id: Uuid, request: &SectionRequest) -> ApiResult<()> {
    match request.session_id {
        Some(body_id) if body_id != path_id => Err(ApiError::BadRequest(format!(
            "Body session_id {} does not match path session {}",
            body_id, path_id
        ))),
        _ => Ok(()),
    }
}

/// POST /meeting-sessions/:session_id/sections/start
pub async fn start_section(
    State(state): State<AppState>,
    Path((org_id, team_id, session_id)): Path<(String, String, String)>,
    Json(request): Json<SectionRequest>,
) -> ApiResult<Json<SectionResponse>> {
    let session_id = parse_session_id(&session_id)?;
    check_body_session(session_id, &request)?;
    load_scoped(&state, &org_id, &team_id, session_id).await?;

    let timing = state
        .tracker
        .start_section(session_id, &request.section_id)
        .await?;
    Ok(Json(SectionResponse {
        section: timing.to_view(state.lifecycle.now()),
    }))
}

/// POST /meeting-sessions/:session_id/sections/end
pub async fn end_section(
    State(state): State<AppState>,
    Path((org_id, team_id, session_id)): Path<(String, String, String)>,
    Json(request): Json<SectionRequest>,
) -> ApiResult<Json<SectionResponse>> {
    let session_id = parse_session_id(&session_id)?;
    check_body_session(session_id, &request)?;
    load_scoped(&state, &org_id, &team_id, session_id).await?;

    let timing = state
        .tracker
        .end_section(session_id, &request.section_id)
        .await?;
    Ok(Json(SectionResponse {
        section: timing.to_view(state.lifecycle.now()),
    }))
}

/// GET /meeting-sessions/:session_id/sections
pub async fn list_sections(
    State(state): State<AppState>,
    Path((org_id, team_id, session_id)): Path<(String, String, String)>,
) -> ApiResult<Json<SectionsResponse>> {
    let session_id = parse_session_id(&session_id)?;
    load_scoped(&state, &org_id, &team_id, session_id).await?;

    let snapshot = state.tracker.snapshot(session_id).await?;
    Ok(Json(SectionsResponse {
        sections: snapshot
            .sections
            .iter()
            .map(|t| t.to_view(snapshot.as_of))
            .collect(),
        pace: snapshot.pace,
    }))
}

pub fn section_routes() -> Router<AppState> {
    let base = "/organizations/:org_id/teams/:team_id/meeting-sessions/:session_id/sections";
    Router::new()
        .route(base, get(list_sections))
        .route(&format!("{}/start", base), post(start_section))
        .route(&format!("{}/end", base), post(end_section))
}
