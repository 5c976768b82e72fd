//! Agenda endpoint

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use l10_common::api::{AgendaQuery, AgendaResponse, DEFAULT_MEETING_TYPE};

use crate::AppState;

/// GET /organizations/:org_id/teams/:team_id/agenda?meeting_type
pub async fn get_agenda(
    State(state): State<AppState>,
    Path((_org_id, _team_id)): Path<(String, String)>,
    Query(query): Query<AgendaQuery>,
) -> Json<AgendaResponse> {
    let meeting_type = query
        .meeting_type
        .unwrap_or_else(|| DEFAULT_MEETING_TYPE.to_string());
    let sections = state
        .tracker
        .agenda()
        .for_meeting_type(&meeting_type)
        .sections()
        .to_vec();

    Json(AgendaResponse {
        meeting_type,
        sections,
    })
}

pub fn agenda_routes() -> Router<AppState> {
    Router::new().route("/organizations/:org_id/teams/:team_id/agenda", get(get_agenda))
}
