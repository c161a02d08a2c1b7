//! Sprint route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use classboard_api::dto::{CompleteSprintRequest, SprintDto, StartSprintRequest};
use classboard_api::BoardApi;

use super::RouteResult;
use crate::state::{AppState, BoardEvent};

pub async fn create_sprint(
    State(state): State<AppState>,
    Path(group_id): Path<u64>,
) -> RouteResult<(StatusCode, Json<SprintDto>)> {
    let sprint = state.backend.create_sprint(group_id).await?;
    state.broadcast(BoardEvent::SprintUpdated {
        sprint_id: sprint.id,
        status: sprint.status.clone(),
    });
    Ok((StatusCode::CREATED, Json(sprint)))
}

pub async fn start_sprint(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<StartSprintRequest>,
) -> RouteResult<Json<SprintDto>> {
    let sprint = state.backend.start_sprint(id, &req).await?;
    state.broadcast(BoardEvent::SprintUpdated {
        sprint_id: sprint.id,
        status: sprint.status.clone(),
    });
    Ok(Json(sprint))
}

pub async fn complete_sprint(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<CompleteSprintRequest>,
) -> RouteResult<Json<SprintDto>> {
    let sprint = state.backend.complete_sprint(id, &req).await?;
    // Unfinished items moved as well
    state.broadcast(BoardEvent::BoardRefresh);
    Ok(Json(sprint))
}

pub async fn delete_sprint(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> RouteResult<StatusCode> {
    state.backend.delete_sprint(id).await?;
    state.broadcast(BoardEvent::BoardRefresh);
    Ok(StatusCode::NO_CONTENT)
}
