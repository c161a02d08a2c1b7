//! Group-scoped read handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use classboard_api::dto::{BoardDto, EpicDto, PersonDto, SprintNameDto};
use classboard_api::BoardApi;

use super::RouteResult;
use crate::state::AppState;

pub async fn get_board(
    State(state): State<AppState>,
    Path(group_id): Path<u64>,
) -> RouteResult<Json<BoardDto>> {
    Ok(Json(state.backend.fetch_board(group_id).await?))
}

pub async fn list_members(
    State(state): State<AppState>,
    Path(group_id): Path<u64>,
) -> RouteResult<Json<Vec<PersonDto>>> {
    Ok(Json(state.backend.list_members(group_id).await?))
}

pub async fn list_epics(
    State(state): State<AppState>,
    Path(group_id): Path<u64>,
) -> RouteResult<Json<Vec<EpicDto>>> {
    Ok(Json(state.backend.list_epics(group_id).await?))
}

pub async fn list_sprint_names(
    State(state): State<AppState>,
    Path(group_id): Path<u64>,
) -> RouteResult<Json<Vec<SprintNameDto>>> {
    Ok(Json(state.backend.list_sprint_names(group_id).await?))
}
