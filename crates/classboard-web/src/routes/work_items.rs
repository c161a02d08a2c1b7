//! Work item route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use classboard_api::dto::{
    ApproveRequest, FeedbackDto, NewWorkItem, RejectRequest, WorkItemDto, WorkItemPatch,
};
use classboard_api::BoardApi;

use super::RouteResult;
use crate::state::{AppState, BoardEvent};

pub async fn get_work_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> RouteResult<Json<WorkItemDto>> {
    Ok(Json(state.backend.get_work_item(id).await?))
}

pub async fn create_work_item(
    State(state): State<AppState>,
    Path(group_id): Path<u64>,
    Json(req): Json<NewWorkItem>,
) -> RouteResult<(StatusCode, Json<WorkItemDto>)> {
    let item = state.backend.create_work_item(group_id, &req).await?;
    state.broadcast(BoardEvent::BoardRefresh);
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn create_work_items(
    State(state): State<AppState>,
    Path(group_id): Path<u64>,
    Json(req): Json<Vec<NewWorkItem>>,
) -> RouteResult<(StatusCode, Json<Vec<WorkItemDto>>)> {
    let items = state.backend.create_work_items(group_id, &req).await?;
    state.broadcast(BoardEvent::BoardRefresh);
    Ok((StatusCode::CREATED, Json(items)))
}

pub async fn update_work_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<WorkItemPatch>,
) -> RouteResult<Json<WorkItemDto>> {
    let item = state.backend.update_work_item(id, &patch).await?;

    if patch.status.is_some() {
        state.broadcast(BoardEvent::WorkItemUpdated {
            work_item_id: item.id,
            status: item.status.clone(),
        });
    } else {
        state.broadcast(BoardEvent::BoardRefresh);
    }

    Ok(Json(item))
}

pub async fn delete_work_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> RouteResult<StatusCode> {
    state.backend.delete_work_item(id).await?;
    state.broadcast(BoardEvent::BoardRefresh);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn approve_work_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ApproveRequest>,
) -> RouteResult<(StatusCode, Json<FeedbackDto>)> {
    let feedback = state.backend.approve_work_item(id, &req).await?;
    state.broadcast(BoardEvent::WorkItemUpdated {
        work_item_id: id,
        status: classboard_api::dto::status::DONE.to_string(),
    });
    Ok((StatusCode::CREATED, Json(feedback)))
}

pub async fn reject_work_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<RejectRequest>,
) -> RouteResult<(StatusCode, Json<FeedbackDto>)> {
    let feedback = state.backend.reject_work_item(id, &req).await?;
    state.broadcast(BoardEvent::WorkItemUpdated {
        work_item_id: id,
        status: classboard_api::dto::status::TO_DO.to_string(),
    });
    Ok((StatusCode::CREATED, Json(feedback)))
}

pub async fn list_feedback(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> RouteResult<Json<Vec<FeedbackDto>>> {
    Ok(Json(state.backend.list_feedback(id).await?))
}
