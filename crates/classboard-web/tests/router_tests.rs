//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use classboard_api::MemoryBackend;
use classboard_web::{
    create_router,
    state::{AppState, BoardEvent},
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> (AppState, Router) {
    let state = AppState::new(Arc::new(MemoryBackend::demo()));
    let router = create_router(state.clone());
    (state, router)
}

async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_get_board() {
    let (_state, router) = app();

    let (status, body) = send(router, Method::GET, "/api/groups/1/board", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sprints"].as_array().unwrap().len(), 2);
    assert_eq!(body["sprints"][0]["status"], "IN PROGRESS");
    assert_eq!(body["backlogItems"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_unknown_item_is_404_with_message() {
    let (_state, router) = app();

    let (status, body) = send(router, Method::GET, "/api/work-items/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn test_patch_moves_item_and_broadcasts() {
    let (state, router) = app();
    let mut events = state.tx.subscribe();

    let (status, body) = send(
        router,
        Method::PATCH,
        "/api/work-items/6",
        Some(json!({ "sprintId": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sprintId"], 2);
    assert_eq!(events.try_recv().unwrap(), BoardEvent::BoardRefresh);
}

#[tokio::test]
async fn test_patch_status_to_done_is_refused() {
    let (_state, router) = app();

    let (status, body) = send(
        router,
        Method::PATCH,
        "/api/work-items/2",
        Some(json!({ "status": "DONE" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("approval"));
}

#[tokio::test]
async fn test_bulk_create_reports_issues() {
    let (_state, router) = app();
    let items = json!([
        { "type": "Task", "summary": "Slides", "reporterId": 1 },
        { "type": "Subtask", "summary": "Orphan", "reporterId": 1 }
    ]);

    let (status, body) = send(
        router.clone(),
        Method::POST,
        "/api/groups/1/work-items/bulk",
        Some(items),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let issues = body["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["sheet"], "work-items");
    assert_eq!(issues[0]["row"], 2);

    let (_, board) = send(router, Method::GET, "/api/groups/1/board", None).await;
    assert_eq!(board["backlogItems"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_approve_requires_leader() {
    let (_state, router) = app();

    let (status, _) = send(
        router.clone(),
        Method::POST,
        "/api/work-items/2/approve",
        Some(json!({ "rating": 4, "authorId": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        router.clone(),
        Method::POST,
        "/api/work-items/2/approve",
        Some(json!({ "rating": 4, "comment": "Good", "authorId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["kind"], "APPROVE");
    assert_eq!(body["rating"], 4);

    let (_, item) = send(router, Method::GET, "/api/work-items/2", None).await;
    assert_eq!(item["status"], "DONE");
    assert_eq!(item["approved"], true);
}

#[tokio::test]
async fn test_sprint_lifecycle() {
    let (state, router) = app();
    let mut events = state.tx.subscribe();

    let (status, sprint) = send(router.clone(), Method::POST, "/api/groups/1/sprints", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sprint["number"], 3);
    assert_eq!(sprint["status"], "INACTIVE");
    assert!(matches!(
        events.try_recv().unwrap(),
        BoardEvent::SprintUpdated { .. }
    ));

    let (status, completed) = send(
        router.clone(),
        Method::PUT,
        "/api/sprints/1/complete",
        Some(json!({ "destination": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "COMPLETED");
    assert!(completed["workItems"].as_array().unwrap().is_empty());

    let (status, _) = send(router.clone(), Method::DELETE, "/api/sprints/2", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, board) = send(router, Method::GET, "/api/groups/1/board", None).await;
    assert_eq!(board["sprints"].as_array().unwrap().len(), 2);
    assert_eq!(board["backlogItems"].as_array().unwrap().len(), 6);
}
