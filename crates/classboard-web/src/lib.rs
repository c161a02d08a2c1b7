//! Classboard Web Server
//!
//! Axum server exposing the board REST API over an in-memory backend,
//! plus a WebSocket that tells clients when to reload.

pub mod routes;
pub mod state;
pub mod websocket;

use axum::{
    routing::{get, post, put},
    Router,
};
use classboard_api::MemoryBackend;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Groups
        .route("/groups/{id}/board", get(routes::groups::get_board))
        .route("/groups/{id}/members", get(routes::groups::list_members))
        .route("/groups/{id}/epics", get(routes::groups::list_epics))
        .route("/groups/{id}/sprint-names", get(routes::groups::list_sprint_names))
        .route("/groups/{id}/sprints", post(routes::sprints::create_sprint))
        .route("/groups/{id}/work-items", post(routes::work_items::create_work_item))
        .route(
            "/groups/{id}/work-items/bulk",
            post(routes::work_items::create_work_items),
        )
        // Work items
        .route(
            "/work-items/{id}",
            get(routes::work_items::get_work_item)
                .patch(routes::work_items::update_work_item)
                .delete(routes::work_items::delete_work_item),
        )
        .route("/work-items/{id}/approve", post(routes::work_items::approve_work_item))
        .route("/work-items/{id}/reject", post(routes::work_items::reject_work_item))
        .route("/work-items/{id}/feedback", get(routes::work_items::list_feedback))
        // Sprints
        .route("/sprints/{id}/start", put(routes::sprints::start_sprint))
        .route("/sprints/{id}/complete", put(routes::sprints::complete_sprint))
        .route(
            "/sprints/{id}",
            axum::routing::delete(routes::sprints::delete_sprint),
        )
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the board API on an already bound listener.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Run the web server.
pub async fn run_server(backend: Arc<MemoryBackend>, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(backend);

    let listener = TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Board server listening on http://127.0.0.1:{}", port);

    serve(listener, state).await
}
