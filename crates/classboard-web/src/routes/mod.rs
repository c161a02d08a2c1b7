//! Route handlers.

pub mod groups;
pub mod sprints;
pub mod work_items;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use classboard_api::ApiError;
use tracing::{debug, warn};

/// Backend error rendered as `{ message, issues }` with its status code.
#[derive(Debug)]
pub struct RouteError(pub ApiError);

impl From<ApiError> for RouteError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(status = %status, error = %self.0, "Request failed");
        } else {
            debug!(status = %status, error = %self.0, "Request rejected");
        }
        (status, Json(self.0.to_body())).into_response()
    }
}

pub type RouteResult<T> = Result<T, RouteError>;
