use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// JSON success body with an explicit status code.
/// The payload is the resource itself; errors go through `ApiError`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self { data, status_code }
    }

    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status_code, Json(self.data)).into_response()
    }
}

/// Body returned by delete endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_tasks: Option<u64>,
}

impl Deleted {
    pub fn ok() -> Self {
        Self { success: true, moved_tasks: None }
    }

    pub fn with_moved(moved_tasks: u64) -> Self {
        Self { success: true, moved_tasks: Some(moved_tasks) }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
