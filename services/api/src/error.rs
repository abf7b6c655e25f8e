use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use deskpulse_common::error::DeskpulseError;

use crate::jira::client::JiraClientError;

pub struct ApiError(pub DeskpulseError);

impl From<DeskpulseError> for ApiError {
    fn from(err: DeskpulseError) -> Self {
        Self(err)
    }
}

impl From<JiraClientError> for ApiError {
    fn from(err: JiraClientError) -> Self {
        match err {
            JiraClientError::HttpError { status, body } => Self(DeskpulseError::Upstream {
                status: status.as_u16(),
                detail: body,
            }),
            other => Self(DeskpulseError::Internal(other.to_string())),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self.0 {
            DeskpulseError::Upstream { status, detail } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                detail,
            ),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };

        tracing::error!(%status, %detail, "issue fetch failed");

        let body = serde_json::json!({ "error": "failed to fetch issues", "details": detail });
        (status, Json(body)).into_response()
    }
}
