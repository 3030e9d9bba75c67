use crate::domain::error::JobError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

impl JobError {
    /// HTTP status and machine-readable code for this failure.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            JobError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            JobError::Directory { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "DIRECTORY_ERROR"),
            JobError::Execution { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "EXECUTION_ERROR"),
            JobError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            JobError::EmptyResult { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "EMPTY_RESULT"),
            JobError::TooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "TOO_LARGE"),
            JobError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            JobError::Unexpected { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for JobError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        tracing::debug!(job_id = ?self.job_id(), code, error = %self, "Request failed");

        let mut body = json!({
            "error": self.to_string(),
            "code": code,
        });
        if let Some(job_id) = self.job_id() {
            body["job_id"] = json!(job_id);
        }

        (status, Json(body)).into_response()
    }
}
