//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::pipeline_file::PipelineFileError;
use crate::service::BuildError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::NotFound(msg) => msg,
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                msg
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::NotFound(_) => ApiError::NotFound("Build ID not found".to_string()),
            BuildError::DuplicateId(id) => {
                ApiError::InternalError(format!("Build identifier {} was already issued", id))
            }
            BuildError::Store(err) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<PipelineFileError> for ApiError {
    fn from(err: PipelineFileError) -> Self {
        tracing::error!("{}", err);
        ApiError::InternalError("Failed to load pipeline configuration".to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
