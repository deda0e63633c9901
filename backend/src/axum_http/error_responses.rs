use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crates::domain::value_objects::media_upload::UploadError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upload failed")]
    UploadFailed(#[source] anyhow::Error),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NoInput => AppError::BadRequest("A file is required".to_string()),
            UploadError::UploadFailure(cause) => AppError::UploadFailed(cause),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            // Provider detail stays in the logs.
            AppError::UploadFailed(_) => (
                StatusCode::BAD_GATEWAY,
                "Failed to upload file to media host".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}
