use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error surface of the HTTP API. Validation, not-found and storage failures
/// all render as 400 with a `{"description": ...}` body; upload failures are
/// 500 with no body at all.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Storage {
        description: String,
        source: sqlx::Error,
    },
    Upload(anyhow::Error),
}

impl ApiError {
    pub fn bad_request(description: impl Into<String>) -> Self {
        ApiError::BadRequest(description.into())
    }

    pub fn storage(description: impl Into<String>, source: sqlx::Error) -> Self {
        ApiError::Storage {
            description: description.into(),
            source,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(description) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "description": description })),
            )
                .into_response(),
            ApiError::Storage {
                description,
                source,
            } => {
                tracing::error!(error = %source, "storage error: {description}");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "description": description })),
                )
                    .into_response()
            }
            ApiError::Upload(source) => {
                tracing::error!(error = %source, "upload failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
