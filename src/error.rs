use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failures surfaced by the record store and the HTTP layer.
///
/// A wrong clock-in or admin password is not an error: those paths return a
/// negative result and the caller decides what to show.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum AppError {
    /// Required field missing/empty, malformed reference time, or duplicate id.
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    /// A persisted value exists but does not parse into the expected shape.
    #[display(fmt = "corrupt value under key '{}': {}", key, reason)]
    CorruptState { key: String, reason: String },

    #[display(fmt = "storage failure: {}", _0)]
    Storage(String),

    #[display(fmt = "{}", _0)]
    Unauthorized(String),
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::CorruptState { .. } | AppError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::CorruptState { .. } | AppError::Storage(_) => {
                tracing::error!(error = %self, "Storage layer failure");
            }
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}
