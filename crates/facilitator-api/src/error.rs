//! Error types for the API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the same shape:
//!
//! ```json
//! { "error": "not_found", "message": "score 0190... not found", "status": 404 }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use facilitator_core::CoreError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The addressed record (or one it references) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed body, malformed id, or a field rule failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Missing or invalid credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A uniqueness rule was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An internal error occurred. The detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Unauthorized(_) => "unauthorized",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal",
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::Unauthorized(msg) => Self::Unauthorized(msg),
            CoreError::Conflict(msg) => Self::Conflict(msg),
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(%detail, "Request failed with internal error");
                String::from("internal server error")
            }
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Unauthorized(msg)
            | Self::Conflict(msg) => msg.clone(),
        };

        let body = serde_json::json!({
            "error": self.kind(),
            "message": message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (CoreError::not_found("score", "x"), StatusCode::NOT_FOUND),
            (CoreError::Validation(String::from("name")), StatusCode::BAD_REQUEST),
            (CoreError::Unauthorized(String::from("token")), StatusCode::UNAUTHORIZED),
            (CoreError::Conflict(String::from("email")), StatusCode::CONFLICT),
            (CoreError::Internal(String::from("db")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn not_found_keeps_the_record_kind() {
        let err = ApiError::from(CoreError::not_found("participant", "abc"));
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "participant abc not found"));
    }
}
