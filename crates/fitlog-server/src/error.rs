use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fitlog_shared::validate::ValidationError;
use fitlog_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(&'static str),

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    #[error("{field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Duplicate {0}")]
    Duplicate(&'static str),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound("record"),
            StoreError::Duplicate(what) => ApiError::Duplicate(what),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation {
            field: e.field,
            reason: e.reason,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": format!("{what} not found") }),
            ),
            ApiError::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                serde_json::json!({ "error": self.to_string() }),
            ),
            // Field-level detail so clients can attach the message to the
            // offending input.
            ApiError::Validation { field, reason } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "errors": { (*field): reason } }),
            ),
            ApiError::Duplicate(what) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "errors": { (*what): "already exists" } }),
            ),
            ApiError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": self.to_string() }),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_client_errors() {
        assert!(matches!(
            ApiError::from(StoreError::NotFound),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::Duplicate("like")),
            ApiError::Duplicate("like")
        ));
    }

    #[test]
    fn validation_keeps_the_field() {
        let err = ApiError::from(ValidationError::new("duration", "out of range"));
        match err {
            ApiError::Validation { field, .. } => assert_eq!(field, "duration"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
