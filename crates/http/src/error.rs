//! Error handling for the HTTP layer

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        details: Vec<serde_json::Value>,
        code: String,
        message: String,
    },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            code: "validation_error".to_string(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unparseable or non-JSON request bodies surface as our own 400 shape.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let timestamp = now.format(&Rfc3339).unwrap_or_else(|_| now.to_string());
        let status = self.status();

        let (error_code, message, details) = match self {
            AppError::Validation {
                details,
                code,
                message,
            } => (code, message, Some(details)),
            AppError::NotFound { message, code } => (code, message, None),
            AppError::BadRequest { message, code } => (code, message, None),
            AppError::Internal(e) => {
                tracing::error!(error_id = %error_id, error = ?e, "internal error");
                ("internal_error".to_string(), e.to_string(), None)
            }
        };

        tracing::error!(
            error_id = %error_id,
            error_code = %error_code,
            status_code = %status.as_u16(),
            "Request error"
        );

        // Storage details stay out of release-build responses.
        let message = if cfg!(not(debug_assertions)) && status == StatusCode::INTERNAL_SERVER_ERROR
        {
            "An internal server error occurred".to_string()
        } else {
            message
        };

        let error_response = json!({
            "error": {
                "code": error_code,
                "message": message,
                "details": details.unwrap_or_default(),
                "trace_id": error_id.to_string(),
                "timestamp": timestamp
            }
        });

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_error() {
        let details = vec![serde_json::json!({"field": "title", "error": "required"})];
        let error = AppError::validation(details.clone(), "Validation failed");

        match error {
            AppError::Validation {
                details: d,
                code,
                message,
            } => {
                assert_eq!(d, details);
                assert_eq!(code, "validation_error");
                assert_eq!(message, "Validation failed");
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_error_response_mapping() {
        let error = AppError::not_found("Book not found");
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_error_mapping() {
        let internal_error = anyhow::anyhow!("Database connection failed");
        let error = AppError::Internal(internal_error);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_validation_response_format() {
        let error = AppError::validation(
            vec![serde_json::json!({"field": "author", "error": "required"})],
            "Book validation failed",
        );
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let error = &body["error"];
        assert_eq!(error["code"], "validation_error");
        assert_eq!(error["message"], "Book validation failed");
        assert_eq!(error["details"][0]["field"], "author");
        assert!(Uuid::parse_str(error["trace_id"].as_str().unwrap()).is_ok());
        let timestamp = error["timestamp"].as_str().unwrap();
        assert!(OffsetDateTime::parse(timestamp, &Rfc3339).is_ok());
    }

    #[tokio::test]
    async fn test_not_found_has_empty_details() {
        let body = body_json(AppError::not_found("Book not found").into_response()).await;
        assert_eq!(body["error"]["code"], "not_found");
        assert_eq!(body["error"]["details"], serde_json::json!([]));
    }
}
