//! HTTP error responses.
//!
//! Every failing endpoint answers with the JSON envelope
//! `{"success": false, "message": "..."}`. Engine errors carry
//! client-safe messages and map onto status codes here; storage
//! faults are logged and answered with a generic 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use hcms_core::HcmsError;

/// An error response: a status code plus a client-facing message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal error".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<HcmsError> for ApiError {
    fn from(err: HcmsError) -> Self {
        match &err {
            HcmsError::Validation(_)
            | HcmsError::InvalidState(_)
            | HcmsError::AlreadyCompleted
            | HcmsError::AlreadyConfirmed
            | HcmsError::AlreadyDispensed
            | HcmsError::InsufficientStock { .. } => ApiError::bad_request(err.to_string()),
            HcmsError::NotFound(_) => ApiError::not_found(err.to_string()),
            HcmsError::Forbidden { .. } | HcmsError::ForbiddenTransition { .. } => {
                ApiError::forbidden(err.to_string())
            }
            HcmsError::Storage(_) => {
                tracing::error!("Storage error: {err}");
                ApiError::internal()
            }
        }
    }
}

impl From<hcms_files::FilesError> for ApiError {
    fn from(err: hcms_files::FilesError) -> Self {
        match &err {
            hcms_files::FilesError::NotFound(_) => ApiError::not_found("File not found"),
            hcms_files::FilesError::InvalidPath(_) | hcms_files::FilesError::InvalidHash(_) => {
                ApiError::bad_request("Invalid file path")
            }
            other => {
                tracing::error!("Attachment store error: {other}");
                ApiError::internal()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcms_core::domain::{Role, VisitStatus};

    #[test]
    fn state_conflicts_map_to_bad_request_with_the_engine_message() {
        let err =
            ApiError::from(HcmsError::InvalidState("Visit is not in registered status".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Visit is not in registered status");
    }

    #[test]
    fn missing_documents_map_to_not_found() {
        let err = ApiError::from(HcmsError::NotFound("Visit"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Visit not found");
    }

    #[test]
    fn authorization_failures_map_to_forbidden() {
        let err = ApiError::from(HcmsError::ForbiddenTransition {
            role: Role::MainDoctor,
            target: VisitStatus::Done,
        });
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.message(), "You are not authorized to update status to done");
    }

    #[test]
    fn storage_faults_hide_their_details() {
        let err = ApiError::from(HcmsError::Storage("disk on fire".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal error");
    }

    #[test]
    fn insufficient_stock_keeps_the_quantities_in_the_message() {
        let err = ApiError::from(HcmsError::InsufficientStock {
            medicine: "Paracetamol".into(),
            available: 3,
            required: 10,
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message(),
            "Insufficient stock for Paracetamol. Available: 3, Required: 10"
        );
    }
}
