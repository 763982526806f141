//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from ironframe-core, ironframe-risk, and
//! ironframe-cadence to HTTP status codes with a JSON body carrying an error
//! code and message. Internal error details are never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ironframe_cadence::SinkError;
use ironframe_core::{IronframeError, ValidationError};
use ironframe_risk::RiskError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "TENANT_ACCESS_DENIED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed or inputs are out of domain (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Tenant isolation violation (403). Distinct from `NotFound`.
    #[error("tenant isolation violation: active tenant {active} may not access {target}")]
    TenantAccessDenied {
        /// Caller's active tenant, or `none`.
        active: String,
        /// Requested tenant.
        target: String,
    },

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::TenantAccessDenied { .. } => (StatusCode::FORBIDDEN, "TENANT_ACCESS_DENIED"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let details = match &self {
            Self::TenantAccessDenied { target, .. } => {
                Some(serde_json::json!({ "target_tenant": target }))
            }
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<IronframeError> for AppError {
    fn from(err: IronframeError) -> Self {
        match err {
            IronframeError::AccessDenied { active, target } => {
                Self::TenantAccessDenied { active, target }
            }
            IronframeError::Validation(e) => Self::Validation(e.to_string()),
            IronframeError::InvalidInput(msg) => Self::Validation(msg),
            IronframeError::Json(e) => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<RiskError> for AppError {
    fn from(err: RiskError) -> Self {
        match err {
            RiskError::InvalidInput { .. } => Self::Validation(err.to_string()),
            RiskError::ExposureOverflow { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<SinkError> for AppError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::MessageNotFound(id) => Self::NotFound(format!("outbound message {id}")),
            SinkError::Unavailable(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(format!("database error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn validation_status_code() {
        let (status, code) = AppError::Validation("bad field".into()).status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn access_denied_is_forbidden_not_not_found() {
        let err: AppError = IronframeError::AccessDenied {
            active: "medshield".into(),
            target: "vaultbank".into(),
        }
        .into();
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(code, "TENANT_ACCESS_DENIED");
    }

    #[test]
    fn risk_invalid_input_maps_to_422() {
        let err: AppError = RiskError::InvalidInput {
            exposure_cents: -1,
            threshold_cents: 10,
        }
        .into();
        assert_eq!(err.status_and_code().0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn unknown_message_maps_to_404() {
        let err: AppError = SinkError::MessageNotFound(uuid::Uuid::nil()).into();
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let response = AppError::Internal("db password leaked".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(!body.error.message.contains("password"));
    }
}
