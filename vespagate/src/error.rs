//! Error types for the gateway

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Document not found: [{index}]/[{id}]")]
    DocumentNotFound { index: String, id: String },

    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Backend request failed: {0}")]
    Backend(String),

    #[error("No handler found for [{method}] [{path}]")]
    NoHandler { method: String, path: String },
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::ParseError(e.to_string())
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Backend(e.to_string())
    }
}

/// OpenSearch-style error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
    status: u16,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    root_cause: Vec<RootCause>,
    #[serde(rename = "type")]
    error_type: String,
    reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<String>,
}

#[derive(Debug, Serialize)]
struct RootCause {
    #[serde(rename = "type")]
    error_type: String,
    reason: String,
}

impl GatewayError {
    fn error_type(&self) -> &'static str {
        match self {
            Self::IndexNotFound(_) => "index_not_found_exception",
            Self::DocumentNotFound { .. } => "resource_not_found_exception",
            Self::InvalidRequestBody(_) => "parse_exception",
            Self::ParseError(_) => "parse_exception",
            Self::Validation(_) => "action_request_validation_exception",
            Self::Backend(_) => "search_phase_execution_exception",
            Self::NoHandler { .. } => "invalid_type_name_exception",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::IndexNotFound(_) | Self::DocumentNotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidRequestBody(_) | Self::ParseError(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoHandler { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type().to_string();
        let reason = self.to_string();

        // Unroutable requests get the placeholder index fields and an
        // empty root_cause, matching the envelope real clusters emit.
        let body = if matches!(self, Self::NoHandler { .. }) {
            ErrorResponse {
                error: ErrorDetail {
                    root_cause: vec![],
                    error_type,
                    reason,
                    index_uuid: Some("_na_".to_string()),
                    index: Some("_na_".to_string()),
                },
                status: status.as_u16(),
            }
        } else {
            ErrorResponse {
                error: ErrorDetail {
                    root_cause: vec![RootCause {
                        error_type: error_type.clone(),
                        reason: reason.clone(),
                    }],
                    error_type,
                    reason,
                    index_uuid: None,
                    index: None,
                },
                status: status.as_u16(),
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GatewayError::IndexNotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::ParseError("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::Validation("ids".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::Backend("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::NoHandler {
                method: "PATCH".into(),
                path: "/x".into()
            }
            .status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            GatewayError::IndexNotFound("x".into()).error_type(),
            "index_not_found_exception"
        );
        assert_eq!(
            GatewayError::InvalidRequestBody("x".into()).error_type(),
            "parse_exception"
        );
    }

    #[test]
    fn test_serde_json_error_maps_to_parse() {
        let e = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let ge: GatewayError = e.into();
        assert!(matches!(ge, GatewayError::ParseError(_)));
    }
}
