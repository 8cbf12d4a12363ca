//! Shared API types: the response envelope and error-to-status mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::data::DataError;
use crate::domain::DomainError;

/// Success envelope: `{success: true, message, data}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Client- and server-error responses, rendered as
/// `{success: false, statusCode, message, details?}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        message: String,
    },
    NotFound {
        message: String,
    },
    Conflict {
        message: String,
    },
    /// 400 with field-level details from body validation
    Validation {
        message: String,
        details: serde_json::Value,
    },
    Internal {
        message: String,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn from_data(e: DataError) -> Self {
        tracing::error!(error = %e, "Data error");
        Self::internal("Database operation failed")
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => Self::not_found(e.to_string()),
            DomainError::CodeExists(_) => Self::conflict(e.to_string()),
            DomainError::Data(e) => Self::from_data(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message, None),
            Self::NotFound { message } => (StatusCode::NOT_FOUND, message, None),
            Self::Conflict { message } => (StatusCode::CONFLICT, message, None),
            Self::Validation { message, details } => {
                (StatusCode::BAD_REQUEST, message, Some(details))
            }
            Self::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message, None),
        };

        let mut body = serde_json::json!({
            "success": false,
            "statusCode": status.as_u16(),
            "message": message,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}
