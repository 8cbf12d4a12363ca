//! Validated request extractors.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::core::constants::MSG_VALIDATION_ERROR;

/// Raw path extractor for id-scoped routes (internal use)
#[derive(Debug, Deserialize)]
struct IdPathRaw {
    id: i64,
}

/// Validated numeric id from the URL path. Rejects zero and negative ids
/// with a 400 rather than querying for rows that cannot exist.
#[derive(Debug, Clone, Copy)]
pub struct IdPath {
    pub id: i64,
}

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<IdPathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        if raw.id < 1 {
            return Err(ValidationRejection::InvalidId);
        }

        Ok(Self { id: raw.id })
    }
}

/// JSON body extractor that also runs `validator::Validate` rules.
///
/// Returns a 400 envelope with field-level details when constraints fail.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;

        value
            .validate()
            .map_err(ValidationRejection::Validation)?;

        Ok(Self(value))
    }
}

/// Validation rejection with an envelope-shaped error response
pub enum ValidationRejection {
    /// Failed to parse path parameters
    Path(PathRejection),
    /// Id is zero or negative
    InvalidId,
    /// Failed to parse the JSON body
    Json(JsonRejection),
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (message, details) = match self {
            Self::Path(rejection) => (rejection.body_text(), None),
            Self::InvalidId => ("Invalid id: must be a positive integer".to_string(), None),
            Self::Json(rejection) => (rejection.body_text(), None),
            Self::Validation(errors) => (
                MSG_VALIDATION_ERROR.to_string(),
                serde_json::to_value(&errors).ok(),
            ),
        };

        let mut body = serde_json::json!({
            "success": false,
            "statusCode": StatusCode::BAD_REQUEST.as_u16(),
            "message": message,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
