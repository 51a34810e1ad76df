//! Response envelope and error translation
//!
//! Every endpoint answers with `{"success", "data"?, "error"?, "code"?,
//! "details"?}`. [`ApiError`] is the single place where core errors become
//! HTTP statuses.

use atelier_core::{Error, FieldIssue};
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldIssue>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            details: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>, code: &'static str) -> ApiResponse<T> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
            code: Some(code),
            details: Vec::new(),
        }
    }
}

/// Handler result: status plus enveloped payload, or an [`ApiError`]
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 with `data`
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 with `data`
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(Error::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(Error::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            Error::Unauthenticated(message) => (
                StatusCode::UNAUTHORIZED,
                ApiResponse::<()>::error(message, "unauthenticated"),
            ),
            Error::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ApiResponse::error(message, "not_found"),
            ),
            Error::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                ApiResponse {
                    details,
                    ..ApiResponse::error(message, "validation_failed")
                },
            ),
            other => {
                error!(code = other.code(), error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::error("Internal server error", "internal_error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// JSON body extractor whose rejections use the API envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections use the API envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query extractor whose rejections use the API envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Payload of delete-style endpoints
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
}

/// `?fileId=` scoping for asset and element listings
#[derive(Debug, Deserialize)]
pub struct FileScopeQuery {
    #[serde(rename = "fileId", alias = "file_id")]
    pub file_id: Uuid,
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError(Error::not_found("Route not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: Error) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(Error::unauthenticated("x")), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(Error::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Error::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Error::database("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(Error::internal("x")), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_success_envelope_omits_error_fields() {
        let body = serde_json::to_value(ApiResponse::success(7)).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "data": 7}));
    }

    #[test]
    fn test_error_envelope() {
        let body = serde_json::to_value(ApiResponse::<()>::error("nope", "not_found")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "nope", "code": "not_found"})
        );
    }
}
