//! Authentication extractors for Axum
//!
//! `RequireIdentity` verifies the bearer credential. `RequireUser` also
//! resolves it to a synced directory user. Both read their dependencies
//! from request extensions.

use atelier_core::identity::bearer_token;
use atelier_core::model::User;
use atelier_core::{CanvasService, Error, IdentityVerifier, VerifiedIdentity};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

/// JSON error response for auth failures
#[derive(Debug, Serialize)]
struct AuthErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl AuthErrorResponse {
    fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Auth rejection type
#[derive(Debug)]
pub struct AuthRejection {
    status: StatusCode,
    body: AuthErrorResponse,
}

impl AuthRejection {
    fn unauthenticated(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: AuthErrorResponse::new(message, "unauthenticated"),
        }
    }

    fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "authentication failed internally");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: AuthErrorResponse::new("Internal server error", "internal_error"),
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<Error> for AuthRejection {
    fn from(err: Error) -> Self {
        match err {
            Error::Unauthenticated(message) => Self::unauthenticated(message),
            other => Self::internal(other),
        }
    }
}

// ============================================================================
// RequireIdentity Extractor
// ============================================================================

/// Axum extractor that requires a valid `Authorization: Bearer <token>` header
pub struct RequireIdentity(pub VerifiedIdentity);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let verifier = parts
            .extensions
            .get::<Arc<dyn IdentityVerifier>>()
            .cloned()
            .ok_or_else(|| AuthRejection::internal("IdentityVerifier not configured"))?;

        let token = extract_token(parts)?;
        let identity = verifier.verify(&token).await?;

        Ok(RequireIdentity(identity))
    }
}

// ============================================================================
// RequireUser Extractor
// ============================================================================

/// Axum extractor that requires a verified identity already synced to the directory
pub struct RequireUser(pub User);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let RequireIdentity(identity) = RequireIdentity::from_request_parts(parts, state).await?;

        let service = parts
            .extensions
            .get::<Arc<CanvasService>>()
            .cloned()
            .ok_or_else(|| AuthRejection::internal("CanvasService not configured"))?;

        let user = service.resolve_user(&identity).await?;
        Ok(RequireUser(user))
    }
}

/// Extract the bearer token from the Authorization header
fn extract_token(parts: &Parts) -> std::result::Result<String, AuthRejection> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string)
        .ok_or_else(|| {
            AuthRejection::unauthenticated(
                "Authentication required. Provide Authorization: Bearer <token>.",
            )
        })
}
