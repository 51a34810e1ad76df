//! Identity endpoints
//!
//! `POST /api/auth/sync` registers or refreshes the caller in the user
//! directory and only needs a valid token. Everything else requires a
//! synced user.

use std::sync::Arc;

use atelier_core::model::{User, UserProfile};
use atelier_core::{CanvasService, Error};
use axum::body::Bytes;
use axum::extract::Extension;
use axum::routing::{get, post};
use axum::Router;

use super::response::{ok, ApiResult};
use crate::middleware::auth::{RequireIdentity, RequireUser};

/// Sync the caller into the user directory; the body is optional
async fn sync(
    RequireIdentity(identity): RequireIdentity,
    Extension(service): Extension<Arc<CanvasService>>,
    body: Bytes,
) -> ApiResult<User> {
    let profile = if body.iter().all(u8::is_ascii_whitespace) {
        UserProfile::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| Error::validation(format!("Invalid profile body: {e}")))?
    };

    ok(service.sync_user(&identity, profile).await?)
}

/// The synced caller
async fn me(RequireUser(user): RequireUser) -> ApiResult<User> {
    ok(user)
}

/// Create auth routes
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/sync", post(sync))
        .route("/api/auth/me", get(me))
}
