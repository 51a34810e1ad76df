//! Web API module for Atelier
//!
//! Provides REST endpoints for:
//! - Identity sync
//! - Files, their lifecycle and collaborators
//! - Assets and elements within a file

pub mod assets;
pub mod auth;
pub mod elements;
pub mod files;
pub mod health;
pub mod response;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use atelier_core::{CanvasService, IdentityVerifier};
use axum::{Extension, Router};

pub use assets::assets_routes;
pub use auth::auth_routes;
pub use elements::elements_routes;
pub use files::files_routes;
pub use health::health_routes;

/// Create the API router with all endpoints
pub fn api_router() -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(files_routes())
        .merge(assets_routes())
        .merge(elements_routes())
}

/// Full application: health, API and the 404 fallback, with shared state
/// attached as extensions
pub fn app(service: Arc<CanvasService>, verifier: Arc<dyn IdentityVerifier>) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(api_router())
        .fallback(response::not_found)
        .layer(Extension(service))
        .layer(Extension(verifier))
}
