//! Element endpoints

use std::sync::Arc;

use atelier_core::model::{CreateElementRequest, Element, UpdateElementRequest};
use atelier_core::CanvasService;
use axum::extract::Extension;
use axum::routing::get;
use axum::Router;
use uuid::Uuid;

use super::response::{
    created, ok, ApiJson, ApiPath, ApiQuery, ApiResult, Deleted, FileScopeQuery,
};
use crate::middleware::auth::RequireUser;

/// Elements of a file in render order
async fn list_elements(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiQuery(query): ApiQuery<FileScopeQuery>,
) -> ApiResult<Vec<Element>> {
    ok(service.list_elements(user.id, query.file_id).await?)
}

async fn create_element(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiJson(request): ApiJson<CreateElementRequest>,
) -> ApiResult<Element> {
    let input = request.validate()?;
    created(service.create_element(user.id, input).await?)
}

async fn get_element(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Element> {
    ok(service.get_element(user.id, id).await?)
}

async fn update_element(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateElementRequest>,
) -> ApiResult<Element> {
    let update = request.validate()?;
    ok(service.update_element(user.id, id, update).await?)
}

async fn delete_element(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    let element = service.delete_element(user.id, id).await?;
    ok(Deleted { id: element.id })
}

/// Create element routes
pub fn elements_routes() -> Router {
    Router::new()
        .route("/api/elements", get(list_elements).post(create_element))
        .route(
            "/api/elements/:id",
            get(get_element).patch(update_element).delete(delete_element),
        )
}
