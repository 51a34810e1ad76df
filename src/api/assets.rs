//! Asset endpoints

use std::sync::Arc;

use atelier_core::model::{Asset, CreateAssetRequest, UpdateAssetRequest};
use atelier_core::CanvasService;
use axum::extract::Extension;
use axum::routing::get;
use axum::Router;
use uuid::Uuid;

use super::response::{
    created, ok, ApiJson, ApiPath, ApiQuery, ApiResult, Deleted, FileScopeQuery,
};
use crate::middleware::auth::RequireUser;

async fn list_assets(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiQuery(query): ApiQuery<FileScopeQuery>,
) -> ApiResult<Vec<Asset>> {
    ok(service.list_assets(user.id, query.file_id).await?)
}

async fn create_asset(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiJson(request): ApiJson<CreateAssetRequest>,
) -> ApiResult<Asset> {
    let input = request.validate()?;
    created(service.create_asset(user.id, input).await?)
}

async fn get_asset(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Asset> {
    ok(service.get_asset(user.id, id).await?)
}

async fn update_asset(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateAssetRequest>,
) -> ApiResult<Asset> {
    let update = request.validate()?;
    ok(service.update_asset(user.id, id, update).await?)
}

async fn delete_asset(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    let asset = service.delete_asset(user.id, id).await?;
    ok(Deleted { id: asset.id })
}

/// Create asset routes
pub fn assets_routes() -> Router {
    Router::new()
        .route("/api/assets", get(list_assets).post(create_asset))
        .route(
            "/api/assets/:id",
            get(get_asset).patch(update_asset).delete(delete_asset),
        )
}
