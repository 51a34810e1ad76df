//! File endpoints: listing, CRUD, lifecycle and collaborators

use std::sync::Arc;

use atelier_core::model::{CreateFileRequest, File, UpdateFileRequest, User};
use atelier_core::{CanvasService, FileQuery};
use axum::extract::Extension;
use axum::routing::{delete, get, post};
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use super::response::{created, ok, ApiJson, ApiPath, ApiQuery, ApiResult, Deleted};
use crate::middleware::auth::RequireUser;

/// Query parameters for listing files
#[derive(Debug, Default, Deserialize)]
pub struct ListFilesQuery {
    /// `all`, `my-files`, `shared` or `trash`
    pub view: Option<String>,
    /// `last-modified`, `name-asc`, `name-desc` or `newest`
    pub sort: Option<String>,
}

/// Body for adding a collaborator
#[derive(Debug, Deserialize)]
pub struct AddCollaboratorRequest {
    #[serde(default)]
    pub email: String,
}

async fn list_files(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiQuery(query): ApiQuery<ListFilesQuery>,
) -> ApiResult<Vec<File>> {
    let query = FileQuery::parse(query.view.as_deref(), query.sort.as_deref())?;
    ok(service.list_files(user.id, query).await?)
}

async fn create_file(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiJson(request): ApiJson<CreateFileRequest>,
) -> ApiResult<File> {
    let input = request.validate()?;
    created(service.create_file(user.id, input).await?)
}

async fn get_file(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<File> {
    ok(service.get_file(user.id, id).await?)
}

async fn update_file(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateFileRequest>,
) -> ApiResult<File> {
    let update = request.validate()?;
    ok(service.update_file(user.id, id, update).await?)
}

/// Move a file to the trash
async fn trash_file(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<File> {
    ok(service.trash_file(user.id, id).await?)
}

async fn restore_file(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<File> {
    ok(service.restore_file(user.id, id).await?)
}

/// Permanently delete a file, active or trashed, and everything in it
async fn purge_file(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    let file = service.purge_file(user.id, id).await?;
    ok(Deleted { id: file.id })
}

async fn list_collaborators(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Vec<User>> {
    ok(service.list_collaborators(user.id, id).await?)
}

async fn add_collaborator(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AddCollaboratorRequest>,
) -> ApiResult<User> {
    created(service.add_collaborator(user.id, id, &request.email).await?)
}

async fn remove_collaborator(
    RequireUser(user): RequireUser,
    Extension(service): Extension<Arc<CanvasService>>,
    ApiPath((id, collaborator_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Deleted> {
    service
        .remove_collaborator(user.id, id, collaborator_id)
        .await?;
    ok(Deleted {
        id: collaborator_id,
    })
}

/// Create file routes
pub fn files_routes() -> Router {
    Router::new()
        .route("/api/files", get(list_files).post(create_file))
        .route(
            "/api/files/:id",
            get(get_file).patch(update_file).delete(trash_file),
        )
        .route("/api/files/:id/restore", post(restore_file))
        .route("/api/files/:id/permanent", delete(purge_file))
        .route(
            "/api/files/:id/collaborators",
            get(list_collaborators).post(add_collaborator),
        )
        .route(
            "/api/files/:id/collaborators/:user_id",
            delete(remove_collaborator),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_fields_are_optional() {
        let query: ListFilesQuery = serde_json::from_str("{}").unwrap();
        assert!(query.view.is_none());
        assert!(query.sort.is_none());
    }
}
