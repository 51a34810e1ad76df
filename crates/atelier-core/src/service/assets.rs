//! Asset library

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::core::CanvasService;
use crate::access::Permission;
use crate::collection::{capacity_error, require_changes, BoundedInsert, MAX_ASSETS_PER_FILE};
use crate::error::{Error, Result};
use crate::events::DecisionEvent;
use crate::model::{Asset, CreateAsset, UpdateAsset, UserId};

impl CanvasService {
    /// Assets of a readable file, newest first
    pub async fn list_assets(&self, user_id: UserId, file_id: Uuid) -> Result<Vec<Asset>> {
        self.authorize(user_id, file_id, Permission::Read).await?;
        self.store.list_assets(file_id).await
    }

    /// Register an asset on a writable file below its capacity ceiling
    #[instrument(skip(self, input), fields(file_id = %input.file_id))]
    pub async fn create_asset(&self, user_id: UserId, input: CreateAsset) -> Result<Asset> {
        let file_id = input.file_id;
        self.authorize(user_id, file_id, Permission::Write).await?;

        let asset = Asset::new(input);
        match self
            .store
            .insert_asset(&asset, user_id, MAX_ASSETS_PER_FILE)
            .await?
        {
            BoundedInsert::Inserted => {
                info!(asset_id = %asset.id, "asset created");
                Ok(asset)
            }
            BoundedInsert::ParentUnavailable => Err(Error::not_found("File not found")),
            BoundedInsert::AtCapacity => {
                self.emit(DecisionEvent::CapacityRejected {
                    user_id,
                    file_id,
                    limit: MAX_ASSETS_PER_FILE,
                });
                Err(capacity_error(MAX_ASSETS_PER_FILE))
            }
        }
    }

    /// Load an asset of a readable file
    pub async fn get_asset(&self, user_id: UserId, asset_id: Uuid) -> Result<Asset> {
        self.visible_asset(user_id, asset_id, Permission::Read).await
    }

    /// Update an asset of a writable file
    #[instrument(skip(self, update))]
    pub async fn update_asset(
        &self,
        user_id: UserId,
        asset_id: Uuid,
        update: UpdateAsset,
    ) -> Result<Asset> {
        require_changes(&update)?;
        self.visible_asset(user_id, asset_id, Permission::Write)
            .await?;
        self.store
            .update_asset(asset_id, user_id, &update, Utc::now())
            .await?
            .ok_or_else(|| Error::not_found("Asset not found"))
    }

    /// Delete an asset of a writable file
    #[instrument(skip(self))]
    pub async fn delete_asset(&self, user_id: UserId, asset_id: Uuid) -> Result<Asset> {
        self.visible_asset(user_id, asset_id, Permission::Write)
            .await?;
        self.store
            .delete_asset(asset_id, user_id)
            .await?
            .ok_or_else(|| Error::not_found("Asset not found"))
    }

    async fn visible_asset(
        &self,
        user_id: UserId,
        asset_id: Uuid,
        permission: Permission,
    ) -> Result<Asset> {
        let asset = self
            .store
            .get_asset(asset_id)
            .await?
            .ok_or_else(|| Error::not_found("Asset not found"))?;
        self.permitted(user_id, asset.file_id, permission)
            .await?
            .ok_or_else(|| Error::not_found("Asset not found"))?;
        Ok(asset)
    }
}
