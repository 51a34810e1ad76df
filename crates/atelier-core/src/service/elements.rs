//! Canvas elements

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::core::CanvasService;
use crate::access::Permission;
use crate::collection::{require_changes, sort_for_render};
use crate::error::{Error, Result};
use crate::model::{CreateElement, Element, ElementChanges, ElementProps, UpdateElement, UserId};

impl CanvasService {
    /// Elements of a readable file in render order
    pub async fn list_elements(&self, user_id: UserId, file_id: Uuid) -> Result<Vec<Element>> {
        self.authorize(user_id, file_id, Permission::Read).await?;
        let mut elements = self.store.list_elements(file_id).await?;
        sort_for_render(&mut elements);
        Ok(elements)
    }

    /// Add an element to a writable file
    #[instrument(skip(self, input), fields(file_id = %input.file_id))]
    pub async fn create_element(&self, user_id: UserId, input: CreateElement) -> Result<Element> {
        self.authorize(user_id, input.file_id, Permission::Write)
            .await?;
        self.check_placement(input.file_id, &input.props).await?;

        let element = Element::new(input);
        if !self.store.insert_element(&element, user_id).await? {
            return Err(Error::not_found("File not found"));
        }
        info!(element_id = %element.id, kind = %element.kind(), "element created");
        Ok(element)
    }

    /// Load an element of a readable file
    pub async fn get_element(&self, user_id: UserId, element_id: Uuid) -> Result<Element> {
        self.visible_element(user_id, element_id, Permission::Read)
            .await
    }

    /// Reorder an element or replace its props
    ///
    /// New props are checked against the element's existing type, which
    /// never changes.
    #[instrument(skip(self, update))]
    pub async fn update_element(
        &self,
        user_id: UserId,
        element_id: Uuid,
        update: UpdateElement,
    ) -> Result<Element> {
        require_changes(&update)?;
        let element = self
            .visible_element(user_id, element_id, Permission::Write)
            .await?;

        let props = match update.props {
            Some(raw) => {
                let props = ElementProps::parse(element.kind(), raw)?;
                self.check_placement(element.file_id, &props).await?;
                Some(props)
            }
            None => None,
        };
        let changes = ElementChanges {
            sort_index: update.sort_index,
            props,
        };

        self.store
            .update_element(element_id, user_id, &changes, Utc::now())
            .await?
            .ok_or_else(|| Error::not_found("Element not found"))
    }

    /// Remove an element from a writable file
    #[instrument(skip(self))]
    pub async fn delete_element(&self, user_id: UserId, element_id: Uuid) -> Result<Element> {
        self.visible_element(user_id, element_id, Permission::Write)
            .await?;
        self.store
            .delete_element(element_id, user_id)
            .await?
            .ok_or_else(|| Error::not_found("Element not found"))
    }

    async fn visible_element(
        &self,
        user_id: UserId,
        element_id: Uuid,
        permission: Permission,
    ) -> Result<Element> {
        let element = self
            .store
            .get_element(element_id)
            .await?
            .ok_or_else(|| Error::not_found("Element not found"))?;
        self.permitted(user_id, element.file_id, permission)
            .await?
            .ok_or_else(|| Error::not_found("Element not found"))?;
        Ok(element)
    }

    /// Asset placements must point at an asset of the same file
    async fn check_placement(&self, file_id: Uuid, props: &ElementProps) -> Result<()> {
        let Some(asset_id) = props.asset_id() else {
            return Ok(());
        };
        match self.store.get_asset(asset_id).await? {
            Some(asset) if asset.file_id == file_id => Ok(()),
            _ => Err(Error::invalid_field(
                "props.asset_id",
                "Asset not found in this file",
            )),
        }
    }
}
