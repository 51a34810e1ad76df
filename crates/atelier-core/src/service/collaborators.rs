//! Collaborator membership

use chrono::Utc;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::core::CanvasService;
use crate::access::Permission;
use crate::error::{Error, Result};
use crate::model::{User, UserId};

impl CanvasService {
    /// Users with collaborator access to a readable file
    pub async fn list_collaborators(&self, user_id: UserId, file_id: Uuid) -> Result<Vec<User>> {
        self.authorize(user_id, file_id, Permission::Read).await?;
        self.store.list_collaborators(file_id).await
    }

    /// Grant read access to the user registered under `email`
    ///
    /// Adding an existing collaborator again succeeds without change.
    #[instrument(skip(self, email))]
    pub async fn add_collaborator(
        &self,
        user_id: UserId,
        file_id: Uuid,
        email: &str,
    ) -> Result<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::invalid_field("email", "Email is required"));
        }

        let file = self.authorize(user_id, file_id, Permission::Write).await?;
        let target = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| Error::not_found("User not found"))?;

        if target.id == file.owner_id {
            return Err(Error::invalid_field(
                "email",
                "The owner cannot be added as a collaborator",
            ));
        }

        let added = self
            .store
            .add_collaborator(file_id, target.id, Utc::now())
            .await?;
        debug!(collaborator = %target.id, added, "collaborator granted");
        Ok(target)
    }

    /// Revoke a collaborator's access
    #[instrument(skip(self))]
    pub async fn remove_collaborator(
        &self,
        user_id: UserId,
        file_id: Uuid,
        collaborator_id: UserId,
    ) -> Result<()> {
        self.authorize(user_id, file_id, Permission::Write).await?;
        if !self.store.remove_collaborator(file_id, collaborator_id).await? {
            return Err(Error::not_found("Collaborator not found"));
        }
        Ok(())
    }
}
