//! File operations

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::core::CanvasService;
use crate::access::Permission;
use crate::collection::require_changes;
use crate::error::{Error, Result};
use crate::events::DecisionEvent;
use crate::lifecycle::Transition;
use crate::model::{CreateFile, File, UpdateFile, UserId};
use crate::query::FileQuery;

impl CanvasService {
    /// List the files a user sees under `query`
    pub async fn list_files(&self, user_id: UserId, query: FileQuery) -> Result<Vec<File>> {
        self.store.list_files(user_id, query).await
    }

    /// Create a file owned by `user_id`
    #[instrument(skip(self, input))]
    pub async fn create_file(&self, user_id: UserId, input: CreateFile) -> Result<File> {
        let file = File::new(user_id, input);
        self.store.insert_file(&file).await?;
        info!(file_id = %file.id, "file created");
        Ok(file)
    }

    /// Load a readable file
    pub async fn get_file(&self, user_id: UserId, file_id: Uuid) -> Result<File> {
        self.authorize(user_id, file_id, Permission::Read).await
    }

    /// Rename a file or replace its canvas payload
    #[instrument(skip(self, update))]
    pub async fn update_file(
        &self,
        user_id: UserId,
        file_id: Uuid,
        update: UpdateFile,
    ) -> Result<File> {
        require_changes(&update)?;
        self.authorize(user_id, file_id, Permission::Write).await?;
        self.store
            .update_file(file_id, user_id, &update, Utc::now())
            .await?
            .ok_or_else(|| Error::not_found("File not found"))
    }

    /// Move an active file to the trash
    pub async fn trash_file(&self, user_id: UserId, file_id: Uuid) -> Result<File> {
        self.transition(user_id, file_id, Transition::Trash).await
    }

    /// Bring a trashed file back
    pub async fn restore_file(&self, user_id: UserId, file_id: Uuid) -> Result<File> {
        self.transition(user_id, file_id, Transition::Restore).await
    }

    /// Delete a file and all of its children for good
    ///
    /// Returns the file as it was before deletion.
    pub async fn purge_file(&self, user_id: UserId, file_id: Uuid) -> Result<File> {
        self.transition(user_id, file_id, Transition::Purge).await
    }

    #[instrument(skip(self))]
    async fn transition(
        &self,
        user_id: UserId,
        file_id: Uuid,
        transition: Transition,
    ) -> Result<File> {
        let applied = self
            .store
            .transition_file(file_id, user_id, transition, Utc::now())
            .await?;

        match applied {
            Some(file) => {
                self.emit(DecisionEvent::Transitioned {
                    user_id,
                    file_id,
                    transition,
                    state: transition.target(),
                });
                Ok(file)
            }
            None => {
                self.emit(DecisionEvent::TransitionRejected {
                    user_id,
                    file_id,
                    transition,
                });
                Err(Error::not_found(transition.not_found_message()))
            }
        }
    }
}
