//! Service core structure
//!
//! Contains the `CanvasService` struct, its builder methods and the
//! authorization helpers shared by every operation.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::access::Permission;
use crate::error::{Error, Result};
use crate::events::{DecisionEvent, EventSink, TracingSink};
use crate::lifecycle::FileState;
use crate::model::{File, UserId};
use crate::store::Store;

/// Entry point for all canvas operations
#[derive(Clone)]
pub struct CanvasService {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) events: Arc<dyn EventSink>,
}

impl CanvasService {
    /// Create a service that reports decisions through `tracing`
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            events: Arc::new(TracingSink),
        }
    }

    /// Replace the decision event sink
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// The underlying store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Whether `user_id` may read the file and its children
    pub async fn can_read(&self, user_id: UserId, file_id: Uuid) -> Result<bool> {
        Ok(self
            .store
            .file_grant(file_id, user_id)
            .await?
            .is_some_and(|grant| grant.permits(Permission::Read)))
    }

    /// Whether `user_id` may mutate the file and its children
    pub async fn can_write(&self, user_id: UserId, file_id: Uuid) -> Result<bool> {
        Ok(self
            .store
            .file_grant(file_id, user_id)
            .await?
            .is_some_and(|grant| grant.permits(Permission::Write)))
    }

    pub(crate) fn emit(&self, event: DecisionEvent) {
        self.events.emit(&event);
    }

    /// Load the file if `user_id` holds `permission`, `None` otherwise
    ///
    /// A denial of an existing file is reported as an `AccessDenied` event.
    pub(crate) async fn permitted(
        &self,
        user_id: UserId,
        file_id: Uuid,
        permission: Permission,
    ) -> Result<Option<File>> {
        match self.store.file_grant(file_id, user_id).await? {
            Some(grant) if grant.permits(permission) => Ok(Some(grant.file)),
            Some(grant) => {
                self.emit(DecisionEvent::AccessDenied {
                    user_id,
                    file_id,
                    permission,
                    role: grant.role,
                    state: FileState::of(&grant.file),
                });
                Ok(None)
            }
            None => {
                debug!(%file_id, "file does not exist");
                Ok(None)
            }
        }
    }

    /// Load the file if `user_id` holds `permission`, `NotFound` otherwise
    pub(crate) async fn authorize(
        &self,
        user_id: UserId,
        file_id: Uuid,
        permission: Permission,
    ) -> Result<File> {
        self.permitted(user_id, file_id, permission)
            .await?
            .ok_or_else(|| Error::not_found("File not found"))
    }
}
