//! Storage contract
//!
//! The service expresses every data-dependent decision as a guarded
//! statement: writes carry the owner id and the lifecycle precondition, and
//! report through `Option`/`bool`/[`BoundedInsert`] whether a row matched.
//! Implementations must evaluate each guard and its write atomically.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::access::FileGrant;
use crate::collection::BoundedInsert;
use crate::error::Result;
use crate::lifecycle::Transition;
use crate::model::{
    Asset, Element, ElementChanges, File, UpdateAsset, UpdateFile, User, UserId, UserSync,
};
use crate::query::FileQuery;

/// Storage backend used by the service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ---------------------------------------------------------------------
    // User directory
    // ---------------------------------------------------------------------

    /// Insert or refresh a user keyed by subject; the id never changes
    async fn upsert_user(&self, sync: &UserSync, at: DateTime<Utc>) -> Result<User>;

    /// Look up a user by external subject
    async fn find_user_by_subject(&self, subject: &str) -> Result<Option<User>>;

    /// Look up a user by email (case-insensitive)
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    // ---------------------------------------------------------------------
    // Files
    // ---------------------------------------------------------------------

    /// Insert a new file
    async fn insert_file(&self, file: &File) -> Result<()>;

    /// Load a file with the user's role on it
    async fn file_grant(&self, file_id: Uuid, user_id: UserId) -> Result<Option<FileGrant>>;

    /// List files for `user_id` according to the query's view and order
    async fn list_files(&self, user_id: UserId, query: FileQuery) -> Result<Vec<File>>;

    /// Apply a content update to an active file owned by `owner_id`
    async fn update_file(
        &self,
        file_id: Uuid,
        owner_id: UserId,
        update: &UpdateFile,
        at: DateTime<Utc>,
    ) -> Result<Option<File>>;

    /// Apply a lifecycle transition to a file owned by `owner_id`
    ///
    /// Returns the file as it is after the transition (or as it was, for a
    /// purge), or `None` when the owner or state guard did not match.
    async fn transition_file(
        &self,
        file_id: Uuid,
        owner_id: UserId,
        transition: Transition,
        at: DateTime<Utc>,
    ) -> Result<Option<File>>;

    // ---------------------------------------------------------------------
    // Collaborators
    // ---------------------------------------------------------------------

    /// Users holding collaborator membership on a file
    async fn list_collaborators(&self, file_id: Uuid) -> Result<Vec<User>>;

    /// Add membership; returns `false` when it already existed
    async fn add_collaborator(
        &self,
        file_id: Uuid,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Remove membership; returns `false` when there was none
    async fn remove_collaborator(&self, file_id: Uuid, user_id: UserId) -> Result<bool>;

    // ---------------------------------------------------------------------
    // Assets
    // ---------------------------------------------------------------------

    /// Insert an asset if its file is active, owned by `owner_id`, and holds
    /// fewer than `limit` assets
    async fn insert_asset(&self, asset: &Asset, owner_id: UserId, limit: i64)
        -> Result<BoundedInsert>;

    /// Load an asset regardless of its file's state
    async fn get_asset(&self, asset_id: Uuid) -> Result<Option<Asset>>;

    /// Assets of a file, newest first
    async fn list_assets(&self, file_id: Uuid) -> Result<Vec<Asset>>;

    /// Update an asset whose file is active and owned by `owner_id`
    async fn update_asset(
        &self,
        asset_id: Uuid,
        owner_id: UserId,
        update: &UpdateAsset,
        at: DateTime<Utc>,
    ) -> Result<Option<Asset>>;

    /// Delete an asset whose file is active and owned by `owner_id`
    async fn delete_asset(&self, asset_id: Uuid, owner_id: UserId) -> Result<Option<Asset>>;

    // ---------------------------------------------------------------------
    // Elements
    // ---------------------------------------------------------------------

    /// Insert an element if its file is active and owned by `owner_id`
    async fn insert_element(&self, element: &Element, owner_id: UserId) -> Result<bool>;

    /// Load an element regardless of its file's state
    async fn get_element(&self, element_id: Uuid) -> Result<Option<Element>>;

    /// Elements of a file in insertion order
    async fn list_elements(&self, file_id: Uuid) -> Result<Vec<Element>>;

    /// Update an element whose file is active and owned by `owner_id`
    async fn update_element(
        &self,
        element_id: Uuid,
        owner_id: UserId,
        changes: &ElementChanges,
        at: DateTime<Utc>,
    ) -> Result<Option<Element>>;

    /// Delete an element whose file is active and owned by `owner_id`
    async fn delete_element(&self, element_id: Uuid, owner_id: UserId)
        -> Result<Option<Element>>;
}
