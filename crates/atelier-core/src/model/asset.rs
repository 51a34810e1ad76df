//! Asset library records
//!
//! An asset is metadata about uploaded media. Where it appears on the canvas
//! is described by elements, not by the asset itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::collection::{require_changes, Patch};
use crate::error::Result;
use crate::validation::{Issues, MAX_ASSET_NAME_LEN};

/// Library metadata for one uploaded media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset identifier
    pub id: Uuid,
    /// Owning file
    pub file_id: Uuid,
    /// Display name
    pub name: String,
    /// Declared MIME or file type
    pub file_type: String,
    /// Where the binary lives
    pub storage_url: String,
    /// Opaque key in the object store
    pub storage_key: Option<String>,
    /// Size in bytes
    pub file_size: Option<i64>,
    /// Thumbnail reference
    pub thumbnail_url: Option<String>,
    /// Free-form metadata
    pub metadata: Map<String, Value>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Build a new asset record from validated input
    #[must_use]
    pub fn new(input: CreateAsset) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            file_id: input.file_id,
            name: input.name,
            file_type: input.file_type,
            storage_url: input.storage_url,
            storage_key: input.storage_key,
            file_size: input.file_size,
            thumbnail_url: input.thumbnail_url,
            metadata: input.metadata,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of an asset creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssetRequest {
    /// Owning file
    pub file_id: Uuid,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Declared MIME or file type
    #[serde(default)]
    pub file_type: String,
    /// Where the binary lives
    #[serde(default, alias = "url")]
    pub storage_url: String,
    /// Opaque key in the object store
    #[serde(default)]
    pub storage_key: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub file_size: Option<i64>,
    /// Thumbnail reference
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Validated asset creation input
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAsset {
    /// Owning file
    pub file_id: Uuid,
    /// Trimmed display name
    pub name: String,
    /// Declared MIME or file type
    pub file_type: String,
    /// Where the binary lives
    pub storage_url: String,
    /// Opaque key in the object store
    pub storage_key: Option<String>,
    /// Size in bytes
    pub file_size: Option<i64>,
    /// Thumbnail reference
    pub thumbnail_url: Option<String>,
    /// Free-form metadata
    pub metadata: Map<String, Value>,
}

impl CreateAssetRequest {
    /// Validate the request
    pub fn validate(self) -> Result<CreateAsset> {
        let mut issues = Issues::new();
        let name = issues.name("name", &self.name, MAX_ASSET_NAME_LEN);
        let file_type = issues.required("file_type", &self.file_type);
        let storage_url = issues.url("storage_url", &self.storage_url);
        let thumbnail_url = self
            .thumbnail_url
            .map(|url| issues.url("thumbnail_url", &url));
        if let Some(size) = self.file_size {
            issues.non_negative("file_size", size);
        }
        let storage_key = self
            .storage_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        issues.finish(CreateAsset {
            file_id: self.file_id,
            name,
            file_type,
            storage_url,
            storage_key,
            file_size: self.file_size,
            thumbnail_url,
            metadata: self.metadata.unwrap_or_default(),
        })
    }
}

/// Body of an asset update request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAssetRequest {
    /// New display name
    #[serde(default)]
    pub name: Option<String>,
    /// New thumbnail reference
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Replacement metadata
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Validated asset update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateAsset {
    /// New display name
    pub name: Option<String>,
    /// New thumbnail reference
    pub thumbnail_url: Option<String>,
    /// Replacement metadata
    pub metadata: Option<Map<String, Value>>,
}

impl Patch for UpdateAsset {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.thumbnail_url.is_none() && self.metadata.is_none()
    }
}

impl UpdateAssetRequest {
    /// Validate the request
    pub fn validate(self) -> Result<UpdateAsset> {
        let mut issues = Issues::new();
        let name = self
            .name
            .map(|name| issues.name("name", &name, MAX_ASSET_NAME_LEN));
        let thumbnail_url = self
            .thumbnail_url
            .map(|url| issues.url("thumbnail_url", &url));
        let update = issues.finish(UpdateAsset {
            name,
            thumbnail_url,
            metadata: self.metadata,
        })?;
        require_changes(&update)?;
        Ok(update)
    }
}
