//! File (canvas container) records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;
use crate::collection::{require_changes, Patch};
use crate::error::Result;
use crate::validation::{Issues, MAX_FILE_NAME_LEN};

/// A file owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    /// File identifier
    pub id: Uuid,
    /// Owning user
    pub owner_id: UserId,
    /// Display name
    pub name: String,
    /// Type tag chosen by the client
    pub file_type: String,
    /// Canvas payload, if any has been saved
    pub canvas_data: Option<CanvasData>,
    /// User who last changed the content
    pub last_edited_by: Option<UserId>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last content change (or restore)
    pub updated_at: DateTime<Utc>,
    /// Set while the file sits in the trash
    pub deleted_at: Option<DateTime<Utc>>,
}

impl File {
    /// Build a fresh, active file owned by `owner_id`
    #[must_use]
    pub fn new(owner_id: UserId, input: CreateFile) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: input.name,
            file_type: input.file_type,
            canvas_data: None,
            last_edited_by: Some(owner_id),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Whether the file is outside the trash
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Canvas payload stored on a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasData {
    /// Payload schema version
    #[serde(default = "default_version")]
    pub version: i64,
    /// Placed objects
    #[serde(default)]
    pub objects: Vec<CanvasObject>,
    /// Last viewport
    #[serde(default)]
    pub viewport: Viewport,
}

fn default_version() -> i64 {
    1
}

impl Default for CanvasData {
    fn default() -> Self {
        Self {
            version: default_version(),
            objects: Vec::new(),
            viewport: Viewport::default(),
        }
    }
}

impl CanvasData {
    fn check(&self, issues: &mut Issues) {
        issues.finite("canvas_data.viewport.x", self.viewport.x);
        issues.finite("canvas_data.viewport.y", self.viewport.y);
        issues.positive("canvas_data.viewport.scale", self.viewport.scale);

        for (i, object) in self.objects.iter().enumerate() {
            let field = |name: &str| format!("canvas_data.objects[{i}].{name}");
            if object.id.trim().is_empty() {
                issues.push(field("id"), "id is required");
            }
            issues.finite(&field("x"), object.x);
            issues.finite(&field("y"), object.y);
            issues.positive(&field("width"), object.width);
            issues.positive(&field("height"), object.height);
            if let Some(rotation) = object.rotation {
                issues.finite(&field("rotation"), rotation);
            }
        }
    }
}

/// One object placed on a canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasObject {
    /// Client-side identifier
    pub id: String,
    /// Object kind
    #[serde(rename = "type")]
    pub kind: CanvasObjectKind,
    /// Referenced asset, for asset objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<Uuid>,
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Rotation in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Enclosing group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Stacking order
    pub z_index: i64,
    /// Optional label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Canvas object kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasObjectKind {
    /// Placed asset
    Asset,
    /// Group of objects
    Group,
}

/// Canvas viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Horizontal offset
    #[serde(default)]
    pub x: f64,
    /// Vertical offset
    #[serde(default)]
    pub y: f64,
    /// Zoom factor
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: default_scale(),
        }
    }
}

/// Body of a file creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFileRequest {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Type tag
    #[serde(default)]
    pub file_type: String,
}

/// Validated file creation input
#[derive(Debug, Clone, PartialEq)]
pub struct CreateFile {
    /// Trimmed display name
    pub name: String,
    /// Type tag
    pub file_type: String,
}

impl CreateFileRequest {
    /// Validate the request
    pub fn validate(self) -> Result<CreateFile> {
        let mut issues = Issues::new();
        let name = issues.name("name", &self.name, MAX_FILE_NAME_LEN);
        let file_type = issues.required("file_type", &self.file_type);
        issues.finish(CreateFile { name, file_type })
    }
}

/// Body of a file update request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFileRequest {
    /// New display name
    #[serde(default)]
    pub name: Option<String>,
    /// New canvas payload
    #[serde(default)]
    pub canvas_data: Option<CanvasData>,
}

/// Validated file update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFile {
    /// New display name
    pub name: Option<String>,
    /// New canvas payload
    pub canvas_data: Option<CanvasData>,
}

impl Patch for UpdateFile {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.canvas_data.is_none()
    }
}

impl UpdateFileRequest {
    /// Validate the request
    pub fn validate(self) -> Result<UpdateFile> {
        let mut issues = Issues::new();
        let name = self
            .name
            .map(|name| issues.name("name", &name, MAX_FILE_NAME_LEN));
        if let Some(data) = &self.canvas_data {
            data.check(&mut issues);
        }
        let update = issues.finish(UpdateFile {
            name,
            canvas_data: self.canvas_data,
        })?;
        require_changes(&update)?;
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_create_request_trims_name() {
        let input = CreateFileRequest {
            name: "  Moodboard ".to_string(),
            file_type: "canvas".to_string(),
        }
        .validate()
        .unwrap();
        assert_eq!(input.name, "Moodboard");
    }

    #[test]
    fn test_create_request_requires_fields() {
        let err = CreateFileRequest {
            name: String::new(),
            file_type: " ".to_string(),
        }
        .validate()
        .unwrap_err();
        match err {
            Error::Validation { details, .. } => {
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "file_type"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let err = UpdateFileRequest::default().validate().unwrap_err();
        assert_eq!(err.code(), "validation_failed");
    }

    #[test]
    fn test_unknown_fields_do_not_count_as_changes() {
        let request: UpdateFileRequest = serde_json::from_str(r#"{"color": "red"}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_canvas_data_defaults() {
        let data: CanvasData = serde_json::from_str("{}").unwrap();
        assert_eq!(data, CanvasData::default());
        assert_eq!(data.viewport.scale, 1.0);
    }

    #[test]
    fn test_canvas_object_wire_names() {
        let data: CanvasData = serde_json::from_str(
            r#"{"objects": [{"id": "o1", "type": "asset", "x": 0, "y": 0,
                "width": 10, "height": 10, "zIndex": 2, "groupId": "g"}]}"#,
        )
        .unwrap();
        assert_eq!(data.objects[0].z_index, 2);
        assert_eq!(data.objects[0].group_id.as_deref(), Some("g"));
    }

    #[test]
    fn test_canvas_data_rejects_zero_scale() {
        let request = UpdateFileRequest {
            name: None,
            canvas_data: Some(CanvasData {
                viewport: Viewport {
                    x: 0.0,
                    y: 0.0,
                    scale: 0.0,
                },
                ..CanvasData::default()
            }),
        };
        let err = request.validate().unwrap_err();
        match err {
            Error::Validation { details, .. } => {
                assert_eq!(details[0].field, "canvas_data.viewport.scale");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
