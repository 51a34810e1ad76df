//! Canvas elements
//!
//! An element's `type` selects the schema of its `props`. The wire shape is
//! `{"type": "...", "props": {...}}`; props are parsed into [`ElementProps`]
//! before they reach the service, so every stored element is well formed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::collection::{require_changes, Patch};
use crate::error::Result;
use crate::validation::Issues;

/// Element discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Rectangle shape
    Rectangle,
    /// Polyline
    Line,
    /// Text block
    Text,
    /// Placement of a library asset
    Asset,
}

impl ElementKind {
    /// Get the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Line => "line",
            Self::Text => "text",
            Self::Asset => "asset",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rectangle" => Ok(Self::Rectangle),
            "line" => Ok(Self::Line),
            "text" => Ok(Self::Text),
            "asset" => Ok(Self::Asset),
            _ => Err(format!("unknown element type: {s}")),
        }
    }
}

/// Rectangle props
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RectangleProps {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Fill colour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Stroke colour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Stroke width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Rotation in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Corner radius
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
}

/// Line props
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineProps {
    /// Flattened `[x0, y0, x1, y1, ...]` coordinates
    pub points: Vec<f64>,
    /// Stroke colour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Stroke width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

/// Text props
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextProps {
    /// Left edge
    pub x: f64,
    /// Baseline
    pub y: f64,
    /// Content
    pub text: String,
    /// Font size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Font family
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Fill colour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Wrapping width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

/// Asset placement props
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetPlacement {
    /// Placed asset
    pub asset_id: Uuid,
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Rotation in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

/// Typed element props
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "props", rename_all = "snake_case")]
pub enum ElementProps {
    /// Rectangle shape
    Rectangle(RectangleProps),
    /// Polyline
    Line(LineProps),
    /// Text block
    Text(TextProps),
    /// Asset placement
    Asset(AssetPlacement),
}

impl ElementProps {
    /// Parse untyped props against the schema selected by `kind`
    pub fn parse(kind: ElementKind, raw: RawProps) -> Result<Self> {
        let mut issues = Issues::new();
        let props = Self::parse_into(kind, raw, &mut issues);
        let props = issues.finish(props)?;
        // parse_into only yields None after recording an issue
        props.ok_or_else(|| crate::error::Error::invalid_field("props", "invalid props"))
    }

    fn parse_into(kind: ElementKind, raw: RawProps, issues: &mut Issues) -> Option<Self> {
        if !raw.0.is_object() {
            issues.push("props", "props must be an object");
            return None;
        }
        let parsed = match kind {
            ElementKind::Rectangle => serde_json::from_value(raw.0).map(Self::Rectangle),
            ElementKind::Line => serde_json::from_value(raw.0).map(Self::Line),
            ElementKind::Text => serde_json::from_value(raw.0).map(Self::Text),
            ElementKind::Asset => serde_json::from_value(raw.0).map(Self::Asset),
        };
        match parsed {
            Ok(props) => {
                props.check(issues);
                Some(props)
            }
            Err(e) => {
                issues.push("props", format!("invalid {kind} props: {e}"));
                None
            }
        }
    }

    fn check(&self, issues: &mut Issues) {
        match self {
            Self::Rectangle(p) => {
                let bounds = [("x", p.x), ("y", p.y), ("width", p.width), ("height", p.height)];
                for (field, value) in bounds {
                    issues.finite(&format!("props.{field}"), value);
                }
            }
            Self::Line(p) => {
                if p.points.len() < 4 || p.points.len() % 2 != 0 {
                    issues.push("props.points", "points must hold at least two x/y pairs");
                }
                if p.points.iter().any(|v| !v.is_finite()) {
                    issues.push("props.points", "points must be finite numbers");
                }
            }
            Self::Text(p) => {
                issues.finite("props.x", p.x);
                issues.finite("props.y", p.y);
                if let Some(size) = p.font_size {
                    issues.positive("props.font_size", size);
                }
            }
            Self::Asset(p) => {
                let bounds = [("x", p.x), ("y", p.y), ("width", p.width), ("height", p.height)];
                for (field, value) in bounds {
                    issues.finite(&format!("props.{field}"), value);
                }
            }
        }
    }

    /// The discriminator of these props
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Rectangle(_) => ElementKind::Rectangle,
            Self::Line(_) => ElementKind::Line,
            Self::Text(_) => ElementKind::Text,
            Self::Asset(_) => ElementKind::Asset,
        }
    }

    /// Referenced asset, for asset placements
    #[must_use]
    pub fn asset_id(&self) -> Option<Uuid> {
        match self {
            Self::Asset(p) => Some(p.asset_id),
            _ => None,
        }
    }

    /// The props object alone, without the discriminator
    pub fn to_value(&self) -> Result<Value> {
        let value = match self {
            Self::Rectangle(p) => serde_json::to_value(p)?,
            Self::Line(p) => serde_json::to_value(p)?,
            Self::Text(p) => serde_json::to_value(p)?,
            Self::Asset(p) => serde_json::to_value(p)?,
        };
        Ok(value)
    }
}

/// Props as received, not yet checked against a schema
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawProps(pub Value);

/// A positioned item on a file's canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    /// Element identifier
    pub id: Uuid,
    /// Owning file
    pub file_id: Uuid,
    /// Type and props
    #[serde(flatten)]
    pub props: ElementProps,
    /// Back-to-front stacking key
    pub sort_index: i64,
    /// Denormalized asset reference of asset placements
    pub asset_id: Option<Uuid>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl Element {
    /// Build a new element from validated input
    #[must_use]
    pub fn new(input: CreateElement) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            file_id: input.file_id,
            asset_id: input.props.asset_id(),
            props: input.props,
            sort_index: input.sort_index,
            created_at: now,
            updated_at: now,
        }
    }

    /// The element's type
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.props.kind()
    }
}

/// Body of an element creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateElementRequest {
    /// Owning file
    pub file_id: Uuid,
    /// Element type
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Stacking key
    pub sort_index: i64,
    /// Type-specific props
    #[serde(default = "empty_props")]
    pub props: RawProps,
}

fn empty_props() -> RawProps {
    RawProps(Value::Object(serde_json::Map::new()))
}

/// Validated element creation input
#[derive(Debug, Clone, PartialEq)]
pub struct CreateElement {
    /// Owning file
    pub file_id: Uuid,
    /// Stacking key
    pub sort_index: i64,
    /// Typed props
    pub props: ElementProps,
}

impl CreateElementRequest {
    /// Validate the request
    pub fn validate(self) -> Result<CreateElement> {
        let mut issues = Issues::new();
        issues.non_negative("sort_index", self.sort_index);
        let props = ElementProps::parse_into(self.kind, self.props, &mut issues);
        let props = issues.finish(props)?;
        let props =
            props.ok_or_else(|| crate::error::Error::invalid_field("props", "invalid props"))?;
        Ok(CreateElement {
            file_id: self.file_id,
            sort_index: self.sort_index,
            props,
        })
    }
}

/// Body of an element update request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateElementRequest {
    /// New stacking key
    #[serde(default)]
    pub sort_index: Option<i64>,
    /// Replacement props, checked against the element's existing type
    #[serde(default)]
    pub props: Option<RawProps>,
}

/// Validated element update; absent fields are left unchanged
///
/// Props stay untyped here because their schema depends on the stored
/// element's type; the service parses them once it has loaded the element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateElement {
    /// New stacking key
    pub sort_index: Option<i64>,
    /// Replacement props
    pub props: Option<RawProps>,
}

impl Patch for UpdateElement {
    fn is_empty(&self) -> bool {
        self.sort_index.is_none() && self.props.is_none()
    }
}

impl UpdateElementRequest {
    /// Validate the request
    pub fn validate(self) -> Result<UpdateElement> {
        let mut issues = Issues::new();
        if let Some(index) = self.sort_index {
            issues.non_negative("sort_index", index);
        }
        let update = issues.finish(UpdateElement {
            sort_index: self.sort_index,
            props: self.props,
        })?;
        require_changes(&update)?;
        Ok(update)
    }
}

/// Changes applied to a stored element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementChanges {
    /// New stacking key
    pub sort_index: Option<i64>,
    /// Replacement typed props
    pub props: Option<ElementProps>,
}
