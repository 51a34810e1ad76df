//! Collection policy for a file's children
//!
//! - Capacity: a file holds at most [`MAX_ASSETS_PER_FILE`] assets.
//! - Ordering: elements render back to front by `sort_index`, ties broken by
//!   creation time. Indexes are never renumbered; gaps and duplicates are fine.
//! - Patches: an update must name at least one recognized field.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::model::Element;

/// Ceiling on assets per file
pub const MAX_ASSETS_PER_FILE: i64 = 50;

/// Outcome of a capacity-bounded insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundedInsert {
    /// Row written
    Inserted,
    /// Parent missing, trashed, or not owned by the caller
    ParentUnavailable,
    /// Parent already at the ceiling
    AtCapacity,
}

/// Validation error reported when a parent is full
#[must_use]
pub fn capacity_error(limit: i64) -> Error {
    Error::invalid_field(
        "file_id",
        format!("File has reached the maximum of {limit} assets"),
    )
}

/// Render order: `sort_index` ascending, then `created_at` ascending
#[must_use]
pub fn render_order(a: &Element, b: &Element) -> Ordering {
    a.sort_index
        .cmp(&b.sort_index)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

/// Sort elements back to front; equal keys keep their incoming order
pub fn sort_for_render(elements: &mut [Element]) {
    elements.sort_by(render_order);
}

/// A sparse update whose absent fields are left unchanged
pub trait Patch {
    /// Whether no recognized field is present
    fn is_empty(&self) -> bool;
}

/// Reject patches that would change nothing
pub fn require_changes<P: Patch>(patch: &P) -> Result<()> {
    if patch.is_empty() {
        return Err(Error::validation("No fields to update"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CreateElement, ElementProps, RawProps};
    use chrono::Duration;
    use serde_json::json;
    use uuid::Uuid;

    fn element(sort_index: i64, age_secs: i64) -> Element {
        let props = ElementProps::parse(
            crate::model::ElementKind::Rectangle,
            RawProps(json!({"x": 0, "y": 0, "width": 1, "height": 1})),
        )
        .unwrap();
        let mut e = Element::new(CreateElement {
            file_id: Uuid::nil(),
            sort_index,
            props,
        });
        e.created_at -= Duration::seconds(age_secs);
        e
    }

    #[test]
    fn test_capacity_error_names_file() {
        let err = capacity_error(MAX_ASSETS_PER_FILE);
        assert_eq!(err.code(), "validation_failed");
        assert!(err.to_string().contains("maximum of 50 assets"));
        match err {
            Error::Validation { details, .. } => assert_eq!(details[0].field, "file_id"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_render_order_with_gaps_and_ties() {
        let newest_low = element(0, 0);
        let oldest_high = element(10, 30);
        let tie_old = element(5, 20);
        let tie_new = element(5, 10);

        let mut items = vec![
            oldest_high.clone(),
            tie_new.clone(),
            newest_low.clone(),
            tie_old.clone(),
        ];
        sort_for_render(&mut items);

        let ids: Vec<_> = items.iter().map(|e| e.id).collect();
        assert_eq!(
            ids,
            vec![newest_low.id, tie_old.id, tie_new.id, oldest_high.id]
        );
    }

    struct Flags(Option<bool>);

    impl Patch for Flags {
        fn is_empty(&self) -> bool {
            self.0.is_none()
        }
    }

    #[test]
    fn test_require_changes() {
        assert!(require_changes(&Flags(None)).is_err());
        assert!(require_changes(&Flags(Some(false))).is_ok());
    }
}
