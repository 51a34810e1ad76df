//! Input validation helpers
//!
//! Request types collect every problem into [`Issues`] and convert it into a
//! single [`Error::Validation`] so the caller sees all offending fields at once.

use crate::error::{Error, FieldIssue, Result};

/// Maximum length of a file name
pub const MAX_FILE_NAME_LEN: usize = 100;

/// Maximum length of an asset name
pub const MAX_ASSET_NAME_LEN: usize = 255;

/// Accumulator for field-level problems
#[derive(Debug, Default)]
pub struct Issues {
    items: Vec<FieldIssue>,
}

impl Issues {
    /// Create an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem with a field
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.items.push(FieldIssue::new(field, message));
    }

    /// Whether no problem has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Finish validation, yielding `value` when no problem was recorded
    pub fn finish<T>(self, value: T) -> Result<T> {
        if self.items.is_empty() {
            return Ok(value);
        }
        let message = if self.items.len() == 1 {
            self.items[0].message.clone()
        } else {
            "Validation failed".to_string()
        };
        Err(Error::Validation {
            message,
            details: self.items,
        })
    }

    /// Trim a required name and check its length
    pub fn name(&mut self, field: &str, value: &str, max: usize) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, format!("{field} is required"));
        } else if trimmed.chars().count() > max {
            self.push(field, format!("{field} must be at most {max} characters"));
        }
        trimmed.to_string()
    }

    /// Check that a required string is not blank
    pub fn required(&mut self, field: &str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, format!("{field} is required"));
        }
        trimmed.to_string()
    }

    /// Check that a value parses as an absolute URL
    pub fn url(&mut self, field: &str, value: &str) -> String {
        if url::Url::parse(value.trim()).is_err() {
            self.push(field, format!("{field} must be an absolute URL"));
        }
        value.trim().to_string()
    }

    /// Check that a number is finite
    pub fn finite(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.push(field, format!("{field} must be a finite number"));
        }
    }

    /// Check that a number is finite and strictly positive
    pub fn positive(&mut self, field: &str, value: f64) {
        if !value.is_finite() || value <= 0.0 {
            self.push(field, format!("{field} must be a positive number"));
        }
    }

    /// Check that an integer is not negative
    pub fn non_negative(&mut self, field: &str, value: i64) {
        if value < 0 {
            self.push(field, format!("{field} must be greater than or equal to 0"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        let mut issues = Issues::new();
        let name = issues.name("name", "  Sketch  ", MAX_FILE_NAME_LEN);
        assert_eq!(name, "Sketch");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_blank_and_long_names() {
        let mut issues = Issues::new();
        issues.name("name", "   ", MAX_FILE_NAME_LEN);
        issues.name("title", &"x".repeat(101), MAX_FILE_NAME_LEN);

        let err = issues.finish(()).unwrap_err();
        match err {
            Error::Validation { details, .. } => {
                assert_eq!(details.len(), 2);
                assert_eq!(details[0].field, "name");
                assert_eq!(details[1].field, "title");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_url_check() {
        let mut issues = Issues::new();
        issues.url("storage_url", "https://cdn.example.com/a.png");
        assert!(issues.is_empty());
        issues.url("storage_url", "not a url");
        assert!(!issues.is_empty());
    }

    #[test]
    fn test_single_issue_message_is_promoted() {
        let mut issues = Issues::new();
        issues.non_negative("sort_index", -1);
        let err = issues.finish(()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed: sort_index must be greater than or equal to 0"
        );
    }
}
