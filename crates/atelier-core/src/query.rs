//! File listing queries
//!
//! A listing is a view (which files) plus a sort (in what order). Views are
//! parsed strictly; sort keys fall back to `last-modified` when unrecognized.
//! The trash view ignores the requested sort and lists the most recently
//! trashed files first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which files a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    /// Owned or shared with the user, active
    All,
    /// Owned, active
    MyFiles,
    /// Shared with the user by someone else, active
    Shared,
    /// Owned, trashed
    Trash,
}

impl View {
    /// Get the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::MyFiles => "my-files",
            Self::Shared => "shared",
            Self::Trash => "trash",
        }
    }
}

impl Default for View {
    fn default() -> Self {
        Self::All
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "my-files" => Ok(Self::MyFiles),
            "shared" => Ok(Self::Shared),
            "trash" => Ok(Self::Trash),
            _ => Err(Error::invalid_field("view", "Invalid view parameter")),
        }
    }
}

/// Requested order of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Most recently updated first
    LastModified,
    /// Name, A to Z
    NameAsc,
    /// Name, Z to A
    NameDesc,
    /// Most recently created first
    Newest,
}

impl SortKey {
    /// Get the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastModified => "last-modified",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::Newest => "newest",
        }
    }

    /// Parse a sort key, falling back to `last-modified`
    #[must_use]
    pub fn parse_lenient(s: Option<&str>) -> Self {
        match s {
            Some("name-asc") => Self::NameAsc,
            Some("name-desc") => Self::NameDesc,
            Some("newest") => Self::Newest,
            _ => Self::LastModified,
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::LastModified
    }
}

/// Concrete ordering a store applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOrder {
    /// `updated_at` descending
    UpdatedDesc,
    /// `name` ascending, case-insensitive
    NameAsc,
    /// `name` descending, case-insensitive
    NameDesc,
    /// `created_at` descending
    CreatedDesc,
    /// `deleted_at` descending
    DeletedDesc,
}

/// A parsed listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileQuery {
    /// Which files
    pub view: View,
    /// Requested order
    pub sort: SortKey,
}

impl FileQuery {
    /// Create a query
    #[must_use]
    pub fn new(view: View, sort: SortKey) -> Self {
        Self { view, sort }
    }

    /// Parse raw query parameters; a missing view means `all`
    pub fn parse(view: Option<&str>, sort: Option<&str>) -> Result<Self> {
        let view = match view {
            Some(v) => v.parse()?,
            None => View::All,
        };
        Ok(Self {
            view,
            sort: SortKey::parse_lenient(sort),
        })
    }

    /// The ordering actually applied
    #[must_use]
    pub fn order(&self) -> FileOrder {
        if self.view == View::Trash {
            return FileOrder::DeletedDesc;
        }
        match self.sort {
            SortKey::LastModified => FileOrder::UpdatedDesc,
            SortKey::NameAsc => FileOrder::NameAsc,
            SortKey::NameDesc => FileOrder::NameDesc,
            SortKey::Newest => FileOrder::CreatedDesc,
        }
    }
}
