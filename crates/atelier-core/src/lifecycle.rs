//! File lifecycle
//!
//! ```text
//!            trash                 purge
//!   Active ────────▶ Trashed ──────────────▶ Purged
//!     ▲   ◀────────     │                      ▲
//!     │     restore     │                      │
//!     └─────────────────┴──────── purge ───────┘
//! ```
//!
//! Every transition is owner-only. The store applies a transition as a
//! single guarded statement, so the precondition check and the state change
//! cannot be interleaved with a concurrent transition on the same file.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::File;

/// Soft-delete state of a stored file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    /// `deleted_at` is null
    Active,
    /// `deleted_at` is set
    Trashed,
}

impl FileState {
    /// Derive the state of a stored file
    #[must_use]
    pub fn of(file: &File) -> Self {
        if file.deleted_at.is_some() {
            Self::Trashed
        } else {
            Self::Active
        }
    }
}

/// State precondition a store must enforce atomically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateGuard {
    /// Only active files match
    Active,
    /// Only trashed files match
    Trashed,
    /// Any stored file matches
    Any,
}

/// Owner-initiated state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Active → Trashed
    Trash,
    /// Trashed → Active
    Restore,
    /// Any → Purged (irreversible)
    Purge,
}

impl Transition {
    /// Get the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trash => "trash",
            Self::Restore => "restore",
            Self::Purge => "purge",
        }
    }

    /// Precondition on the current state
    #[must_use]
    pub fn guard(self) -> StateGuard {
        match self {
            Self::Trash => StateGuard::Active,
            Self::Restore => StateGuard::Trashed,
            Self::Purge => StateGuard::Any,
        }
    }

    /// Resulting state, `None` once the row is gone
    #[must_use]
    pub fn target(self) -> Option<FileState> {
        match self {
            Self::Trash => Some(FileState::Trashed),
            Self::Restore => Some(FileState::Active),
            Self::Purge => None,
        }
    }

    /// Message reported when the guarded statement matched nothing
    #[must_use]
    pub fn not_found_message(self) -> &'static str {
        match self {
            Self::Trash => "File not found or already deleted",
            Self::Restore => "File not found in trash",
            Self::Purge => "File not found",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CreateFile;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_guards() {
        assert_eq!(Transition::Trash.guard(), StateGuard::Active);
        assert_eq!(Transition::Restore.guard(), StateGuard::Trashed);
        assert_eq!(Transition::Purge.guard(), StateGuard::Any);
    }

    #[test]
    fn test_trash_and_restore_are_inverse() {
        assert_eq!(Transition::Trash.target(), Some(FileState::Trashed));
        assert_eq!(Transition::Restore.target(), Some(FileState::Active));
        assert_eq!(Transition::Purge.target(), None);
    }

    #[test]
    fn test_state_of_file() {
        let mut file = File::new(
            Uuid::new_v4(),
            CreateFile {
                name: "Board".to_string(),
                file_type: "canvas".to_string(),
            },
        );
        assert_eq!(FileState::of(&file), FileState::Active);
        file.deleted_at = Some(Utc::now());
        assert_eq!(FileState::of(&file), FileState::Trashed);
    }
}
