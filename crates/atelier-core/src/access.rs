//! Access control
//!
//! A user relates to a file as its owner, as a collaborator, or not at all.
//! Reading requires either role on an active file; writing requires
//! ownership of an active file. Trashed files are invisible to everyone
//! through these checks, owner included.

use serde::{Deserialize, Serialize};

use crate::model::File;

/// How a user relates to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full rights
    Owner,
    /// Read-only membership
    Collaborator,
}

impl Role {
    /// Get the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Collaborator => "collaborator",
        }
    }
}

/// What a caller wants to do with a file or its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// View the file, its assets, elements and collaborators
    Read,
    /// Change the file or its children
    Write,
}

impl Permission {
    /// Get the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }

    /// Whether `role` carries this permission
    #[must_use]
    pub fn granted_to(self, role: Role) -> bool {
        match self {
            Self::Read => true,
            Self::Write => role == Role::Owner,
        }
    }
}

/// A file together with the requesting user's relation to it
#[derive(Debug, Clone, PartialEq)]
pub struct FileGrant {
    /// The file as stored
    pub file: File,
    /// The requester's role, if any
    pub role: Option<Role>,
}

impl FileGrant {
    /// Whether the requester holds `permission` on the file
    #[must_use]
    pub fn permits(&self, permission: Permission) -> bool {
        match permission {
            Permission::Read => can_read(&self.file, self.role),
            Permission::Write => can_write(&self.file, self.role),
        }
    }
}

/// Read access: active file, owner or collaborator
#[must_use]
pub fn can_read(file: &File, role: Option<Role>) -> bool {
    file.is_active() && role.is_some_and(|r| Permission::Read.granted_to(r))
}

/// Write access: active file, owner only
#[must_use]
pub fn can_write(file: &File, role: Option<Role>) -> bool {
    file.is_active() && role.is_some_and(|r| Permission::Write.granted_to(r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CreateFile;
    use chrono::Utc;
    use uuid::Uuid;

    fn file() -> File {
        File::new(
            Uuid::new_v4(),
            CreateFile {
                name: "Board".to_string(),
                file_type: "canvas".to_string(),
            },
        )
    }

    fn trashed() -> File {
        let mut f = file();
        f.deleted_at = Some(Utc::now());
        f
    }

    const ROLES: [Option<Role>; 3] = [Some(Role::Owner), Some(Role::Collaborator), None];

    #[test]
    fn test_owner_reads_and_writes() {
        let f = file();
        assert!(can_read(&f, Some(Role::Owner)));
        assert!(can_write(&f, Some(Role::Owner)));
    }

    #[test]
    fn test_collaborator_reads_only() {
        let f = file();
        assert!(can_read(&f, Some(Role::Collaborator)));
        assert!(!can_write(&f, Some(Role::Collaborator)));
    }

    #[test]
    fn test_stranger_gets_nothing() {
        let f = file();
        assert!(!can_read(&f, None));
        assert!(!can_write(&f, None));
    }

    #[test]
    fn test_trash_hides_from_everyone() {
        let f = trashed();
        for role in ROLES {
            assert!(!can_read(&f, role));
            assert!(!can_write(&f, role));
        }
    }

    #[test]
    fn test_write_implies_read() {
        for f in [file(), trashed()] {
            for role in ROLES {
                if can_write(&f, role) {
                    assert!(can_read(&f, role));
                }
            }
        }
    }

    #[test]
    fn test_grant_permits() {
        let grant = FileGrant {
            file: file(),
            role: Some(Role::Collaborator),
        };
        assert!(grant.permits(Permission::Read));
        assert!(!grant.permits(Permission::Write));
    }
}
