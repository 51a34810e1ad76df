//! User directory records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::VerifiedIdentity;

/// Internal user identifier, the join key for ownership and membership
pub type UserId = Uuid;

/// A user known to the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Internal identifier
    pub id: UserId,
    /// Stable subject identifier issued by the identity provider
    pub subject: String,
    /// Email reported by the identity provider
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Avatar reference
    pub avatar_url: Option<String>,
    /// When the user was first synced
    pub created_at: DateTime<Utc>,
    /// When the user was last synced
    pub updated_at: DateTime<Utc>,
}

/// Optional profile fields sent along with a sync
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    /// Display name
    #[serde(default, alias = "displayName")]
    pub display_name: Option<String>,
    /// Avatar reference
    #[serde(default, alias = "photoURL", alias = "avatarUrl")]
    pub avatar_url: Option<String>,
}

/// Directory upsert input, keyed by `subject`
#[derive(Debug, Clone, PartialEq)]
pub struct UserSync {
    /// Stable subject identifier
    pub subject: String,
    /// Email
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Avatar reference
    pub avatar_url: Option<String>,
}

impl UserSync {
    /// Combine a verified identity with client-supplied profile fields
    #[must_use]
    pub fn new(identity: &VerifiedIdentity, profile: UserProfile) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            subject: identity.subject.clone(),
            email: identity.email.clone(),
            display_name: clean(profile.display_name),
            avatar_url: clean(profile.avatar_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_accepts_client_aliases() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"displayName": "Ada", "photoURL": "https://a/b.png"}"#)
                .unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Ada"));
        assert_eq!(profile.avatar_url.as_deref(), Some("https://a/b.png"));
    }

    #[test]
    fn test_sync_drops_blank_profile_fields() {
        let identity = VerifiedIdentity {
            subject: "sub-1".to_string(),
            email: "ada@example.com".to_string(),
        };
        let sync = UserSync::new(
            &identity,
            UserProfile {
                display_name: Some("   ".to_string()),
                avatar_url: None,
            },
        );
        assert_eq!(sync.subject, "sub-1");
        assert!(sync.display_name.is_none());
    }
}
