//! Identity sync

use chrono::Utc;
use tracing::instrument;

use super::core::CanvasService;
use crate::error::{Error, Result};
use crate::events::DecisionEvent;
use crate::identity::VerifiedIdentity;
use crate::model::{User, UserProfile, UserSync};

impl CanvasService {
    /// Create or refresh the user record for a verified identity
    #[instrument(skip(self, identity, profile), fields(subject = %identity.subject))]
    pub async fn sync_user(
        &self,
        identity: &VerifiedIdentity,
        profile: UserProfile,
    ) -> Result<User> {
        let sync = UserSync::new(identity, profile);
        let user = self.store.upsert_user(&sync, Utc::now()).await?;
        self.emit(DecisionEvent::UserSynced {
            user_id: user.id,
            subject: user.subject.clone(),
        });
        Ok(user)
    }

    /// Resolve the internal user behind a verified identity
    ///
    /// An identity that was never synced has no session.
    pub async fn resolve_user(&self, identity: &VerifiedIdentity) -> Result<User> {
        self.store
            .find_user_by_subject(&identity.subject)
            .await?
            .ok_or_else(|| Error::unauthenticated("User not found. Please sync first"))
    }
}
