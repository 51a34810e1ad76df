//! Decision events
//!
//! The service reports every policy decision worth an operator's attention
//! through an [`EventSink`]. The default sink writes structured `tracing`
//! events; tests use [`RecordingSink`] to assert on decisions.

use std::sync::Mutex;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{Permission, Role};
use crate::lifecycle::{FileState, Transition};
use crate::model::UserId;

/// A policy decision taken by the service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionEvent {
    /// A request was refused and reported as not found
    AccessDenied {
        /// Requesting user
        user_id: UserId,
        /// Target file
        file_id: Uuid,
        /// Permission that was missing
        permission: Permission,
        /// Caller's relation to the file, if any
        role: Option<Role>,
        /// State the file was in
        state: FileState,
    },
    /// A lifecycle transition was applied
    Transitioned {
        /// Acting owner
        user_id: UserId,
        /// Target file
        file_id: Uuid,
        /// Applied transition
        transition: Transition,
        /// Resulting state, `None` once purged
        state: Option<FileState>,
    },
    /// A lifecycle transition matched no row
    TransitionRejected {
        /// Requesting user
        user_id: UserId,
        /// Target file
        file_id: Uuid,
        /// Attempted transition
        transition: Transition,
    },
    /// A child insert hit the capacity ceiling
    CapacityRejected {
        /// Requesting user
        user_id: UserId,
        /// Full parent file
        file_id: Uuid,
        /// Ceiling in force
        limit: i64,
    },
    /// A user record was created or refreshed from an identity
    UserSynced {
        /// Internal user id
        user_id: UserId,
        /// External subject id
        subject: String,
    },
}

impl DecisionEvent {
    /// Get the event name
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AccessDenied { .. } => "access_denied",
            Self::Transitioned { .. } => "transitioned",
            Self::TransitionRejected { .. } => "transition_rejected",
            Self::CapacityRejected { .. } => "capacity_rejected",
            Self::UserSynced { .. } => "user_synced",
        }
    }
}

/// Destination for decision events
pub trait EventSink: Send + Sync {
    /// Record one event
    fn emit(&self, event: &DecisionEvent);
}

/// Sink that writes events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &DecisionEvent) {
        match event {
            DecisionEvent::AccessDenied {
                user_id,
                file_id,
                permission,
                role,
                state,
            } => warn!(
                target: "atelier::decision",
                event = event.kind(),
                %user_id,
                %file_id,
                permission = permission.as_str(),
                role = role.map_or("none", |r| r.as_str()),
                ?state,
                "access denied"
            ),
            DecisionEvent::Transitioned {
                user_id,
                file_id,
                transition,
                state,
            } => info!(
                target: "atelier::decision",
                event = event.kind(),
                %user_id,
                %file_id,
                transition = transition.as_str(),
                ?state,
                "lifecycle transition applied"
            ),
            DecisionEvent::TransitionRejected {
                user_id,
                file_id,
                transition,
            } => warn!(
                target: "atelier::decision",
                event = event.kind(),
                %user_id,
                %file_id,
                transition = transition.as_str(),
                "lifecycle transition rejected"
            ),
            DecisionEvent::CapacityRejected {
                user_id,
                file_id,
                limit,
            } => warn!(
                target: "atelier::decision",
                event = event.kind(),
                %user_id,
                %file_id,
                limit,
                "capacity ceiling reached"
            ),
            DecisionEvent::UserSynced { user_id, subject } => info!(
                target: "atelier::decision",
                event = event.kind(),
                %user_id,
                subject = subject.as_str(),
                "user synced"
            ),
        }
    }
}

/// Sink that keeps events in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DecisionEvent>>,
}

impl RecordingSink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events
    #[must_use]
    pub fn events(&self) -> Vec<DecisionEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Names of recorded events, in order
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(DecisionEvent::kind).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &DecisionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = DecisionEvent::CapacityRejected {
            user_id: Uuid::nil(),
            file_id: Uuid::nil(),
            limit: 50,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"capacity_rejected\""));
        assert!(json.contains("\"limit\":50"));
    }

    #[test]
    fn test_access_denied_names_role_and_state() {
        let event = DecisionEvent::AccessDenied {
            user_id: Uuid::nil(),
            file_id: Uuid::nil(),
            permission: Permission::Read,
            role: None,
            state: FileState::Trashed,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["role"], serde_json::Value::Null);
        assert_eq!(json["state"], "trashed");
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.emit(&DecisionEvent::UserSynced {
            user_id: Uuid::nil(),
            subject: "s".to_string(),
        });
        sink.emit(&DecisionEvent::AccessDenied {
            user_id: Uuid::nil(),
            file_id: Uuid::nil(),
            permission: Permission::Write,
            role: Some(Role::Collaborator),
            state: FileState::Active,
        });
        assert_eq!(sink.kinds(), vec!["user_synced", "access_denied"]);
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_subscriber() {
        TracingSink.emit(&DecisionEvent::Transitioned {
            user_id: Uuid::nil(),
            file_id: Uuid::nil(),
            transition: Transition::Trash,
            state: Transition::Trash.target(),
        });
    }
}
