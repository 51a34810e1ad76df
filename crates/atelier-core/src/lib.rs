//! Atelier Core - access control and resource lifecycle
//!
//! This crate provides the domain layer of the Atelier canvas backend:
//! - Domain model (files, assets, elements, users) with boundary validation
//! - Access control over owner and collaborator roles
//! - File lifecycle (active, trashed, purged)
//! - Collection policy (asset capacity, element ordering, patches)
//! - File listing queries
//! - Identity verification seam and a JWT implementation
//! - `Store` contract and the `CanvasService` façade

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod access;
pub mod collection;
pub mod error;
pub mod events;
pub mod identity;
pub mod lifecycle;
pub mod model;
pub mod query;
pub mod service;
pub mod store;
pub mod validation;

pub use access::{can_read, can_write, FileGrant, Permission, Role};
pub use collection::{BoundedInsert, MAX_ASSETS_PER_FILE};
pub use error::{Error, FieldIssue, Result};
pub use events::{DecisionEvent, EventSink, RecordingSink, TracingSink};
pub use identity::{IdentityVerifier, JwtAlgorithm, JwtSettings, JwtVerifier, VerifiedIdentity};
pub use lifecycle::{FileState, Transition};
pub use query::{FileOrder, FileQuery, SortKey, View};
pub use service::CanvasService;
pub use store::Store;
