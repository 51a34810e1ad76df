//! Canvas service
//!
//! The façade every transport calls. Each operation takes the acting user's
//! id explicitly, gates against the target file through [`crate::access`],
//! and applies mutations through guarded [`crate::store::Store`] calls.
//!
//! # Module Structure
//!
//! - `core`: `CanvasService` struct, builder and authorization helpers
//! - `users`: identity sync and user resolution
//! - `files`: listing, content updates and lifecycle transitions
//! - `collaborators`: membership management
//! - `assets`: capacity-bounded asset library
//! - `elements`: ordered canvas elements

mod assets;
mod collaborators;
mod core;
mod elements;
mod files;
mod users;


pub use core::CanvasService;
