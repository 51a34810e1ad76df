//! Atelier Store - SQLite persistence
//!
//! Implements [`atelier_core::Store`] on SQLite through `sqlx`:
//! - Schema migrations with cascading foreign keys
//! - Guarded single-statement lifecycle transitions
//! - Capacity-bounded asset inserts inside a transaction

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod helpers;
mod sqlite_store;
mod store_impl;


pub use sqlite_store::{PoolSettings, SqliteStore};
