//! Server module for Atelier
//!
//! # Module Structure
//!
//! - `config`: Configuration structures
//! - `loader`: Configuration loading from files and environment
//! - `validation`: Startup and production configuration checks
//! - `init`: Tracing setup, storage wiring and the run loop

pub mod config;
mod init;
mod loader;
mod validation;

// Re-export public API
pub use init::{init_tracing, open_store, run};
pub use loader::load_config;
pub use validation::{validate_config, validate_production_config};
