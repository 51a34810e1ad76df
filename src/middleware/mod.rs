//! Middleware module for the Atelier HTTP server
//!
//! Provides bearer-token authentication extractors.

pub mod auth;
