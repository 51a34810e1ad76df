//! Configuration validation
//!
//! Hard checks run on every start; security warnings only in production.

use super::config::{AppConfig, DEV_SECRET};
use super::loader::environment_name;
use anyhow::{bail, Context, Result};
use atelier_core::JwtVerifier;
use tracing::warn;

/// Reject configurations the server cannot start with
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.server.port == 0 {
        bail!("server.port must be non-zero");
    }
    if config.database.max_connections == 0 {
        bail!("database.max_connections must be at least 1");
    }
    JwtVerifier::from_settings(&config.auth).context("Invalid [auth] configuration")?;
    Ok(())
}

/// Validate configuration for production security
pub fn validate_production_config(config: &AppConfig) -> Result<()> {
    if environment_name().to_lowercase() != "production" {
        return Ok(());
    }

    for warning in security_warnings(config) {
        warn!("SECURITY WARNING: {}", warning);
    }

    Ok(())
}

fn security_warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if config.server.host == "0.0.0.0" {
        warnings.push(
            "Server is binding to all interfaces (0.0.0.0) in production. \
             Consider binding to 127.0.0.1 and using a reverse proxy.",
        );
    }

    if config.auth.secret.as_deref() == Some(DEV_SECRET) {
        warnings.push(
            "auth.secret is the development default. \
             Set ATELIER_AUTH__SECRET or switch to RS256.",
        );
    }

    if config.server.cors_origins.iter().any(|o| o == "*") {
        warnings.push("CORS allows any origin in production.");
    }

    if config.database.is_in_memory() {
        warnings.push("Database is in-memory; all data is lost on restart.");
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.secret = Some(DEV_SECRET.to_string());
        config
    }

    #[test]
    fn test_validate_requires_key_material() {
        assert!(validate_config(&AppConfig::default()).is_err());
        assert!(validate_config(&dev_config()).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = dev_config();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_security_warnings() {
        let mut config = dev_config();
        assert_eq!(security_warnings(&config).len(), 1);

        config.server.host = "0.0.0.0".to_string();
        config.server.cors_origins = vec!["*".to_string()];
        config.database.url = "sqlite::memory:".to_string();
        assert_eq!(security_warnings(&config).len(), 4);

        config.auth.secret = Some("a-real-secret".to_string());
        assert_eq!(security_warnings(&config).len(), 3);
    }
}
