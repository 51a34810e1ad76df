//! Server initialization
//!
//! Contains the main `run()` function that wires storage, identity and the
//! HTTP router together.

use super::config::{AppConfig, DatabaseConfig, LogFormat, LoggingConfig};
use super::validation::{validate_config, validate_production_config};
use crate::api;
use anyhow::{Context, Result};
use atelier_core::{CanvasService, IdentityVerifier, JwtVerifier};
use atelier_store::SqliteStore;
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
pub fn init_tracing(logging: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "atelier=info,tower_http=info".into()),
    );

    match logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Open the database and bring its schema up to date
pub async fn open_store(database: &DatabaseConfig) -> Result<SqliteStore> {
    if let Some(parent) = database.file_path().as_deref().and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }

    SqliteStore::connect(&database.url, &database.pool_settings())
        .await
        .with_context(|| format!("Failed to open database at {}", database.url))
}

/// Run the server
pub async fn run(config: AppConfig) -> Result<()> {
    info!("Starting Atelier v{}", env!("CARGO_PKG_VERSION"));

    validate_config(&config)?;
    validate_production_config(&config)?;

    let store = open_store(&config.database).await?;
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(
        JwtVerifier::from_settings(&config.auth).context("Failed to build identity verifier")?,
    );
    let service = Arc::new(CanvasService::new(Arc::new(store)));

    let app = api::app(service, verifier)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.cors_origins));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Atelier server stopped");
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
