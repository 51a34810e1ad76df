//! SqliteStore - SQLite-backed storage

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use atelier_core::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::helpers::db_err;

/// Pool settings for [`SqliteStore::connect`]
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Upper bound on open connections
    pub max_connections: u32,
    /// How long a request waits for a free connection
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Store persisting users, files, collaborators, assets and elements
#[derive(Clone)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an existing pool; the schema is assumed to be in place
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a database URL and bring its schema up to date
    ///
    /// In-memory URLs are limited to one connection, since every SQLite
    /// connection would otherwise see its own empty database. File databases
    /// run in WAL mode so readers do not block the writer.
    pub async fn connect(url: &str, settings: &PoolSettings) -> Result<Self> {
        let in_memory = url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(url)
            .map_err(db_err)?
            .create_if_missing(true)
            .foreign_keys(true);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let max_connections = if in_memory { 1 } else { settings.max_connections };

        let mut pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(settings.acquire_timeout);
        if in_memory {
            pool = pool.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool.connect_with(options).await.map_err(db_err)?;

        let store = Self { pool };
        store.run_migrations().await?;

        info!(max_connections, "SQLite store initialized");
        Ok(store)
    }

    /// Open (or create) a database file
    pub async fn from_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Database(format!("failed to create directory: {e}")))?;
        }
        let url = format!("sqlite:{}", db_path.display());
        Self::connect(&url, &PoolSettings::default()).await
    }

    /// Create an in-memory store (for testing)
    pub async fn in_memory() -> Result<Self> {
        let store = Self::connect("sqlite::memory:", &PoolSettings::default()).await?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    /// Get a reference to the underlying connection pool
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes that do not exist yet
    pub async fn run_migrations(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        }
        debug!("Database migrations completed");
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        subject TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL,
        display_name TEXT,
        avatar_url TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_users_email
    ON users(email COLLATE NOCASE)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS files (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL REFERENCES users(id),
        name TEXT NOT NULL,
        file_type TEXT NOT NULL,
        canvas_data TEXT,
        last_edited_by TEXT REFERENCES users(id),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_files_owner
    ON files(owner_id, deleted_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS collaborators (
        file_id TEXT NOT NULL REFERENCES files(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL REFERENCES users(id),
        created_at TEXT NOT NULL,
        PRIMARY KEY (file_id, user_id)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_collaborators_user
    ON collaborators(user_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS assets (
        id TEXT PRIMARY KEY,
        file_id TEXT NOT NULL REFERENCES files(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        file_type TEXT NOT NULL,
        storage_url TEXT NOT NULL,
        storage_key TEXT,
        file_size INTEGER,
        thumbnail_url TEXT,
        metadata TEXT NOT NULL DEFAULT '{}',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_assets_file
    ON assets(file_id, created_at DESC)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS elements (
        id TEXT PRIMARY KEY,
        file_id TEXT NOT NULL REFERENCES files(id) ON DELETE CASCADE,
        element_type TEXT NOT NULL,
        props TEXT NOT NULL,
        sort_index INTEGER NOT NULL DEFAULT 0,
        asset_id TEXT REFERENCES assets(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_elements_file
    ON elements(file_id, sort_index)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_elements_asset
    ON elements(asset_id)
    "#,
];
