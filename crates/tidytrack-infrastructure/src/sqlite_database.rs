//! Lazily initialized SQLite database shared by the structured repositories.

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tidytrack_core::error::{Result, TrackerError};
use tokio::sync::OnceCell;

const CREATE_SESSIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS sessions (
        session_id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        goal_time INTEGER NOT NULL,
        start_time TEXT NOT NULL,
        end_time TEXT,
        before_picture_id TEXT,
        after_picture_id TEXT,
        comments TEXT NOT NULL,
        session_status TEXT NOT NULL
    )
"#;

const CREATE_COMMENTS: &str = r#"
    CREATE TABLE IF NOT EXISTS comments (
        comment_id TEXT PRIMARY KEY,
        session_id TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        text TEXT NOT NULL,
        picture_data TEXT
    )
"#;

const CREATE_PICTURES: &str = r#"
    CREATE TABLE IF NOT EXISTS pictures (
        picture_id TEXT PRIMARY KEY,
        session_id TEXT NOT NULL,
        picture_data TEXT NOT NULL,
        picture_type TEXT NOT NULL
    )
"#;

/// Where the database lives.
#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Handle to the structured store.
///
/// Nothing touches the disk until the first repository call. The first call
/// opens the pool and creates the `sessions`, `comments` and `pictures`
/// tables (primary key on each identifier column); every later call, including
/// calls racing the first one, receives the same pool.
///
/// Share one instance (behind an `Arc`) between the three repositories.
pub struct SqliteDatabase {
    location: Location,
    pool: OnceCell<SqlitePool>,
}

impl SqliteDatabase {
    /// Database stored in a file. Parent directories are created on first use.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            pool: OnceCell::new(),
        }
    }

    /// Private in-memory database, gone when the handle is dropped.
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            pool: OnceCell::new(),
        }
    }

    /// Returns the database file, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path.as_path()),
            Location::Memory => None,
        }
    }

    /// Returns true once the schema has been established.
    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// Returns the shared pool, establishing it on first use.
    pub async fn pool(&self) -> Result<&SqlitePool> {
        self.pool.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<SqlitePool> {
        let pool = match &self.location {
            Location::File(path) => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);
                SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect_with(options)
                    .await
                    .map_err(|e| TrackerError::storage(format!("Failed to open database: {}", e)))?
            }
            Location::Memory => {
                // Every connection to :memory: is its own database, so the
                // pool is pinned to a single connection that never expires.
                let options = SqliteConnectOptions::from_str("sqlite::memory:")
                    .map_err(|e| TrackerError::storage(e.to_string()))?;
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
                    .map_err(|e| TrackerError::storage(format!("Failed to open database: {}", e)))?
            }
        };

        for statement in [CREATE_SESSIONS, CREATE_COMMENTS, CREATE_PICTURES] {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| TrackerError::storage(format!("Failed to create schema: {}", e)))?;
        }

        match &self.location {
            Location::File(path) => tracing::info!("Opened session database: {}", path.display()),
            Location::Memory => tracing::info!("Opened in-memory session database"),
        }

        Ok(pool)
    }
}
