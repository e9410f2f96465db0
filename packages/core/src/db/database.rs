//! Database Connection Management
//!
//! This module provides the database connection and schema initialization for
//! Contentree using an embedded libsql (SQLite-compatible) database.
//!
//! # Architecture
//!
//! - **Path-agnostic**: Accepts any valid PathBuf; the parent directory is created on demand
//! - **Two tables**: `content` (tree nodes) and `content_item_property` (keyed edges)
//! - **JSON columns**: Reference slots are stored as JSON arrays and queried with `json_each`
//! - **WAL mode**: Write-Ahead Logging for better concurrency
//!
//! # Database Connection Patterns
//!
//! Use `connect_with_timeout()` in async functions. The 5-second busy timeout
//! lets concurrent writers wait instead of failing with `SQLITE_BUSY`.
//!
//! ```no_run
//! # use contentree_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db_service = DatabaseService::new(PathBuf::from("./data/contentree.db")).await?;
//! let conn = db_service.connect_with_timeout().await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::DatabaseError;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// Database service for managing the libsql connection and schema
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

impl DatabaseService {
    /// Open (or create) the database at `db_path`
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Initialize the schema (CREATE TABLE IF NOT EXISTS)
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created, the
    /// connection fails, or schema initialization fails.
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::access_denied(db_path.clone())
                    } else {
                        DatabaseError::CreateDirectory(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::open(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema().await?;

        tracing::debug!(path = %service.db_path.display(), "Database initialized");
        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so we must use query() instead of execute().
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::statement(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::statement(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize database schema and configuration
    ///
    /// Idempotent: every statement uses `IF NOT EXISTS`.
    ///
    /// `created_at` / `updated_at` are owned by the database; the store never
    /// writes them explicitly except for bumping `updated_at` on upsert.
    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS content (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                position INTEGER NOT NULL DEFAULT 0,
                is_root INTEGER NOT NULL DEFAULT 0,
                root_content_id TEXT,
                parent_content_id TEXT,
                alias TEXT,
                content_type TEXT CHECK (content_type IS NULL OR content_type IN (
                    'text', 'image', 'html', 'list_text_content', 'item_content', 'list_item_content'
                )),
                text TEXT,
                image TEXT,
                html TEXT,
                list_text_content JSON,
                item_content JSON NOT NULL DEFAULT '[]',
                list_item_content JSON,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::schema(format!("Failed to create content table: {}", e))
        })?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS content_item_property (
                id TEXT PRIMARY KEY,
                parent_content_id TEXT NOT NULL,
                root_content_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                \"key\" TEXT,
                content_id TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::schema(format!(
                "Failed to create content_item_property table: {}",
                e
            ))
        })?;

        self.create_core_indexes(&conn).await?;

        Ok(())
    }

    /// Create indexes backing the store's query predicates
    async fn create_core_indexes(&self, conn: &libsql::Connection) -> Result<(), DatabaseError> {
        const INDEXES: &[(&str, &str)] = &[
            (
                "idx_content_user_roots",
                "CREATE INDEX IF NOT EXISTS idx_content_user_roots ON content(user_id, is_root, position)",
            ),
            (
                "idx_content_root",
                "CREATE INDEX IF NOT EXISTS idx_content_root ON content(root_content_id)",
            ),
            (
                "idx_content_parent",
                "CREATE INDEX IF NOT EXISTS idx_content_parent ON content(parent_content_id)",
            ),
            (
                "idx_property_root",
                "CREATE INDEX IF NOT EXISTS idx_property_root ON content_item_property(root_content_id)",
            ),
            (
                "idx_property_parent",
                "CREATE INDEX IF NOT EXISTS idx_property_parent ON content_item_property(parent_content_id)",
            ),
            (
                "idx_property_target",
                "CREATE INDEX IF NOT EXISTS idx_property_target ON content_item_property(content_id)",
            ),
        ];

        for (name, sql) in INDEXES {
            conn.execute(sql, ()).await.map_err(|e| {
                DatabaseError::schema(format!(
                    "Failed to create index {}: {}",
                    name, e
                ))
            })?;
        }

        Ok(())
    }

    /// Get a synchronous connection to the database
    ///
    /// Only use this where the connection does not cross `.await` points;
    /// prefer `connect_with_timeout()` everywhere else.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::Libsql)
    }

    /// Get an async connection with busy timeout configured
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        Ok(conn)
    }

    /// Flush the WAL into the main database file
    pub async fn checkpoint(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
            .await
    }
}
