//! Database Connection Management
//!
//! This module provides the libsql/Turso connection and schema initialization
//! for the relation store the ownership graph reads from.
//!
//! # Architecture
//!
//! - **Path-agnostic**: Accepts any valid PathBuf
//! - **Idempotent schema**: `CREATE TABLE IF NOT EXISTS` for every kind, plus
//!   one index per foreign key column; migrations are owned elsewhere
//! - **WAL mode**: Write-Ahead Logging so readers never block on writers
//! - **Read-only readers**: the relation store opens its connections with
//!   `PRAGMA query_only`, so the resolution path cannot write by accident
//!
//! # Database Connection Patterns
//!
//! **ALWAYS use `connect_with_timeout()` (or `connect_read_only()`) in async
//! functions.** The 5-second busy timeout lets lookups wait out a concurrent
//! writer instead of failing immediately with `SQLITE_BUSY`.
//!
//! ```no_run
//! # use ownergraph_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db_service = DatabaseService::new(PathBuf::from("./data/graph.db")).await?;
//! let conn = db_service.connect_read_only().await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::DatabaseError;
use crate::db::schema::TABLES;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// Busy timeout applied to every connection, in milliseconds
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Database service for managing the libsql connection and relation schema
///
/// Cloning is cheap; clones share the underlying database handle. Create one
/// per process (or per test) and hand `Arc`s of the store built on it to each
/// request.
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

impl DatabaseService {
    /// Open (or create) the database at `db_path` and ensure the schema exists
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Create every relation table and foreign key index if missing
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if:
    /// - Parent directory cannot be created
    /// - Database connection fails
    /// - Schema initialization fails
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        let is_new_database = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema(is_new_database).await?;

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements may return rows, so they go through query() rather
    /// than execute().
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Create all relation tables and their foreign key indexes
    ///
    /// Safe to call repeatedly.
    async fn initialize_schema(&self, is_new_database: bool) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        for table in TABLES {
            conn.execute(&table.create_statement(), ())
                .await
                .map_err(|e| {
                    DatabaseError::initialization_failed(format!(
                        "Failed to create table '{}': {}",
                        table.table(),
                        e
                    ))
                })?;

            for index in table.index_statements() {
                conn.execute(&index, ()).await.map_err(|e| {
                    DatabaseError::initialization_failed(format!(
                        "Failed to create index on '{}': {}",
                        table.table(),
                        e
                    ))
                })?;
            }
        }

        // Flush the schema out of the WAL for fresh files so a second handle
        // opened right away sees every table.
        if is_new_database {
            self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
                .await?;
        }

        tracing::debug!(
            "Relation schema ready at {} ({} tables)",
            self.db_path.display(),
            TABLES.len()
        );

        Ok(())
    }

    /// Get a raw connection handle
    ///
    /// Only for synchronous contexts where the connection will not be used
    /// across await points. Async code should use `connect_with_timeout()`.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to open connection: {}", e))
        })
    }

    /// Get a connection with the busy timeout applied
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;
        self.execute_pragma(&conn, &format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS))
            .await?;
        Ok(conn)
    }

    /// Get a connection that refuses writes
    pub async fn connect_read_only(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        self.execute_pragma(&conn, "PRAGMA query_only = ON").await?;
        Ok(conn)
    }

    /// Names of the tables present in the database file
    pub async fn db_list_tables(&self) -> Result<Vec<String>, DatabaseError> {
        let conn = self.connect_read_only().await?;
        let mut rows = conn
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                (),
            )
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to list tables: {}", e)))?;

        let mut names = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            let name: String = row
                .get(0)
                .map_err(|e| DatabaseError::sql_execution(format!("Failed to get name: {}", e)))?;
            names.push(name);
        }
        Ok(names)
    }
}
