//! Database Error Types
//!
//! Errors raised by the relation store backends: connection and schema
//! initialization failures, SQL execution failures, and requests naming a
//! column the schema does not define.

use crate::models::NodeKind;
use std::path::PathBuf;
use thiserror::Error;

/// Relation store errors
///
/// A null foreign key is never an error at this layer; it comes back as a
/// missing value in the fetched record. These variants cover the cases where
/// the store could not answer at all.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish database connection
    #[error("Failed to connect to database at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// Failed to initialize the relation schema
    #[error("Failed to initialize database schema: {0}")]
    InitializationFailed(String),

    /// Permission denied when accessing database
    #[error("Permission denied for database path: {path}")]
    PermissionDenied { path: PathBuf },

    /// Failed to create parent directory
    #[error("Failed to create parent directory for database: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    /// libsql operation error
    #[error("Database operation failed: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// SQL execution error with context
    #[error("SQL execution failed: {context}")]
    SqlExecutionError { context: String },

    /// No table is defined for the kind
    #[error("No table defined for {0}")]
    UnknownTable(NodeKind),

    /// A fetch named a column that the kind's table does not have
    #[error("Unknown column '{column}' on {kind}")]
    UnknownColumn { kind: NodeKind, column: String },

    /// A stored value could not be converted
    #[error("Failed to decode {kind} row: {context}")]
    DecodeFailed { kind: NodeKind, context: String },
}

impl DatabaseError {
    /// Create a connection failed error
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    /// Create an initialization failed error
    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied(path: PathBuf) -> Self {
        Self::PermissionDenied { path }
    }

    /// Create a SQL execution error with context
    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }

    pub fn unknown_column(kind: NodeKind, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            kind,
            column: column.into(),
        }
    }

    pub fn decode_failed(kind: NodeKind, context: impl Into<String>) -> Self {
        Self::DecodeFailed {
            kind,
            context: context.into(),
        }
    }
}
