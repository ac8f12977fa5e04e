//! Database Layer
//!
//! This module holds everything the ownership graph knows about storage:
//!
//! - The `RelationStore` trait: the single read capability the walker needs
//! - The relational schema (one table per node kind, nullable foreign keys)
//! - `DatabaseService` + `TursoRelationStore`: the libsql/Turso backend
//! - `MemoryRelationStore`: an in-memory backend for tests and fixtures
//!
//! # Architecture
//!
//! The store is an injected dependency: callers build one `Arc<dyn RelationStore>`
//! and hand it to a `GraphWalker`. Nothing in the crate holds a process-wide
//! connection, and nothing on the resolution path writes.

mod database;
mod error;
mod memory_store;
pub mod relation_store;
pub mod schema;
mod turso_store;

pub use database::DatabaseService;
pub use error::DatabaseError;
pub use memory_store::MemoryRelationStore;
pub use relation_store::{FetchRequest, Join, JoinLink, Lookup, Record, Related, RelationStore};
pub use turso_store::TursoRelationStore;
