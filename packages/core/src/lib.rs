//! Ownership Resolution Graph
//!
//! Read-only resolution of a leaf content entity (whiteboard, post, memo,
//! document, comment room, callout, calendar event, ...) to the aggregate
//! that owns it: its Community, Space, StorageAggregator, StorageBucket,
//! License or Account.
//!
//! # Architecture
//!
//! - **Declarative catalog**: ownership paths are derived from a static
//!   containment schema, not hand-written per resolver
//! - **One walker**: a single traversal engine executes the catalog against
//!   an injected `RelationStore`
//! - **libsql/Turso**: the relational backend, read through parameterized
//!   point lookups only
//! - **Thin facades**: six resolvers fix a target kind and shape the result
//!
//! # Modules
//!
//! - [`models`] - Node kinds, entity references and loaded aggregates
//! - [`db`] - Relation store trait, schema and backends
//! - [`graph`] - Containment schema, path catalog and graph walker
//! - [`services`] - Resolver facades
//! - [`config`] - Walker configuration

pub mod config;
pub mod db;
pub mod graph;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::{ConfigError, EvaluationMode, ResolverConfig};
pub use graph::{
    FailureReason, GraphWalker, HopRecord, PathCatalog, Resolution, ResolutionError,
    ResolutionReport,
};
pub use models::*;
pub use services::*;
