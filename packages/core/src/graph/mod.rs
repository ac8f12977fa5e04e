//! Ownership Graph
//!
//! Resolution of a leaf entity to its owning aggregate:
//!
//! - `containment`: per-kind owners, attachments and climbs
//! - `catalog`: candidate paths per leaf kind, derived from the containment
//!   schema
//! - `walker`: executes the planned paths against a `RelationStore`
//! - `resolution` / `error`: results, reports and the failure taxonomy

pub mod catalog;
pub mod containment;
mod error;
mod resolution;
mod walker;

pub use catalog::{Hop, PathCatalog, PathCatalogBuilder, PathSpec, Relation};
pub use error::{CatalogError, FailureReason, ResolutionError};
pub use resolution::{HopRecord, Resolution, ResolutionReport};
pub use walker::GraphWalker;
