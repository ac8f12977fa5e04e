//! Data Models
//!
//! This module contains the core data structures of the ownership graph:
//!
//! - `NodeKind` / `KindSet` - the kinds of entity a row can be, and sets of them
//! - `EntityRef` - a (kind, id) pair, the walker's unit of currency
//! - Aggregates (Community, License, StorageAggregator, ...) returned by the
//!   resolver facades after an eager load

mod entity;
mod kind;

pub use entity::{
    Community, EntityRef, License, LicenseEntitlement, Profile, RoleSet, StorageAggregator,
    StorageBucket,
};
pub use kind::{KindSet, NodeKind, UnknownKind};
