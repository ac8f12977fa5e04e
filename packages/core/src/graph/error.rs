//! Resolution errors

use crate::db::DatabaseError;
use crate::graph::resolution::HopRecord;
use crate::models::{KindSet, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable reason code of a failed resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    NotFound,
    UnsupportedLeafKind,
    GraphDepthExceeded,
    StoreUnavailable,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::NotFound => "NotFound",
            FailureReason::UnsupportedLeafKind => "UnsupportedLeafKind",
            FailureReason::GraphDepthExceeded => "GraphDepthExceeded",
            FailureReason::StoreUnavailable => "StoreUnavailable",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn attempted_summary(attempted: &[String]) -> String {
    if attempted.is_empty() {
        "no declared path reaches the target".to_string()
    } else {
        format!(
            "tried {} path(s): {}",
            attempted.len(),
            attempted.join("; ")
        )
    }
}

/// Failure of `GraphWalker::resolve`
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("No ownership paths are declared for {leaf_kind}")]
    UnsupportedLeafKind { leaf_kind: NodeKind },

    #[error("No {targets} owner found for {leaf_kind} '{leaf_id}': {}", attempted_summary(.attempted))]
    NotFound {
        leaf_kind: NodeKind,
        leaf_id: String,
        targets: KindSet,
        attempted: Vec<String>,
        /// Hops of every attempted path, only in verbose mode
        trace: Option<Vec<HopRecord>>,
    },

    #[error("Hop budget of {max_hops} exceeded resolving {leaf_kind} '{leaf_id}' along {path}")]
    GraphDepthExceeded {
        leaf_kind: NodeKind,
        leaf_id: String,
        path: String,
        max_hops: usize,
    },

    #[error("Relation store failed resolving {leaf_kind} '{leaf_id}': {source}")]
    Store {
        leaf_kind: NodeKind,
        leaf_id: String,
        #[source]
        source: DatabaseError,
    },
}

impl ResolutionError {
    pub fn reason(&self) -> FailureReason {
        match self {
            ResolutionError::UnsupportedLeafKind { .. } => FailureReason::UnsupportedLeafKind,
            ResolutionError::NotFound { .. } => FailureReason::NotFound,
            ResolutionError::GraphDepthExceeded { .. } => FailureReason::GraphDepthExceeded,
            ResolutionError::Store { .. } => FailureReason::StoreUnavailable,
        }
    }

    pub fn leaf_kind(&self) -> NodeKind {
        match self {
            ResolutionError::UnsupportedLeafKind { leaf_kind }
            | ResolutionError::NotFound { leaf_kind, .. }
            | ResolutionError::GraphDepthExceeded { leaf_kind, .. }
            | ResolutionError::Store { leaf_kind, .. } => *leaf_kind,
        }
    }

    /// Leaf id, absent for `UnsupportedLeafKind`
    pub fn leaf_id(&self) -> Option<&str> {
        match self {
            ResolutionError::UnsupportedLeafKind { .. } => None,
            ResolutionError::NotFound { leaf_id, .. }
            | ResolutionError::GraphDepthExceeded { leaf_id, .. }
            | ResolutionError::Store { leaf_id, .. } => Some(leaf_id),
        }
    }

    /// Names of the paths tried before giving up
    ///
    /// For `GraphDepthExceeded` this is the path that ran out of hops.
    pub fn attempted(&self) -> &[String] {
        match self {
            ResolutionError::NotFound { attempted, .. } => attempted,
            ResolutionError::GraphDepthExceeded { path, .. } => std::slice::from_ref(path),
            _ => &[],
        }
    }
}

/// A custom catalog path that does not match the relation schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Invalid hop {step} in path '{path}': {reason}")]
    InvalidHop {
        path: String,
        step: usize,
        reason: String,
    },
}
