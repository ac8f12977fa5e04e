//! Service Layer Error Types
//!
//! Errors surfaced by the resolver facades. A walker failure is wrapped with
//! the facade's context ("storage bucket for templates set X") but keeps its
//! original reason code.

use crate::db::DatabaseError;
use crate::graph::{FailureReason, ResolutionError};
use crate::models::NodeKind;
use thiserror::Error;

/// Resolver facade errors
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The graph walker could not resolve the owner
    #[error("Failed to resolve {context}: {source}")]
    Resolution {
        context: String,
        #[source]
        source: ResolutionError,
    },

    /// The owner was resolved but its row vanished before it could be loaded
    #[error("{kind} '{id}' could not be loaded")]
    EntityNotLoaded { kind: NodeKind, id: String },

    /// Database operation failed
    #[error("Database operation failed: {0}")]
    DatabaseError(#[from] DatabaseError),

    /// A loaded row did not match its aggregate shape
    #[error("Failed to decode {kind}: {source}")]
    Decode {
        kind: NodeKind,
        #[source]
        source: serde_json::Error,
    },
}

impl ResolverError {
    /// Wrap a walker failure with facade context
    pub fn resolution(context: impl Into<String>, source: ResolutionError) -> Self {
        Self::Resolution {
            context: context.into(),
            source,
        }
    }

    /// Create an entity not loaded error
    pub fn entity_not_loaded(kind: NodeKind, id: impl Into<String>) -> Self {
        Self::EntityNotLoaded { kind, id: id.into() }
    }

    /// Create a decode error
    pub fn decode(kind: NodeKind, source: serde_json::Error) -> Self {
        Self::Decode { kind, source }
    }

    /// Reason code of the failure, where it maps onto one
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            Self::Resolution { source, .. } => Some(source.reason()),
            Self::EntityNotLoaded { .. } => Some(FailureReason::NotFound),
            Self::DatabaseError(_) => Some(FailureReason::StoreUnavailable),
            Self::Decode { .. } => None,
        }
    }

    /// Whether the owner does not exist (as opposed to the lookup failing)
    pub fn is_not_found(&self) -> bool {
        self.reason() == Some(FailureReason::NotFound)
    }
}
