//! Resolution results and their JSON report form

use crate::graph::error::{FailureReason, ResolutionError};
use crate::models::{EntityRef, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One executed hop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HopRecord {
    pub from: EntityRef,
    /// `table.column` that was read
    pub via: String,
    pub to_kind: NodeKind,
    /// Node reached, `None` where the path dead-ended
    pub to: Option<EntityRef>,
}

impl fmt::Display for HopRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.to {
            Some(to) => write!(f, "{} -[{}]-> {}", self.from, self.via, to),
            None => write!(f, "{} -[{}]-> no {}", self.from, self.via, self.to_kind),
        }
    }
}

/// A successful resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub leaf: EntityRef,
    /// The resolved ancestor
    pub node: EntityRef,
    /// Name of the winning path
    pub path: String,
    pub trace: Vec<HopRecord>,
}

impl Resolution {
    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind
    }

    /// The node the final hop started from, i.e. the owner of an attached
    /// aggregate
    pub fn predecessor(&self) -> Option<&EntityRef> {
        self.trace.last().map(|hop| &hop.from)
    }
}

/// Serializable rendering of a resolve outcome
///
/// ```json
/// { "ok": true, "node": {...}, "path": "...", "trace": [...] }
/// { "ok": false, "reason": "NotFound", "leafKind": "Post", "leafId": "p1", "attempted": [...] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionReport {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<HopRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    pub leaf_kind: NodeKind,
    pub leaf_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempted: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResolutionReport {
    pub fn from_result(
        leaf_kind: NodeKind,
        leaf_id: &str,
        result: &Result<Resolution, ResolutionError>,
    ) -> Self {
        match result {
            Ok(resolution) => Self {
                ok: true,
                node: Some(resolution.node.clone()),
                path: Some(resolution.path.clone()),
                trace: resolution.trace.clone(),
                reason: None,
                leaf_kind,
                leaf_id: leaf_id.to_string(),
                attempted: Vec::new(),
                message: None,
            },
            Err(error) => {
                let trace = match error {
                    ResolutionError::NotFound {
                        trace: Some(trace), ..
                    } => trace.clone(),
                    _ => Vec::new(),
                };
                Self {
                    ok: false,
                    node: None,
                    path: None,
                    trace,
                    reason: Some(error.reason()),
                    leaf_kind,
                    leaf_id: leaf_id.to_string(),
                    attempted: error.attempted().to_vec(),
                    message: Some(error.to_string()),
                }
            }
        }
    }
}
