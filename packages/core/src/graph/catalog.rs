//! Path Catalog
//!
//! Per leaf kind, the ordered list of candidate ancestor paths ([`PathSpec`])
//! the walker may try. Declaration order is precedence: the first path whose
//! hops are all populated wins.
//!
//! The standard catalog is derived once from the containment schema (see
//! [`crate::graph::containment`]); custom catalogs for tests and tooling are
//! assembled with [`PathCatalog::builder`], which checks every hop against the
//! relation schema.

use crate::db::schema;
use crate::graph::containment::{expand, CONTAINMENT};
use crate::graph::error::CatalogError;
use crate::models::{KindSet, NodeKind};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// How one hop finds the next node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Read this column on the current row; its value is the next id
    Forward(&'static str),
    /// Find the row of the next kind whose column holds the current id
    Reverse(&'static str),
    /// Follow this self-referencing column until it is null
    Climb(&'static str),
}

impl Relation {
    pub fn column(&self) -> &'static str {
        match self {
            Relation::Forward(column) | Relation::Reverse(column) | Relation::Climb(column) => {
                column
            }
        }
    }
}

/// One step of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hop {
    pub relation: Relation,
    /// Kind of the node the hop lands on
    pub to: NodeKind,
}

impl Hop {
    pub const fn forward(column: &'static str, to: NodeKind) -> Self {
        Self {
            relation: Relation::Forward(column),
            to,
        }
    }

    pub const fn reverse(to: NodeKind, column: &'static str) -> Self {
        Self {
            relation: Relation::Reverse(column),
            to,
        }
    }

    pub const fn climb(kind: NodeKind, column: &'static str) -> Self {
        Self {
            relation: Relation::Climb(column),
            to: kind,
        }
    }

    /// `table.column` the hop reads, given the kind it starts from
    pub fn describe(&self, from: NodeKind) -> String {
        match self.relation {
            Relation::Forward(column) => format!("{}.{}", from.table(), column),
            Relation::Reverse(column) => format!("{}.{}", self.to.table(), column),
            Relation::Climb(column) => format!("{}.{}*", from.table(), column),
        }
    }
}

/// One candidate ordered sequence of hops from a leaf kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    pub leaf: NodeKind,
    pub hops: Vec<Hop>,
    label: Option<String>,
}

impl PathSpec {
    pub fn new(leaf: NodeKind, hops: Vec<Hop>) -> Self {
        Self {
            leaf,
            hops,
            label: None,
        }
    }

    pub fn labeled(leaf: NodeKind, label: impl Into<String>, hops: Vec<Hop>) -> Self {
        Self {
            leaf,
            hops,
            label: Some(label.into()),
        }
    }

    /// Label if one was given, otherwise the chain of kinds
    pub fn name(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        let mut parts = vec![self.leaf.as_str().to_string()];
        for hop in &self.hops {
            match hop.relation {
                Relation::Climb(column) => parts.push(format!("^{}", column)),
                _ => parts.push(hop.to.as_str().to_string()),
            }
        }
        parts.join(" > ")
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Kind the path ends on
    pub fn terminal(&self) -> NodeKind {
        self.hops.last().map_or(self.leaf, |hop| hop.to)
    }

    /// The prefix ending at the first hop that lands on a target kind, or
    /// `None` if the path never reaches one
    pub fn truncate_at(&self, targets: KindSet) -> Option<PathSpec> {
        let end = self.hops.iter().position(|hop| targets.contains(hop.to))?;
        Some(PathSpec {
            leaf: self.leaf,
            hops: self.hops[..=end].to_vec(),
            label: self.label.clone(),
        })
    }

    /// Check every hop against the relation schema
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut from = self.leaf;
        for (step, hop) in self.hops.iter().enumerate() {
            let invalid = |reason: String| CatalogError::InvalidHop {
                path: self.name(),
                step,
                reason,
            };

            let (owner, referenced) = match hop.relation {
                Relation::Forward(_) => (from, hop.to),
                Relation::Reverse(_) => (hop.to, from),
                Relation::Climb(_) => {
                    if hop.to != from {
                        return Err(invalid(format!(
                            "climb must stay on {} but lands on {}",
                            from, hop.to
                        )));
                    }
                    (from, from)
                }
            };

            let column = schema::table_def(owner)
                .ok()
                .and_then(|table| table.column(hop.relation.column()))
                .ok_or_else(|| invalid(format!("{} is not a column", hop.describe(from))))?;

            if column.references != Some(referenced) {
                return Err(invalid(format!(
                    "{} does not reference {}",
                    hop.describe(from),
                    referenced
                )));
            }

            from = hop.to;
        }
        Ok(())
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Candidate paths per leaf kind
#[derive(Debug, Clone, Default)]
pub struct PathCatalog {
    entries: BTreeMap<NodeKind, Vec<PathSpec>>,
}

impl PathCatalog {
    /// The catalog derived from the containment schema, built on first use
    pub fn standard() -> Arc<PathCatalog> {
        static STANDARD: OnceLock<Arc<PathCatalog>> = OnceLock::new();
        STANDARD
            .get_or_init(|| {
                let entries = NodeKind::ALL
                    .iter()
                    .filter_map(|kind| {
                        let paths = expand(CONTAINMENT, *kind);
                        (!paths.is_empty()).then_some((*kind, paths))
                    })
                    .collect();
                Arc::new(PathCatalog { entries })
            })
            .clone()
    }

    pub fn builder() -> PathCatalogBuilder {
        PathCatalogBuilder::default()
    }

    /// Declared paths for `leaf`, or `None` if the kind has no entry
    pub fn paths(&self, leaf: NodeKind) -> Option<&[PathSpec]> {
        self.entries.get(&leaf).map(Vec::as_slice)
    }

    /// Leaf kinds that have an entry
    pub fn leaf_kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        self.entries.keys().copied()
    }

    /// Paths to evaluate for a request, in precedence order
    ///
    /// Each declared path is cut at its first target kind; paths that never
    /// reach a target are dropped and duplicate prefixes keep their first
    /// position. Returns `None` when `leaf` has no entry at all.
    pub fn plan(&self, leaf: NodeKind, targets: KindSet) -> Option<Vec<PathSpec>> {
        let declared = self.paths(leaf)?;
        let mut planned: Vec<PathSpec> = Vec::new();
        for path in declared {
            if let Some(prefix) = path.truncate_at(targets) {
                if !planned.iter().any(|p| p.hops == prefix.hops) {
                    planned.push(prefix);
                }
            }
        }
        Some(planned)
    }

    /// Validate every path against the relation schema
    pub fn validate(&self) -> Result<(), CatalogError> {
        self.entries
            .values()
            .flatten()
            .try_for_each(PathSpec::validate)
    }
}

/// Assembles a custom catalog
#[derive(Debug, Default)]
pub struct PathCatalogBuilder {
    entries: BTreeMap<NodeKind, Vec<PathSpec>>,
}

impl PathCatalogBuilder {
    /// Append a path for `leaf`, after any already declared
    pub fn path(mut self, leaf: NodeKind, hops: Vec<Hop>) -> Self {
        self.entries
            .entry(leaf)
            .or_default()
            .push(PathSpec::new(leaf, hops));
        self
    }

    pub fn labeled_path(mut self, leaf: NodeKind, label: &str, hops: Vec<Hop>) -> Self {
        self.entries
            .entry(leaf)
            .or_default()
            .push(PathSpec::labeled(leaf, label, hops));
        self
    }

    pub fn build(self) -> Result<PathCatalog, CatalogError> {
        let catalog = PathCatalog {
            entries: self.entries,
        };
        catalog.validate()?;
        Ok(catalog)
    }
}
