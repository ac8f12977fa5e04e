//! Graph Walker
//!
//! Executes the planned paths of a leaf against the relation store until one
//! reaches a target kind.
//!
//! # Algorithm
//!
//! 1. Plan: take the catalog entry of the leaf kind (fail fast with
//!    `UnsupportedLeafKind` if there is none), cut each path at its first
//!    target kind, drop paths that never reach one.
//! 2. Evaluate the planned paths in declaration order. Hops within a path run
//!    one after another, each a single point lookup. A missing row or null
//!    column ends the path and the next one is tried.
//! 3. The first-declared path that reaches a target wins. If none does, the
//!    result is `NotFound` listing every attempted path. A forward link that
//!    lands on a target kind only counts once the target row is confirmed to
//!    exist; a dangling link is a dead end like a null one.
//!
//! Every path has a hop budget (`ResolverConfig::max_hops`, climbs included);
//! running out of it aborts the whole resolve with `GraphDepthExceeded`.
//!
//! In `Concurrent` mode all planned paths are started at once, but outcomes
//! are still decided in declaration order, so both modes return the same
//! result for the same data. Remaining lookups are dropped as soon as the
//! outcome is known. Dropping the `resolve` future cancels in-flight lookups
//! in either mode.

use crate::config::{ConfigError, EvaluationMode, ResolverConfig};
use crate::db::{DatabaseError, FetchRequest, RelationStore};
use crate::graph::catalog::{Hop, PathCatalog, PathSpec, Relation};
use crate::graph::error::ResolutionError;
use crate::graph::resolution::{HopRecord, Resolution, ResolutionReport};
use crate::models::{EntityRef, KindSet, NodeKind};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Outcome of walking one planned path
#[derive(Debug)]
enum PathOutcome {
    Reached {
        node: EntityRef,
        trace: Vec<HopRecord>,
    },
    DeadEnd {
        trace: Vec<HopRecord>,
    },
}

/// Outcome of evaluating a whole plan
#[derive(Debug)]
enum Evaluation {
    Found {
        index: usize,
        node: EntityRef,
        trace: Vec<HopRecord>,
    },
    Exhausted {
        trace: Vec<HopRecord>,
    },
}

/// Lookups already answered within one sequential resolve
///
/// Planned paths often share prefixes; a prefix that dead-ended once is not
/// queried again for the next path.
#[derive(Debug, Default)]
struct HopMemo {
    answers: HashMap<(EntityRef, Hop), Option<String>>,
}

/// Walks the containment graph from a leaf to its owning aggregate
///
/// Stateless apart from its injected store, catalog and config; one walker
/// can serve any number of concurrent `resolve` calls.
pub struct GraphWalker {
    store: Arc<dyn RelationStore>,
    catalog: Arc<PathCatalog>,
    config: ResolverConfig,
}

impl GraphWalker {
    /// Walker over the standard catalog with the default configuration
    pub fn new(store: Arc<dyn RelationStore>) -> Self {
        Self {
            store,
            catalog: PathCatalog::standard(),
            config: ResolverConfig::default(),
        }
    }

    /// Walker over the standard catalog
    ///
    /// # Errors
    ///
    /// `ConfigError` if `config` does not pass `ResolverConfig::validate`
    pub fn with_config(
        store: Arc<dyn RelationStore>,
        config: ResolverConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_catalog(store, PathCatalog::standard(), config)
    }

    pub fn with_catalog(
        store: Arc<dyn RelationStore>,
        catalog: Arc<PathCatalog>,
        config: ResolverConfig,
    ) -> Result<Self, ConfigError> {
        config.validate().map_err(ConfigError)?;
        Ok(Self {
            store,
            catalog,
            config,
        })
    }

    pub fn store(&self) -> &Arc<dyn RelationStore> {
        &self.store
    }

    pub fn catalog(&self) -> &PathCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the owner of `leaf_kind` `leaf_id` whose kind is in `targets`
    ///
    /// # Errors
    ///
    /// - `UnsupportedLeafKind` if the catalog has no entry for `leaf_kind`
    /// - `NotFound` if no planned path is fully populated
    /// - `GraphDepthExceeded` if a path runs out of hop budget
    /// - `Store` if the relation store cannot answer a lookup
    pub async fn resolve(
        &self,
        leaf_kind: NodeKind,
        leaf_id: &str,
        targets: impl Into<KindSet>,
    ) -> Result<Resolution, ResolutionError> {
        self.resolve_targets(leaf_kind, leaf_id, targets.into())
            .await
    }

    /// `resolve`, rendered as a serializable report
    pub async fn resolve_report(
        &self,
        leaf_kind: NodeKind,
        leaf_id: &str,
        targets: impl Into<KindSet>,
    ) -> ResolutionReport {
        let result = self.resolve(leaf_kind, leaf_id, targets).await;
        ResolutionReport::from_result(leaf_kind, leaf_id, &result)
    }

    #[instrument(
        level = "debug",
        name = "resolve_owner",
        skip_all,
        fields(leaf_kind = %leaf_kind, leaf_id = %leaf_id, targets = %targets)
    )]
    async fn resolve_targets(
        &self,
        leaf_kind: NodeKind,
        leaf_id: &str,
        targets: KindSet,
    ) -> Result<Resolution, ResolutionError> {
        let Some(plan) = self.catalog.plan(leaf_kind, targets) else {
            error!("❌ No ownership paths are declared for leaf kind {}", leaf_kind);
            return Err(ResolutionError::UnsupportedLeafKind { leaf_kind });
        };

        let leaf = EntityRef::new(leaf_kind, leaf_id);

        // Empty ids read as null links, so they never name a row
        if leaf_id.is_empty() {
            warn!("⚠️  Refusing to resolve {} with an empty id", leaf_kind);
            return Err(ResolutionError::NotFound {
                leaf_kind,
                leaf_id: leaf.id,
                targets,
                attempted: Vec::new(),
                trace: self.config.verbose_trace.then(Vec::new),
            });
        }

        if targets.contains(leaf_kind) {
            return self.resolve_self(leaf, targets).await;
        }

        debug!("Planned {} path(s) for {}", plan.len(), leaf);

        let evaluation = match self.config.evaluation {
            EvaluationMode::Sequential => self.evaluate_sequentially(&leaf, &plan, targets).await?,
            EvaluationMode::Concurrent => self.evaluate_concurrently(&leaf, &plan, targets).await?,
        };

        match evaluation {
            Evaluation::Found { index, node, trace } => {
                let path = plan[index].name();
                if index > 0 {
                    info!(
                        "Resolved {} to {} via fallback path {} of {}: {}",
                        leaf,
                        node,
                        index + 1,
                        plan.len(),
                        path
                    );
                } else {
                    debug!("Resolved {} to {} via {}", leaf, node, path);
                }
                Ok(Resolution {
                    leaf,
                    node,
                    path,
                    trace,
                })
            }
            Evaluation::Exhausted { trace } => {
                let attempted: Vec<String> = plan.iter().map(PathSpec::name).collect();
                warn!(
                    "⚠️  No {} owner found for {} after {} path(s)",
                    targets,
                    leaf,
                    attempted.len()
                );
                Err(ResolutionError::NotFound {
                    leaf_kind,
                    leaf_id: leaf.id,
                    targets,
                    attempted,
                    trace: self.config.verbose_trace.then_some(trace),
                })
            }
        }
    }

    /// The leaf is itself a target: resolving is an existence check
    async fn resolve_self(
        &self,
        leaf: EntityRef,
        targets: KindSet,
    ) -> Result<Resolution, ResolutionError> {
        let exists = self
            .exists(&leaf)
            .await
            .map_err(|e| self.store_error(&leaf, e))?;

        let path = leaf.kind.as_str().to_string();
        if exists {
            return Ok(Resolution {
                node: leaf.clone(),
                leaf,
                path,
                trace: Vec::new(),
            });
        }

        warn!("⚠️  {} does not exist", leaf);
        Err(ResolutionError::NotFound {
            leaf_kind: leaf.kind,
            leaf_id: leaf.id,
            targets,
            attempted: vec![path],
            trace: self.config.verbose_trace.then(Vec::new),
        })
    }

    async fn evaluate_sequentially(
        &self,
        leaf: &EntityRef,
        plan: &[PathSpec],
        targets: KindSet,
    ) -> Result<Evaluation, ResolutionError> {
        let mut memo = HopMemo::default();
        let mut failed = Vec::new();

        for (index, path) in plan.iter().enumerate() {
            match self.walk(leaf, path, targets, Some(&mut memo)).await? {
                PathOutcome::Reached { node, trace } => {
                    return Ok(Evaluation::Found { index, node, trace });
                }
                PathOutcome::DeadEnd { trace } => failed.extend(trace),
            }
        }

        Ok(Evaluation::Exhausted { trace: failed })
    }

    async fn evaluate_concurrently(
        &self,
        leaf: &EntityRef,
        plan: &[PathSpec],
        targets: KindSet,
    ) -> Result<Evaluation, ResolutionError> {
        let mut pending: FuturesUnordered<_> = plan
            .iter()
            .enumerate()
            .map(|(index, path)| async move { (index, self.walk(leaf, path, targets, None).await) })
            .collect();

        let mut outcomes: Vec<Option<Result<PathOutcome, ResolutionError>>> =
            plan.iter().map(|_| None).collect();
        let mut decided = 0;
        let mut failed = Vec::new();

        while let Some((index, outcome)) = pending.next().await {
            outcomes[index] = Some(outcome);

            // Settle paths strictly in declaration order
            while decided < plan.len() {
                match outcomes[decided].take() {
                    None => break,
                    Some(Ok(PathOutcome::Reached { node, trace })) => {
                        return Ok(Evaluation::Found {
                            index: decided,
                            node,
                            trace,
                        });
                    }
                    Some(Ok(PathOutcome::DeadEnd { trace })) => {
                        failed.extend(trace);
                        decided += 1;
                    }
                    Some(Err(e)) => return Err(e),
                }
            }
        }

        Ok(Evaluation::Exhausted { trace: failed })
    }

    /// Execute the hops of one planned path
    async fn walk(
        &self,
        leaf: &EntityRef,
        path: &PathSpec,
        targets: KindSet,
        mut memo: Option<&mut HopMemo>,
    ) -> Result<PathOutcome, ResolutionError> {
        let mut current = leaf.clone();
        let mut trace = Vec::with_capacity(path.len());
        let mut hops_taken = 0;

        for hop in &path.hops {
            if let Relation::Climb(column) = hop.relation {
                let step = Hop::forward(column, current.kind);
                loop {
                    self.charge_hop(&mut hops_taken, leaf, path)?;
                    let parent = self
                        .step(&current, step, memo.as_deref_mut())
                        .await
                        .map_err(|e| self.store_error(leaf, e))?;
                    let Some(parent) = parent else { break };

                    let to = EntityRef::new(current.kind, parent);
                    let record = HopRecord {
                        from: current.clone(),
                        via: hop.describe(current.kind),
                        to_kind: current.kind,
                        to: Some(to.clone()),
                    };
                    debug!("hop {}", record);
                    trace.push(record);
                    current = to;
                }
                continue;
            }

            self.charge_hop(&mut hops_taken, leaf, path)?;
            let next = self
                .step(&current, *hop, memo.as_deref_mut())
                .await
                .map_err(|e| self.store_error(leaf, e))?;

            let record = HopRecord {
                from: current.clone(),
                via: hop.describe(current.kind),
                to_kind: hop.to,
                to: next.map(|id| EntityRef::new(hop.to, id)),
            };
            debug!("hop {}", record);

            match &record.to {
                Some(to) => {
                    current = to.clone();
                    trace.push(record);
                    if targets.contains(current.kind) {
                        // Reverse hops found the row itself; forward ones only read a column
                        if matches!(hop.relation, Relation::Forward(_))
                            && !self
                                .exists(&current)
                                .await
                                .map_err(|e| self.store_error(leaf, e))?
                        {
                            warn!(
                                "⚠️  {} links to missing {} along {}",
                                trace[trace.len() - 1].from, current, path
                            );
                            return Ok(PathOutcome::DeadEnd { trace });
                        }
                        return Ok(PathOutcome::Reached {
                            node: current,
                            trace,
                        });
                    }
                }
                None => {
                    trace.push(record);
                    debug!("Path dead-ended after {} hop(s): {}", hops_taken, path);
                    return Ok(PathOutcome::DeadEnd { trace });
                }
            }
        }

        debug!("Path ended without reaching a target: {}", path);
        Ok(PathOutcome::DeadEnd { trace })
    }

    fn charge_hop(
        &self,
        hops_taken: &mut usize,
        leaf: &EntityRef,
        path: &PathSpec,
    ) -> Result<(), ResolutionError> {
        if *hops_taken >= self.config.max_hops {
            error!(
                "❌ Hop budget of {} exceeded resolving {} along {}",
                self.config.max_hops, leaf, path
            );
            return Err(ResolutionError::GraphDepthExceeded {
                leaf_kind: leaf.kind,
                leaf_id: leaf.id.clone(),
                path: path.name(),
                max_hops: self.config.max_hops,
            });
        }
        *hops_taken += 1;
        Ok(())
    }

    /// One hop, answered from the memo when the same lookup already ran
    async fn step(
        &self,
        from: &EntityRef,
        hop: Hop,
        memo: Option<&mut HopMemo>,
    ) -> Result<Option<String>, DatabaseError> {
        let Some(memo) = memo else {
            return self.lookup(from, hop).await;
        };

        let key = (from.clone(), hop);
        if let Some(answer) = memo.answers.get(&key) {
            return Ok(answer.clone());
        }
        let answer = self.lookup(from, hop).await?;
        memo.answers.insert(key, answer.clone());
        Ok(answer)
    }

    /// Single point lookup for one hop; `None` when the link is absent
    async fn lookup(&self, from: &EntityRef, hop: Hop) -> Result<Option<String>, DatabaseError> {
        match hop.relation {
            Relation::Forward(column) | Relation::Climb(column) => {
                let request = FetchRequest::by_id(from.kind, from.id.clone()).select(&[column]);
                let record = self.store.fetch(&request).await?;
                Ok(record.and_then(|r| r.str_field(column).map(str::to_string)))
            }
            Relation::Reverse(column) => {
                let request = FetchRequest::by_column(hop.to, column, from.id.clone());
                let record = self.store.fetch(&request).await?;
                Ok(record.map(|r| r.id))
            }
        }
    }

    async fn exists(&self, entity: &EntityRef) -> Result<bool, DatabaseError> {
        let record = self
            .store
            .fetch(&FetchRequest::by_id(entity.kind, entity.id.clone()))
            .await?;
        Ok(record.is_some())
    }

    fn store_error(&self, leaf: &EntityRef, source: DatabaseError) -> ResolutionError {
        error!("❌ Relation store failed while resolving {}: {}", leaf, source);
        ResolutionError::Store {
            leaf_kind: leaf.kind,
            leaf_id: leaf.id.clone(),
            source,
        }
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "walker_test.rs"]
mod walker_test;
