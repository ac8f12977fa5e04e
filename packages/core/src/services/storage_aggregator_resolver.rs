//! Storage Aggregator Resolver
//!
//! Finds the storage aggregator that quota for a piece of content is charged
//! against. Content in a live space uses the space's aggregator; content in a
//! virtual contributor's knowledge base, an innovation pack or the platform
//! library falls through to the account or platform aggregator.

use crate::db::FetchRequest;
use crate::graph::GraphWalker;
use crate::models::{EntityRef, NodeKind, StorageAggregator};
use crate::services::load::load_entity;
use crate::services::{ResolverError, TimelineResolver};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Kinds that hold a storage aggregator through `storage_aggregator_id`
const AGGREGATOR_HOLDERS: [NodeKind; 3] = [NodeKind::Space, NodeKind::Account, NodeKind::Platform];

/// A resolved aggregator and the entity it is attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorResolution {
    pub aggregator_id: String,
    /// Space, Account or Platform holding the aggregator; the aggregator
    /// itself when nothing holds it
    pub owner: EntityRef,
}

pub struct StorageAggregatorResolver {
    walker: Arc<GraphWalker>,
    timelines: TimelineResolver,
}

impl StorageAggregatorResolver {
    pub fn new(walker: Arc<GraphWalker>) -> Self {
        Self {
            timelines: TimelineResolver::new(Arc::clone(&walker)),
            walker,
        }
    }

    /// Aggregator for `kind` `id`, with the entity that holds it
    pub async fn resolve(
        &self,
        kind: NodeKind,
        id: &str,
    ) -> Result<AggregatorResolution, ResolverError> {
        let resolution = self
            .walker
            .resolve(kind, id, NodeKind::StorageAggregator)
            .await
            .map_err(|e| {
                ResolverError::resolution(format!("storage aggregator for {} '{}'", kind, id), e)
            })?;

        let owner = match resolution.predecessor() {
            Some(holder) if AGGREGATOR_HOLDERS.contains(&holder.kind) => holder.clone(),
            // Reached through a bucket, or the leaf is the aggregator
            _ => self.holder_of(&resolution.node).await?,
        };

        Ok(AggregatorResolution {
            aggregator_id: resolution.node.id,
            owner,
        })
    }

    /// The Space, Account or Platform whose `storage_aggregator_id` is `aggregator`
    async fn holder_of(&self, aggregator: &EntityRef) -> Result<EntityRef, ResolverError> {
        for kind in AGGREGATOR_HOLDERS {
            let request =
                FetchRequest::by_column(kind, "storage_aggregator_id", aggregator.id.clone());
            if let Some(record) = self.walker.store().fetch(&request).await? {
                return Ok(EntityRef::new(kind, record.id));
            }
        }
        Ok(aggregator.clone())
    }

    pub async fn aggregator_id(&self, kind: NodeKind, id: &str) -> Result<String, ResolverError> {
        self.resolve(kind, id)
            .await
            .map(|resolution| resolution.aggregator_id)
    }

    pub async fn aggregator_id_for_callout(&self, callout_id: &str) -> Result<String, ResolverError> {
        self.aggregator_id(NodeKind::Callout, callout_id).await
    }

    pub async fn aggregator_id_for_callouts_set(
        &self,
        callouts_set_id: &str,
    ) -> Result<String, ResolverError> {
        self.aggregator_id(NodeKind::CalloutsSet, callouts_set_id)
            .await
    }

    pub async fn aggregator_id_for_collaboration(
        &self,
        collaboration_id: &str,
    ) -> Result<String, ResolverError> {
        self.aggregator_id(NodeKind::Collaboration, collaboration_id)
            .await
    }

    pub async fn aggregator_id_for_templates_set(
        &self,
        templates_set_id: &str,
    ) -> Result<String, ResolverError> {
        self.aggregator_id(NodeKind::TemplatesSet, templates_set_id)
            .await
    }

    /// A calendar stores into the aggregator of its collaboration
    pub async fn aggregator_id_for_calendar(
        &self,
        calendar_id: &str,
    ) -> Result<String, ResolverError> {
        let collaboration_id = self
            .timelines
            .collaboration_id_for_calendar(calendar_id)
            .await?;
        self.aggregator_id_for_collaboration(&collaboration_id)
            .await
    }

    pub async fn load_aggregator(
        &self,
        kind: NodeKind,
        id: &str,
    ) -> Result<StorageAggregator, ResolverError> {
        let aggregator_id = self.aggregator_id(kind, id).await?;
        let request = FetchRequest::by_id(NodeKind::StorageAggregator, aggregator_id).select_all();
        load_entity(self.walker.store().as_ref(), request).await
    }
}
