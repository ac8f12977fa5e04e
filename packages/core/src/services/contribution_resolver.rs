//! Contribution Resolver

use crate::graph::GraphWalker;
use crate::models::NodeKind;
use crate::services::ResolverError;
use std::sync::Arc;

pub struct ContributionResolver {
    walker: Arc<GraphWalker>,
}

impl ContributionResolver {
    pub fn new(walker: Arc<GraphWalker>) -> Self {
        Self { walker }
    }

    pub async fn contribution_id_for_post(&self, post_id: &str) -> Result<String, ResolverError> {
        self.walker
            .resolve(NodeKind::Post, post_id, NodeKind::CalloutContribution)
            .await
            .map(|resolution| resolution.node.id)
            .map_err(|e| {
                ResolverError::resolution(format!("contribution for Post '{}'", post_id), e)
            })
    }

    pub async fn callout_id_for_post(&self, post_id: &str) -> Result<String, ResolverError> {
        self.callout_id_for(NodeKind::Post, post_id).await
    }

    /// Callout holding `kind` `id` as a contribution or in its framing
    pub async fn callout_id_for(&self, kind: NodeKind, id: &str) -> Result<String, ResolverError> {
        self.walker
            .resolve(kind, id, NodeKind::Callout)
            .await
            .map(|resolution| resolution.node.id)
            .map_err(|e| ResolverError::resolution(format!("callout for {} '{}'", kind, id), e))
    }
}
