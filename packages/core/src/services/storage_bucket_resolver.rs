//! Storage Bucket Resolver
//!
//! Same shape as the aggregator resolver, one level lower: the concrete
//! bucket an upload lands in. A content entity's own profile bucket comes
//! first; otherwise the direct bucket of the owning aggregator is used.
//! Every lookup is a parameterized catalog hop.

use crate::db::FetchRequest;
use crate::graph::GraphWalker;
use crate::models::{NodeKind, StorageBucket};
use crate::services::load::load_entity;
use crate::services::ResolverError;
use std::sync::Arc;

pub struct StorageBucketResolver {
    walker: Arc<GraphWalker>,
}

impl StorageBucketResolver {
    pub fn new(walker: Arc<GraphWalker>) -> Self {
        Self { walker }
    }

    pub async fn bucket_id(&self, kind: NodeKind, id: &str) -> Result<String, ResolverError> {
        self.walker
            .resolve(kind, id, NodeKind::StorageBucket)
            .await
            .map(|resolution| resolution.node.id)
            .map_err(|e| {
                ResolverError::resolution(format!("storage bucket for {} '{}'", kind, id), e)
            })
    }

    pub async fn bucket_id_for_document(&self, document_id: &str) -> Result<String, ResolverError> {
        self.bucket_id(NodeKind::Document, document_id).await
    }

    pub async fn bucket_id_for_profile(&self, profile_id: &str) -> Result<String, ResolverError> {
        self.bucket_id(NodeKind::Profile, profile_id).await
    }

    pub async fn bucket_id_for_callout(&self, callout_id: &str) -> Result<String, ResolverError> {
        self.bucket_id(NodeKind::Callout, callout_id).await
    }

    pub async fn bucket_id_for_templates_set(
        &self,
        templates_set_id: &str,
    ) -> Result<String, ResolverError> {
        self.bucket_id(NodeKind::TemplatesSet, templates_set_id)
            .await
    }

    pub async fn bucket_id_for_account(&self, account_id: &str) -> Result<String, ResolverError> {
        self.bucket_id(NodeKind::Account, account_id).await
    }

    pub async fn load_bucket(
        &self,
        kind: NodeKind,
        id: &str,
    ) -> Result<StorageBucket, ResolverError> {
        let bucket_id = self.bucket_id(kind, id).await?;
        let request = FetchRequest::by_id(NodeKind::StorageBucket, bucket_id).select_all();
        load_entity(self.walker.store().as_ref(), request).await
    }
}
