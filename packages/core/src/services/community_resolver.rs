//! Community Resolver
//!
//! Resolves content to the Community (or Space) it lives in. Used before
//! permission checks and to compute notification recipients.

use crate::db::{FetchRequest, Join, JoinLink};
use crate::graph::GraphWalker;
use crate::models::{Community, EntityRef, KindSet, NodeKind};
use crate::services::load::load_entity;
use crate::services::ResolverError;
use std::sync::Arc;

/// Relations loaded with a community
pub const COMMUNITY_JOINS: &[Join] = &[
    Join {
        name: "role_set",
        kind: NodeKind::RoleSet,
        link: JoinLink::Column("role_set_id"),
        nested: &[],
    },
    Join {
        name: "profile",
        kind: NodeKind::Profile,
        link: JoinLink::Column("profile_id"),
        nested: &[],
    },
];

pub struct CommunityResolver {
    walker: Arc<GraphWalker>,
}

impl CommunityResolver {
    pub fn new(walker: Arc<GraphWalker>) -> Self {
        Self { walker }
    }

    /// Id of the community owning `kind` `id`
    pub async fn community_id(&self, kind: NodeKind, id: &str) -> Result<String, ResolverError> {
        self.walker
            .resolve(kind, id, NodeKind::Community)
            .await
            .map(|resolution| resolution.node.id)
            .map_err(|e| ResolverError::resolution(format!("community for {} '{}'", kind, id), e))
    }

    /// Id of the space owning `kind` `id`
    pub async fn space_id(&self, kind: NodeKind, id: &str) -> Result<String, ResolverError> {
        self.walker
            .resolve(kind, id, NodeKind::Space)
            .await
            .map(|resolution| resolution.node.id)
            .map_err(|e| ResolverError::resolution(format!("space for {} '{}'", kind, id), e))
    }

    /// Nearest Community or Space above `kind` `id`
    pub async fn community_or_space(
        &self,
        kind: NodeKind,
        id: &str,
    ) -> Result<EntityRef, ResolverError> {
        self.walker
            .resolve(kind, id, KindSet::of(&[NodeKind::Community, NodeKind::Space]))
            .await
            .map(|resolution| resolution.node)
            .map_err(|e| {
                ResolverError::resolution(format!("community or space for {} '{}'", kind, id), e)
            })
    }

    pub async fn community_id_for_callout(&self, callout_id: &str) -> Result<String, ResolverError> {
        self.community_id(NodeKind::Callout, callout_id).await
    }

    pub async fn community_id_for_whiteboard(
        &self,
        whiteboard_id: &str,
    ) -> Result<String, ResolverError> {
        self.community_id(NodeKind::Whiteboard, whiteboard_id).await
    }

    pub async fn community_id_for_post(&self, post_id: &str) -> Result<String, ResolverError> {
        self.community_id(NodeKind::Post, post_id).await
    }

    pub async fn community_id_for_memo(&self, memo_id: &str) -> Result<String, ResolverError> {
        self.community_id(NodeKind::Memo, memo_id).await
    }

    pub async fn community_id_for_calendar_event(
        &self,
        event_id: &str,
    ) -> Result<String, ResolverError> {
        self.community_id(NodeKind::CalendarEvent, event_id).await
    }

    /// The owning community with its role set and profile loaded
    pub async fn load_community(
        &self,
        kind: NodeKind,
        id: &str,
    ) -> Result<Community, ResolverError> {
        let community_id = self.community_id(kind, id).await?;
        let request = FetchRequest::by_id(NodeKind::Community, community_id)
            .select_all()
            .with_joins(COMMUNITY_JOINS);
        load_entity(self.walker.store().as_ref(), request).await
    }
}
