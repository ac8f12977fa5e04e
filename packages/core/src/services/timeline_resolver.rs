//! Timeline Resolver
//!
//! Calendar → Timeline → Collaboration → Space, and event → calendar.

use crate::graph::GraphWalker;
use crate::models::NodeKind;
use crate::services::ResolverError;
use std::sync::Arc;

pub struct TimelineResolver {
    walker: Arc<GraphWalker>,
}

impl TimelineResolver {
    pub fn new(walker: Arc<GraphWalker>) -> Self {
        Self { walker }
    }

    async fn resolve_from(
        &self,
        kind: NodeKind,
        id: &str,
        target: NodeKind,
    ) -> Result<String, ResolverError> {
        self.walker
            .resolve(kind, id, target)
            .await
            .map(|resolution| resolution.node.id)
            .map_err(|e| {
                ResolverError::resolution(
                    format!("{} for {} '{}'", target.table().replace('_', " "), kind, id),
                    e,
                )
            })
    }

    pub async fn timeline_id_for_calendar(&self, calendar_id: &str) -> Result<String, ResolverError> {
        self.resolve_from(NodeKind::Calendar, calendar_id, NodeKind::Timeline)
            .await
    }

    pub async fn collaboration_id_for_calendar(
        &self,
        calendar_id: &str,
    ) -> Result<String, ResolverError> {
        self.resolve_from(NodeKind::Calendar, calendar_id, NodeKind::Collaboration)
            .await
    }

    pub async fn space_id_for_calendar(&self, calendar_id: &str) -> Result<String, ResolverError> {
        self.resolve_from(NodeKind::Calendar, calendar_id, NodeKind::Space)
            .await
    }

    pub async fn calendar_id_for_event(&self, event_id: &str) -> Result<String, ResolverError> {
        self.resolve_from(NodeKind::CalendarEvent, event_id, NodeKind::Calendar)
            .await
    }
}
