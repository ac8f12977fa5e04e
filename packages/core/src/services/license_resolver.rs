//! License Resolver
//!
//! Resolves the license governing an entity and answers entitlement
//! questions against it. Entitlement rows are eager-loaded with the license.

use crate::db::{FetchRequest, Join, JoinLink};
use crate::graph::GraphWalker;
use crate::models::{License, LicenseEntitlement, NodeKind};
use crate::services::load::load_entity;
use crate::services::ResolverError;
use std::sync::Arc;

/// Relations loaded with a license
pub const LICENSE_JOINS: &[Join] = &[Join {
    name: "entitlements",
    kind: NodeKind::LicenseEntitlement,
    link: JoinLink::Inverse("license_id"),
    nested: &[],
}];

pub struct LicenseResolver {
    walker: Arc<GraphWalker>,
}

impl LicenseResolver {
    pub fn new(walker: Arc<GraphWalker>) -> Self {
        Self { walker }
    }

    /// Id of the license governing `kind` `id`
    ///
    /// A license id is returned as is; licenses have no owner paths.
    pub async fn license_id(&self, kind: NodeKind, id: &str) -> Result<String, ResolverError> {
        if kind == NodeKind::License {
            return Ok(id.to_string());
        }
        self.walker
            .resolve(kind, id, NodeKind::License)
            .await
            .map(|resolution| resolution.node.id)
            .map_err(|e| ResolverError::resolution(format!("license for {} '{}'", kind, id), e))
    }

    /// The governing license with its entitlements
    pub async fn load_license(&self, kind: NodeKind, id: &str) -> Result<License, ResolverError> {
        let license_id = self.license_id(kind, id).await?;
        let request = FetchRequest::by_id(NodeKind::License, license_id)
            .select_all()
            .with_joins(LICENSE_JOINS);
        load_entity(self.walker.store().as_ref(), request).await
    }

    pub async fn entitlement(
        &self,
        kind: NodeKind,
        id: &str,
        entitlement_type: &str,
    ) -> Result<Option<LicenseEntitlement>, ResolverError> {
        let license = self.load_license(kind, id).await?;
        Ok(license.entitlement(entitlement_type).cloned())
    }

    /// Whether the entitlement is present, enabled and has a positive limit
    pub async fn is_entitled(
        &self,
        kind: NodeKind,
        id: &str,
        entitlement_type: &str,
    ) -> Result<bool, ResolverError> {
        let entitlement = self.entitlement(kind, id, entitlement_type).await?;
        Ok(entitlement.is_some_and(|e| e.is_granted()))
    }
}
