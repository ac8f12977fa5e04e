//! Resolver Facade Tests
//!
//! Exercises the domain facades (community, storage, timeline, contribution,
//! license) over the shared platform fixture held in memory.
//!
//! ## Test Coverage
//! - Id resolution for each facade operation
//! - Calendar aggregator delegation through the timeline resolver
//! - Eager "load with relations" aggregates
//! - Failure reasons surviving the facade boundary

mod common;

#[cfg(test)]
mod resolver_facade_tests {
    use super::common;
    use anyhow::Result;
    use ownergraph_core::db::RelationStore;
    use ownergraph_core::models::{EntityRef, NodeKind};
    use ownergraph_core::{
        CommunityResolver, ContributionResolver, FailureReason, GraphWalker, LicenseResolver,
        ResolverError, StorageAggregatorResolver, StorageBucketResolver, TimelineResolver,
    };
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn walker() -> Arc<GraphWalker> {
        common::init_tracing();
        let store: Arc<dyn RelationStore> = Arc::new(common::seed_memory(&common::platform_rows()));
        Arc::new(GraphWalker::new(store))
    }

    #[tokio::test]
    async fn test_standard_catalog_answers_fixture_expectations() -> Result<()> {
        let walker = walker();
        for (kind, id, target, expected) in common::expectations() {
            let result = walker.resolve(kind, id, target).await;
            match expected {
                Some(owner) => {
                    let resolution = result
                        .unwrap_or_else(|e| panic!("{kind} {id} -> {target}: {e}"));
                    assert_eq!(resolution.node, EntityRef::new(target, owner), "{kind} {id}");
                }
                None => {
                    let err = result.expect_err("expected no owner");
                    assert_eq!(err.reason(), FailureReason::NotFound, "{kind} {id}");
                }
            }
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_community_resolver() -> Result<()> {
        let communities = CommunityResolver::new(walker());

        assert_eq!(communities.community_id_for_whiteboard("W1").await?, "COM1");
        assert_eq!(communities.community_id_for_post("P1").await?, "COM1");
        assert_eq!(communities.community_id_for_memo("M1").await?, "COM1");
        assert_eq!(communities.community_id_for_callout("C1").await?, "COM1");
        assert_eq!(communities.community_id_for_calendar_event("EV1").await?, "COM1");
        assert_eq!(communities.space_id(NodeKind::Whiteboard, "W1").await?, "S1");

        // Space is closer than Community on the way up from a collaboration
        let nearest = communities
            .community_or_space(NodeKind::Collaboration, "COL1")
            .await?;
        assert_eq!(nearest, EntityRef::new(NodeKind::Space, "S1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_template_content_has_no_community() -> Result<()> {
        let communities = CommunityResolver::new(walker());

        let err = assert_err!(communities.community_id_for_callout("C-T1").await);
        assert!(err.is_not_found());
        assert_eq!(err.reason(), Some(FailureReason::NotFound));
        let message = err.to_string();
        assert!(message.contains("community for Callout 'C-T1'"), "{message}");
        Ok(())
    }

    #[tokio::test]
    async fn test_load_community_with_relations() -> Result<()> {
        let communities = CommunityResolver::new(walker());

        let community = communities
            .load_community(NodeKind::Whiteboard, "W1")
            .await?;
        assert_eq!(community.id, "COM1");
        let role_set = community.role_set.expect("role set loaded");
        assert_eq!(role_set.id, "RS1");
        assert_eq!(role_set.entry_role.as_deref(), Some("member"));
        let profile = community.profile.expect("profile loaded");
        assert_eq!(profile.display_name.as_deref(), Some("Space One community"));
        Ok(())
    }

    #[tokio::test]
    async fn test_storage_aggregator_resolver() -> Result<()> {
        let aggregators = StorageAggregatorResolver::new(walker());

        let live = aggregators.resolve(NodeKind::Callout, "C1").await?;
        assert_eq!(live.aggregator_id, "SA-S1");
        assert_eq!(live.owner, EntityRef::new(NodeKind::Space, "S1"));

        let knowledge_base = aggregators.resolve(NodeKind::CalloutsSet, "CS-KB").await?;
        assert_eq!(knowledge_base.aggregator_id, "SA-A1");
        assert_eq!(knowledge_base.owner, EntityRef::new(NodeKind::Account, "A1"));

        let platform = aggregators.resolve(NodeKind::TemplatesSet, "TS-P").await?;
        assert_eq!(platform.owner, EntityRef::new(NodeKind::Platform, "PLAT"));

        // Reached through a bucket: the holder is looked up, not the bucket
        let document = aggregators.resolve(NodeKind::Document, "D1").await?;
        assert_eq!(document.aggregator_id, "SA-S1");
        assert_eq!(document.owner, EntityRef::new(NodeKind::Space, "S1"));

        let bucket = aggregators.resolve(NodeKind::StorageBucket, "B-A1").await?;
        assert_eq!(bucket.owner, EntityRef::new(NodeKind::Account, "A1"));

        // Leaf is already an aggregator
        let itself = aggregators
            .resolve(NodeKind::StorageAggregator, "SA-P")
            .await?;
        assert_eq!(itself.owner, EntityRef::new(NodeKind::Platform, "PLAT"));

        let loose = aggregators
            .resolve(NodeKind::StorageAggregator, "SA-LOOSE")
            .await?;
        assert_eq!(loose.owner, EntityRef::new(NodeKind::StorageAggregator, "SA-LOOSE"));

        assert_eq!(aggregators.aggregator_id_for_callouts_set("CS1").await?, "SA-S1");
        assert_eq!(aggregators.aggregator_id_for_collaboration("COL1").await?, "SA-S1");
        assert_eq!(aggregators.aggregator_id_for_templates_set("TS-IP").await?, "SA-A1");
        assert_eq!(aggregators.aggregator_id_for_callout("C-KB").await?, "SA-A1");
        Ok(())
    }

    #[tokio::test]
    async fn test_calendar_aggregator_goes_through_collaboration() -> Result<()> {
        let walker = walker();
        let aggregators = StorageAggregatorResolver::new(Arc::clone(&walker));
        let timelines = TimelineResolver::new(walker);

        let via_collaboration = timelines.collaboration_id_for_calendar("CAL1").await?;
        assert_eq!(via_collaboration, "COL1");
        assert_eq!(aggregators.aggregator_id_for_calendar("CAL1").await?, "SA-S1");

        let err = assert_err!(aggregators.aggregator_id_for_calendar("CAL-MISSING").await);
        assert!(err.is_not_found());
        assert!(err.to_string().contains("collaboration for Calendar"), "{err}");
        Ok(())
    }

    #[tokio::test]
    async fn test_load_aggregator() -> Result<()> {
        let aggregators = StorageAggregatorResolver::new(walker());

        let aggregator = aggregators.load_aggregator(NodeKind::Callout, "C1").await?;
        assert_eq!(aggregator.id, "SA-S1");
        assert_eq!(aggregator.parent_storage_aggregator_id.as_deref(), Some("SA-A1"));
        assert_eq!(aggregator.direct_storage_id.as_deref(), Some("B-S1"));
        assert_eq!(aggregator.aggregator_type.as_deref(), Some("space"));
        Ok(())
    }

    #[tokio::test]
    async fn test_storage_bucket_resolver() -> Result<()> {
        let buckets = StorageBucketResolver::new(walker());

        assert_eq!(buckets.bucket_id_for_document("D1").await?, "B-S1");
        assert_eq!(buckets.bucket_id_for_profile("PR-CF1").await?, "B-CF1");
        assert_eq!(buckets.bucket_id_for_callout("C1").await?, "B-CF1");
        assert_eq!(buckets.bucket_id_for_templates_set("TS1").await?, "B-S1");
        assert_eq!(buckets.bucket_id_for_account("A1").await?, "B-A1");

        let bucket = buckets.load_bucket(NodeKind::Document, "D1").await?;
        assert!(bucket.accepts("image/png", 1024));
        assert!(!bucket.accepts("video/mp4", 1024));
        assert!(!bucket.accepts("application/pdf", 10 * 1024 * 1024));
        Ok(())
    }

    #[tokio::test]
    async fn test_timeline_resolver() -> Result<()> {
        let timelines = TimelineResolver::new(walker());

        assert_eq!(timelines.timeline_id_for_calendar("CAL1").await?, "TL1");
        assert_eq!(timelines.collaboration_id_for_calendar("CAL1").await?, "COL1");
        assert_eq!(timelines.space_id_for_calendar("CAL1").await?, "S1");
        assert_eq!(timelines.calendar_id_for_event("EV1").await?, "CAL1");
        Ok(())
    }

    #[tokio::test]
    async fn test_contribution_resolver() -> Result<()> {
        let contributions = ContributionResolver::new(walker());

        assert_eq!(contributions.contribution_id_for_post("P1").await?, "CC2");
        assert_eq!(contributions.callout_id_for_post("P1").await?, "C1");
        assert_eq!(contributions.callout_id_for(NodeKind::Memo, "M1").await?, "C1");
        assert_eq!(
            contributions
                .callout_id_for(NodeKind::Whiteboard, "W-F1")
                .await?,
            "C1"
        );

        let err = assert_err!(contributions.callout_id_for_post("P-ORPHAN").await);
        match &err {
            ResolverError::Resolution { source, .. } => {
                assert_eq!(
                    source.attempted(),
                    ["Post > CalloutContribution > Callout".to_string()]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_license_resolver() -> Result<()> {
        let licenses = LicenseResolver::new(walker());

        assert_eq!(licenses.license_id(NodeKind::Space, "S1").await?, "L-S1");
        // Collaboration has no license of its own; the space's applies
        assert_eq!(licenses.license_id(NodeKind::Callout, "C1").await?, "L-S1");
        assert_eq!(licenses.license_id(NodeKind::Platform, "PLAT").await?, "L-P");
        assert_eq!(licenses.license_id(NodeKind::License, "L-P").await?, "L-P");

        let license = licenses.load_license(NodeKind::Space, "S1").await?;
        assert_eq!(license.license_type.as_deref(), Some("space"));
        assert_eq!(license.entitlements.len(), 3);

        assert!(licenses
            .is_entitled(NodeKind::Space, "S1", "space-flag-save-as-template")
            .await?);
        // Zero limit
        assert!(!licenses
            .is_entitled(NodeKind::Space, "S1", "space-flag-virtual-contributor-access")
            .await?);
        // Disabled
        assert!(!licenses
            .is_entitled(NodeKind::Space, "S1", "space-flag-whiteboard-multi-user")
            .await?);
        assert!(!licenses
            .is_entitled(NodeKind::Space, "S1", "space-flag-unknown")
            .await?);

        let entitlement = licenses
            .entitlement(NodeKind::Callout, "C1", "space-flag-save-as-template")
            .await?
            .expect("entitlement present");
        assert_eq!(entitlement.id, "E1");
        Ok(())
    }

    #[tokio::test]
    async fn test_dangling_license_reference() -> Result<()> {
        let licenses = LicenseResolver::new(walker());

        // A1 points at L-A1, which has no row
        let err = assert_err!(licenses.license_id(NodeKind::Account, "A1").await);
        match &err {
            ResolverError::Resolution { source, .. } => {
                assert_eq!(source.reason(), FailureReason::NotFound);
                assert_eq!(source.attempted(), ["Account > License".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = assert_err!(licenses.load_license(NodeKind::Account, "A1").await);
        assert!(err.is_not_found(), "{err}");
        assert!(!matches!(err, ResolverError::EntityNotLoaded { .. }));

        // Content of the space still reaches the space's license
        assert_eq!(assert_ok!(licenses.license_id(NodeKind::Whiteboard, "W1").await), "L-S1");
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_reasons_survive_facades() -> Result<()> {
        let communities = CommunityResolver::new(walker());
        let err = assert_err!(communities.community_id(NodeKind::License, "L-S1").await);
        assert_eq!(err.reason(), Some(FailureReason::UnsupportedLeafKind));

        let store: Arc<dyn RelationStore> = Arc::new(
            common::seed_memory(&common::platform_rows()).with_unavailable(NodeKind::Callout),
        );
        let communities = CommunityResolver::new(Arc::new(GraphWalker::new(store)));
        let err = assert_err!(communities.community_id_for_whiteboard("W1").await);
        assert_eq!(err.reason(), Some(FailureReason::StoreUnavailable));
        assert!(!err.is_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn test_facades_share_one_walker() -> Result<()> {
        let store = Arc::new(common::seed_memory(&common::platform_rows()));
        let dyn_store: Arc<dyn RelationStore> = store.clone();
        let walker = Arc::new(GraphWalker::new(dyn_store));

        let communities = CommunityResolver::new(Arc::clone(&walker));
        let buckets = StorageBucketResolver::new(Arc::clone(&walker));
        let (community, bucket) = tokio::join!(
            communities.community_id_for_whiteboard("W1"),
            buckets.bucket_id_for_document("D1")
        );
        assert_eq!(community?, "COM1");
        assert_eq!(bucket?, "B-S1");
        assert!(store.lookups() > 0);
        Ok(())
    }
}
