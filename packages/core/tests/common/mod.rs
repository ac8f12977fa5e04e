//! Shared fixture for integration tests
//!
//! One small platform with every ownership chain populated:
//!
//! - Account A1 with live space S1 (collaboration, callouts, timeline,
//!   community, storage, license, templates)
//! - Template content in S1's templates set, including a nested content space
//! - Virtual contributor VC1 with knowledge base KB1 under A1
//! - Innovation pack IP1 under A1
//! - The platform with its own storage, templates, forum and license
//! - An orphaned post
//!
//! Account A1 points at license L-A1, which has no row.

#![allow(dead_code)]

use ownergraph_core::db::{schema, DatabaseService, MemoryRelationStore};
use ownergraph_core::models::NodeKind::{self, *};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

pub type Row = (NodeKind, &'static str, Value);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn platform_rows() -> Vec<Row> {
    vec![
        // Account A1
        (Account, "A1", json!({"storage_aggregator_id": "SA-A1", "license_id": "L-A1"})),
        (StorageAggregator, "SA-A1", json!({"direct_storage_id": "B-A1", "aggregator_type": "account"})),
        (StorageBucket, "B-A1", json!({"storage_aggregator_id": "SA-A1"})),
        // Live space S1
        (
            Space,
            "S1",
            json!({
                "collaboration_id": "COL1",
                "about_id": "AB1",
                "community_id": "COM1",
                "storage_aggregator_id": "SA-S1",
                "license_id": "L-S1",
                "account_id": "A1",
                "templates_manager_id": "TM1",
                "level": 0
            }),
        ),
        (SpaceAbout, "AB1", json!({"profile_id": "PR-AB1"})),
        (Profile, "PR-AB1", json!({"display_name": "Space One"})),
        (Community, "COM1", json!({"role_set_id": "RS1", "profile_id": "PR-COM1"})),
        (RoleSet, "RS1", json!({"entry_role": "member"})),
        (Profile, "PR-COM1", json!({"display_name": "Space One community"})),
        (
            StorageAggregator,
            "SA-S1",
            json!({
                "parent_storage_aggregator_id": "SA-A1",
                "direct_storage_id": "B-S1",
                "aggregator_type": "space"
            }),
        ),
        (
            StorageBucket,
            "B-S1",
            json!({
                "storage_aggregator_id": "SA-S1",
                "allowed_mime_types": "image/png,application/pdf",
                "max_file_size": 5242880
            }),
        ),
        (License, "L-S1", json!({"license_type": "space"})),
        (
            LicenseEntitlement,
            "E1",
            json!({
                "license_id": "L-S1",
                "entitlement_type": "space-flag-save-as-template",
                "entitlement_limit": 1,
                "enabled": 1
            }),
        ),
        (
            LicenseEntitlement,
            "E2",
            json!({
                "license_id": "L-S1",
                "entitlement_type": "space-flag-virtual-contributor-access",
                "entitlement_limit": 0,
                "enabled": 1
            }),
        ),
        (
            LicenseEntitlement,
            "E3",
            json!({
                "license_id": "L-S1",
                "entitlement_type": "space-flag-whiteboard-multi-user",
                "entitlement_limit": 1,
                "enabled": 0
            }),
        ),
        (
            Collaboration,
            "COL1",
            json!({"callouts_set_id": "CS1", "timeline_id": "TL1", "innovation_flow_id": "IF1"}),
        ),
        (InnovationFlow, "IF1", json!({})),
        (CalloutsSet, "CS1", json!({"set_type": "collaboration"})),
        (Callout, "C1", json!({"callouts_set_id": "CS1", "framing_id": "CF1", "comments_id": "R-C1"})),
        (Room, "R-C1", json!({"display_name": "Callout comments"})),
        (CalloutFraming, "CF1", json!({"profile_id": "PR-CF1", "whiteboard_id": "W-F1"})),
        (Profile, "PR-CF1", json!({"storage_bucket_id": "B-CF1"})),
        (StorageBucket, "B-CF1", json!({"storage_aggregator_id": "SA-S1"})),
        (Whiteboard, "W-F1", json!({})),
        (CalloutContribution, "CC1", json!({"callout_id": "C1", "whiteboard_id": "W1"})),
        (Whiteboard, "W1", json!({"profile_id": "PR-W1"})),
        (Profile, "PR-W1", json!({"display_name": "Board"})),
        (CalloutContribution, "CC2", json!({"callout_id": "C1", "post_id": "P1"})),
        (Post, "P1", json!({"comments_id": "R-P1"})),
        (Room, "R-P1", json!({})),
        (CalloutContribution, "CC3", json!({"callout_id": "C1", "memo_id": "M1"})),
        (Memo, "M1", json!({})),
        (CalloutContribution, "CC4", json!({"callout_id": "C1", "link_id": "LK1"})),
        (Link, "LK1", json!({})),
        (Timeline, "TL1", json!({"calendar_id": "CAL1"})),
        (Calendar, "CAL1", json!({})),
        (CalendarEvent, "EV1", json!({"calendar_id": "CAL1", "comments_id": "R-EV1"})),
        (Room, "R-EV1", json!({})),
        (Document, "D1", json!({"storage_bucket_id": "B-S1"})),
        // Templates of S1
        (TemplatesManager, "TM1", json!({"templates_set_id": "TS1"})),
        (TemplatesSet, "TS1", json!({})),
        (
            Template,
            "T1",
            json!({"templates_set_id": "TS1", "content_space_id": "TCS1", "template_type": "space"}),
        ),
        (TemplateContentSpace, "TCS1", json!({"collaboration_id": "COL-T1"})),
        (Collaboration, "COL-T1", json!({"callouts_set_id": "CS-T1"})),
        (CalloutsSet, "CS-T1", json!({})),
        (Callout, "C-T1", json!({"callouts_set_id": "CS-T1"})),
        (
            TemplateContentSpace,
            "TCS2",
            json!({"collaboration_id": "COL-T2", "parent_space_id": "TCS1"}),
        ),
        (Collaboration, "COL-T2", json!({})),
        (Template, "T2", json!({"templates_set_id": "TS1", "callout_id": "C-T2", "template_type": "callout"})),
        (Callout, "C-T2", json!({})),
        (Template, "T3", json!({"templates_set_id": "TS1", "whiteboard_id": "W-T", "template_type": "whiteboard"})),
        (Whiteboard, "W-T", json!({})),
        // Virtual contributor knowledge base
        (VirtualContributor, "VC1", json!({"knowledge_base_id": "KB1", "account_id": "A1"})),
        (KnowledgeBase, "KB1", json!({"callouts_set_id": "CS-KB"})),
        (CalloutsSet, "CS-KB", json!({"set_type": "knowledge-base"})),
        (Callout, "C-KB", json!({"callouts_set_id": "CS-KB"})),
        // Innovation pack
        (InnovationPack, "IP1", json!({"templates_set_id": "TS-IP", "account_id": "A1"})),
        (TemplatesSet, "TS-IP", json!({})),
        // Platform
        (
            Platform,
            "PLAT",
            json!({
                "storage_aggregator_id": "SA-P",
                "templates_manager_id": "TM-P",
                "forum_id": "F1",
                "license_id": "L-P"
            }),
        ),
        (StorageAggregator, "SA-P", json!({"direct_storage_id": "B-P", "aggregator_type": "platform"})),
        (StorageBucket, "B-P", json!({"storage_aggregator_id": "SA-P"})),
        (TemplatesManager, "TM-P", json!({"templates_set_id": "TS-P"})),
        (TemplatesSet, "TS-P", json!({})),
        (Forum, "F1", json!({})),
        (Discussion, "DS1", json!({"forum_id": "F1", "comments_id": "R-DS1"})),
        (Room, "R-DS1", json!({})),
        (License, "L-P", json!({"license_type": "platform"})),
        // Aggregator no space, account or platform holds
        (StorageAggregator, "SA-LOOSE", json!({})),
        // Orphan
        (Post, "P-ORPHAN", json!({})),
    ]
}

/// (leaf kind, leaf id, target, expected owner id or None for NotFound)
pub fn expectations() -> Vec<(NodeKind, &'static str, NodeKind, Option<&'static str>)> {
    vec![
        (Whiteboard, "W1", Community, Some("COM1")),
        (Whiteboard, "W-F1", Community, Some("COM1")),
        (Whiteboard, "W-T", Community, None),
        (Post, "P1", Callout, Some("C1")),
        (Post, "P-ORPHAN", Callout, None),
        (Memo, "M1", Space, Some("S1")),
        (Room, "R-P1", Space, Some("S1")),
        (Room, "R-C1", Community, Some("COM1")),
        (Room, "R-EV1", Space, Some("S1")),
        (Room, "R-DS1", Platform, Some("PLAT")),
        (CalendarEvent, "EV1", Community, Some("COM1")),
        (Calendar, "CAL1", Timeline, Some("TL1")),
        (Callout, "C-T1", Template, Some("T1")),
        (Callout, "C-T1", Community, None),
        (Collaboration, "COL-T2", Template, Some("T1")),
        (Callout, "C-T2", StorageAggregator, Some("SA-S1")),
        (CalloutsSet, "CS1", StorageAggregator, Some("SA-S1")),
        (CalloutsSet, "CS-KB", StorageAggregator, Some("SA-A1")),
        (TemplatesSet, "TS-IP", StorageAggregator, Some("SA-A1")),
        (TemplatesSet, "TS-P", StorageAggregator, Some("SA-P")),
        (Document, "D1", StorageAggregator, Some("SA-S1")),
        (Whiteboard, "W1", StorageBucket, Some("B-CF1")),
        (Account, "A1", StorageBucket, Some("B-A1")),
        (Space, "S1", License, Some("L-S1")),
        (SpaceAbout, "AB1", Space, Some("S1")),
        (Link, "LK1", Callout, Some("C1")),
        (Profile, "PR-CF1", StorageBucket, Some("B-CF1")),
        (CalloutContribution, "CC2", Space, Some("S1")),
        (CalloutFraming, "CF1", Collaboration, Some("COL1")),
        (InnovationFlow, "IF1", Community, Some("COM1")),
        (Timeline, "TL1", Space, Some("S1")),
        (Community, "COM1", Account, Some("A1")),
        (RoleSet, "RS1", Space, Some("S1")),
        (TemplateContentSpace, "TCS2", Template, Some("T1")),
        (Template, "T3", TemplatesManager, Some("TM1")),
        (TemplatesManager, "TM-P", Platform, Some("PLAT")),
        (InnovationPack, "IP1", StorageAggregator, Some("SA-A1")),
        (KnowledgeBase, "KB1", Account, Some("A1")),
        (VirtualContributor, "VC1", StorageAggregator, Some("SA-A1")),
        (Platform, "PLAT", License, Some("L-P")),
        (Forum, "F1", StorageAggregator, Some("SA-P")),
        (Discussion, "DS1", Platform, Some("PLAT")),
        (StorageAggregator, "SA-S1", StorageBucket, Some("B-S1")),
        (StorageBucket, "B-CF1", StorageAggregator, Some("SA-S1")),
        (LicenseEntitlement, "E1", License, Some("L-S1")),
        // Dangling license link on A1
        (Account, "A1", License, None),
        (VirtualContributor, "VC1", License, None),
    ]
}

pub fn seed_memory(rows: &[Row]) -> MemoryRelationStore {
    let mut store = MemoryRelationStore::new();
    for (kind, id, fields) in rows {
        store
            .insert(*kind, *id, fields.clone())
            .unwrap_or_else(|e| panic!("bad fixture row {kind} {id}: {e}"));
    }
    store
}

fn to_sql(value: &Value) -> libsql::Value {
    match value {
        Value::Null => libsql::Value::Null,
        Value::Bool(b) => libsql::Value::Integer(i64::from(*b)),
        Value::Number(n) => libsql::Value::Integer(n.as_i64().expect("integer fixture value")),
        Value::String(s) => libsql::Value::Text(s.clone()),
        other => panic!("unsupported fixture value {other}"),
    }
}

/// Fresh libsql database under a temp dir, seeded with `rows`
///
/// Returns (db, temp_dir); the temp dir must outlive the database.
pub async fn seed_libsql(rows: &[Row]) -> (Arc<DatabaseService>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Arc::new(
        DatabaseService::new(temp_dir.path().join("graph.db"))
            .await
            .unwrap(),
    );
    let conn = db.connect_with_timeout().await.unwrap();

    for (kind, id, fields) in rows {
        let object = fields.as_object().cloned().unwrap_or_default();
        let mut columns = vec!["id".to_string()];
        let mut values = vec![libsql::Value::Text(id.to_string())];
        for (column, value) in &object {
            schema::require_column(*kind, column).unwrap();
            columns.push(column.clone());
            values.push(to_sql(value));
        }
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            kind.table(),
            columns.join(", "),
            placeholders.join(", ")
        );
        conn.execute(&sql, libsql::params::Params::Positional(values))
            .await
            .unwrap_or_else(|e| panic!("failed to insert {kind} {id}: {e}"));
    }

    (db, temp_dir)
}
