//! Node Kinds
//!
//! Every row in the relation store belongs to exactly one [`NodeKind`]. The
//! kind determines the table the row lives in and which containment edges the
//! path catalog may follow from it.
//!
//! [`KindSet`] is a small bitset used for "accepted target kinds" in a
//! resolution request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kinds of entity that participate in the ownership graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeKind {
    // Leaf content
    Document,
    Whiteboard,
    Post,
    Memo,
    Link,
    Room,
    CalendarEvent,
    Profile,

    // Grouping
    CalloutContribution,
    CalloutFraming,
    Callout,
    CalloutsSet,
    Collaboration,
    InnovationFlow,
    Timeline,
    Calendar,

    // Roots
    Space,
    SpaceAbout,
    Community,
    RoleSet,
    TemplateContentSpace,
    Template,
    TemplatesSet,
    TemplatesManager,
    InnovationPack,
    KnowledgeBase,
    VirtualContributor,
    Account,
    Platform,
    Forum,
    Discussion,

    // Cross-cutting
    StorageAggregator,
    StorageBucket,
    License,
    LicenseEntitlement,
}

impl NodeKind {
    /// All kinds, in declaration order
    pub const ALL: [NodeKind; 35] = [
        NodeKind::Document,
        NodeKind::Whiteboard,
        NodeKind::Post,
        NodeKind::Memo,
        NodeKind::Link,
        NodeKind::Room,
        NodeKind::CalendarEvent,
        NodeKind::Profile,
        NodeKind::CalloutContribution,
        NodeKind::CalloutFraming,
        NodeKind::Callout,
        NodeKind::CalloutsSet,
        NodeKind::Collaboration,
        NodeKind::InnovationFlow,
        NodeKind::Timeline,
        NodeKind::Calendar,
        NodeKind::Space,
        NodeKind::SpaceAbout,
        NodeKind::Community,
        NodeKind::RoleSet,
        NodeKind::TemplateContentSpace,
        NodeKind::Template,
        NodeKind::TemplatesSet,
        NodeKind::TemplatesManager,
        NodeKind::InnovationPack,
        NodeKind::KnowledgeBase,
        NodeKind::VirtualContributor,
        NodeKind::Account,
        NodeKind::Platform,
        NodeKind::Forum,
        NodeKind::Discussion,
        NodeKind::StorageAggregator,
        NodeKind::StorageBucket,
        NodeKind::License,
        NodeKind::LicenseEntitlement,
    ];

    /// PascalCase name, as used in logs, reports and the dev tooling
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::Whiteboard => "Whiteboard",
            NodeKind::Post => "Post",
            NodeKind::Memo => "Memo",
            NodeKind::Link => "Link",
            NodeKind::Room => "Room",
            NodeKind::CalendarEvent => "CalendarEvent",
            NodeKind::Profile => "Profile",
            NodeKind::CalloutContribution => "CalloutContribution",
            NodeKind::CalloutFraming => "CalloutFraming",
            NodeKind::Callout => "Callout",
            NodeKind::CalloutsSet => "CalloutsSet",
            NodeKind::Collaboration => "Collaboration",
            NodeKind::InnovationFlow => "InnovationFlow",
            NodeKind::Timeline => "Timeline",
            NodeKind::Calendar => "Calendar",
            NodeKind::Space => "Space",
            NodeKind::SpaceAbout => "SpaceAbout",
            NodeKind::Community => "Community",
            NodeKind::RoleSet => "RoleSet",
            NodeKind::TemplateContentSpace => "TemplateContentSpace",
            NodeKind::Template => "Template",
            NodeKind::TemplatesSet => "TemplatesSet",
            NodeKind::TemplatesManager => "TemplatesManager",
            NodeKind::InnovationPack => "InnovationPack",
            NodeKind::KnowledgeBase => "KnowledgeBase",
            NodeKind::VirtualContributor => "VirtualContributor",
            NodeKind::Account => "Account",
            NodeKind::Platform => "Platform",
            NodeKind::Forum => "Forum",
            NodeKind::Discussion => "Discussion",
            NodeKind::StorageAggregator => "StorageAggregator",
            NodeKind::StorageBucket => "StorageBucket",
            NodeKind::License => "License",
            NodeKind::LicenseEntitlement => "LicenseEntitlement",
        }
    }

    /// Relation store table holding rows of this kind
    pub fn table(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Whiteboard => "whiteboard",
            NodeKind::Post => "post",
            NodeKind::Memo => "memo",
            NodeKind::Link => "link",
            NodeKind::Room => "room",
            NodeKind::CalendarEvent => "calendar_event",
            NodeKind::Profile => "profile",
            NodeKind::CalloutContribution => "callout_contribution",
            NodeKind::CalloutFraming => "callout_framing",
            NodeKind::Callout => "callout",
            NodeKind::CalloutsSet => "callouts_set",
            NodeKind::Collaboration => "collaboration",
            NodeKind::InnovationFlow => "innovation_flow",
            NodeKind::Timeline => "timeline",
            NodeKind::Calendar => "calendar",
            NodeKind::Space => "space",
            NodeKind::SpaceAbout => "space_about",
            NodeKind::Community => "community",
            NodeKind::RoleSet => "role_set",
            NodeKind::TemplateContentSpace => "template_content_space",
            NodeKind::Template => "template",
            NodeKind::TemplatesSet => "templates_set",
            NodeKind::TemplatesManager => "templates_manager",
            NodeKind::InnovationPack => "innovation_pack",
            NodeKind::KnowledgeBase => "knowledge_base",
            NodeKind::VirtualContributor => "virtual_contributor",
            NodeKind::Account => "account",
            NodeKind::Platform => "platform",
            NodeKind::Forum => "forum",
            NodeKind::Discussion => "discussion",
            NodeKind::StorageAggregator => "storage_aggregator",
            NodeKind::StorageBucket => "storage_bucket",
            NodeKind::License => "license",
            NodeKind::LicenseEntitlement => "license_entitlement",
        }
    }

    fn bit(&self) -> u64 {
        1u64 << (*self as u8)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known kind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown node kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for NodeKind {
    type Err = UnknownKind;

    /// Accepts either the PascalCase name or the table name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed) || kind.table() == trimmed)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// A set of node kinds
///
/// Used as the "accepted target kinds" of a resolution: the walker stops at the
/// first node whose kind is a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u64);

impl KindSet {
    /// The empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// A set holding a single kind
    pub fn single(kind: NodeKind) -> Self {
        Self(kind.bit())
    }

    /// Build a set from a slice of kinds
    pub fn of(kinds: &[NodeKind]) -> Self {
        kinds.iter().fold(Self::empty(), |set, kind| set.with(*kind))
    }

    /// Return a copy of this set with `kind` added
    pub fn with(self, kind: NodeKind) -> Self {
        Self(self.0 | kind.bit())
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in declaration order
    pub fn iter(&self) -> impl Iterator<Item = NodeKind> + '_ {
        NodeKind::ALL
            .iter()
            .copied()
            .filter(move |kind| self.contains(*kind))
    }
}

impl From<NodeKind> for KindSet {
    fn from(kind: NodeKind) -> Self {
        KindSet::single(kind)
    }
}

impl FromIterator<NodeKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = NodeKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(KindSet::empty(), |set, kind| set.with(kind))
    }
}

impl fmt::Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|kind| kind.as_str()).collect();
        write!(f, "{{{}}}", names.join("|"))
    }
}

impl Serialize for KindSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for KindSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let kinds = Vec::<NodeKind>::deserialize(deserializer)?;
        Ok(kinds.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_fit_in_bitset() {
        assert!(NodeKind::ALL.len() <= 64);
        for (index, kind) in NodeKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, index, "ALL must follow declaration order");
        }
    }

    #[test]
    fn test_parse_accepts_names_and_tables() {
        assert_eq!("Whiteboard".parse::<NodeKind>(), Ok(NodeKind::Whiteboard));
        assert_eq!("callouts_set".parse::<NodeKind>(), Ok(NodeKind::CalloutsSet));
        assert_eq!("storageaggregator".parse::<NodeKind>(), Ok(NodeKind::StorageAggregator));
        assert!("Spaceship".parse::<NodeKind>().is_err());
    }

    #[test]
    fn test_tables_are_unique() {
        let mut tables: Vec<&str> = NodeKind::ALL.iter().map(|k| k.table()).collect();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), NodeKind::ALL.len());
    }

    #[test]
    fn test_kind_set_membership() {
        let set = KindSet::of(&[NodeKind::Community, NodeKind::Space]);
        assert!(set.contains(NodeKind::Community));
        assert!(set.contains(NodeKind::Space));
        assert!(!set.contains(NodeKind::Account));
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "{Space|Community}");
        assert!(KindSet::empty().is_empty());
    }

    #[test]
    fn test_kind_set_serde() {
        let set = KindSet::of(&[NodeKind::StorageBucket, NodeKind::StorageAggregator]);
        let json = serde_json::to_value(set).unwrap();
        assert_eq!(json, serde_json::json!(["StorageAggregator", "StorageBucket"]));
        let back: KindSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }
}
