//! Containment Schema
//!
//! Declares, per kind, how a node is contained:
//!
//! - `climb`: a self-referencing column followed until null before leaving
//!   the kind (nested template content spaces)
//! - `owners`: upward alternatives, in precedence order
//! - `attachments`: sideways links to aggregates the kind owns (its
//!   community, storage aggregator, license, profile, direct bucket)
//!
//! The standard [`PathCatalog`](crate::graph::PathCatalog) is the depth-first
//! expansion of this table: at every node attachments are explored first,
//! then the climb, then owners in declared order. Every maximal chain becomes
//! one `PathSpec`, and no kind appears twice in a chain.
//!
//! A kind marked `library` is held by its owners as reusable template
//! content. Once a chain has passed through a library owner, live-only
//! attachments (a Space's Community) are no longer followed: template content
//! has no community of its own.

use crate::graph::catalog::{Hop, PathSpec};
use crate::models::NodeKind;

/// A sideways link from a kind to an aggregate it owns
#[derive(Debug, Clone, Copy)]
pub struct Attachment {
    pub hop: Hop,
    /// Not followed once the chain has entered template library content
    pub live_only: bool,
}

const fn attach(hop: Hop) -> Attachment {
    Attachment {
        hop,
        live_only: false,
    }
}

const fn attach_live(hop: Hop) -> Attachment {
    Attachment {
        hop,
        live_only: true,
    }
}

/// Containment rules of one kind
#[derive(Debug, Clone, Copy)]
pub struct KindRules {
    pub kind: NodeKind,
    pub climb: Option<&'static str>,
    pub owners: &'static [Hop],
    pub attachments: &'static [Attachment],
    /// Owners hold this kind as template library content
    pub library: bool,
}

impl KindRules {
    const fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            climb: None,
            owners: &[],
            attachments: &[],
            library: false,
        }
    }

    const fn owners(mut self, owners: &'static [Hop]) -> Self {
        self.owners = owners;
        self
    }

    const fn attachments(mut self, attachments: &'static [Attachment]) -> Self {
        self.attachments = attachments;
        self
    }

    const fn climb(mut self, column: &'static str) -> Self {
        self.climb = Some(column);
        self
    }

    const fn library(mut self) -> Self {
        self.library = true;
        self
    }
}

use NodeKind as K;

const PROFILE: Attachment = attach(Hop::forward("profile_id", K::Profile));

pub static CONTAINMENT: &[KindRules] = &[
    KindRules::new(K::Document).owners(&[Hop::forward("storage_bucket_id", K::StorageBucket)]),
    KindRules::new(K::Whiteboard)
        .owners(&[
            Hop::reverse(K::CalloutContribution, "whiteboard_id"),
            Hop::reverse(K::CalloutFraming, "whiteboard_id"),
            Hop::reverse(K::Template, "whiteboard_id"),
        ])
        .attachments(&[PROFILE]),
    KindRules::new(K::Post)
        .owners(&[Hop::reverse(K::CalloutContribution, "post_id")])
        .attachments(&[PROFILE]),
    KindRules::new(K::Memo)
        .owners(&[
            Hop::reverse(K::CalloutContribution, "memo_id"),
            Hop::reverse(K::CalloutFraming, "memo_id"),
        ])
        .attachments(&[PROFILE]),
    KindRules::new(K::Link)
        .owners(&[
            Hop::reverse(K::CalloutContribution, "link_id"),
            Hop::reverse(K::CalloutFraming, "link_id"),
        ])
        .attachments(&[PROFILE]),
    KindRules::new(K::Room).owners(&[
        Hop::reverse(K::Post, "comments_id"),
        Hop::reverse(K::Callout, "comments_id"),
        Hop::reverse(K::CalendarEvent, "comments_id"),
        Hop::reverse(K::Discussion, "comments_id"),
    ]),
    KindRules::new(K::CalendarEvent)
        .owners(&[Hop::forward("calendar_id", K::Calendar)])
        .attachments(&[PROFILE]),
    KindRules::new(K::Profile).attachments(&[attach(Hop::forward(
        "storage_bucket_id",
        K::StorageBucket,
    ))]),
    KindRules::new(K::CalloutContribution).owners(&[Hop::forward("callout_id", K::Callout)]),
    KindRules::new(K::CalloutFraming)
        .owners(&[Hop::reverse(K::Callout, "framing_id")])
        .attachments(&[PROFILE]),
    KindRules::new(K::Callout)
        .owners(&[
            Hop::forward("callouts_set_id", K::CalloutsSet),
            Hop::reverse(K::Template, "callout_id"),
        ])
        .attachments(&[attach(Hop::forward("framing_id", K::CalloutFraming))]),
    KindRules::new(K::CalloutsSet).owners(&[
        Hop::reverse(K::Collaboration, "callouts_set_id"),
        Hop::reverse(K::KnowledgeBase, "callouts_set_id"),
    ]),
    KindRules::new(K::Collaboration)
        .owners(&[
            Hop::reverse(K::Space, "collaboration_id"),
            Hop::reverse(K::TemplateContentSpace, "collaboration_id"),
        ])
        .attachments(&[attach(Hop::forward("license_id", K::License))]),
    KindRules::new(K::InnovationFlow)
        .owners(&[Hop::reverse(K::Collaboration, "innovation_flow_id")])
        .attachments(&[PROFILE]),
    KindRules::new(K::Timeline).owners(&[Hop::reverse(K::Collaboration, "timeline_id")]),
    KindRules::new(K::Calendar).owners(&[Hop::reverse(K::Timeline, "calendar_id")]),
    KindRules::new(K::Space)
        .owners(&[Hop::forward("account_id", K::Account)])
        .attachments(&[
            attach_live(Hop::forward("community_id", K::Community)),
            attach(Hop::forward("storage_aggregator_id", K::StorageAggregator)),
            attach(Hop::forward("license_id", K::License)),
        ]),
    KindRules::new(K::SpaceAbout)
        .owners(&[
            Hop::reverse(K::Space, "about_id"),
            Hop::reverse(K::TemplateContentSpace, "about_id"),
        ])
        .attachments(&[PROFILE]),
    KindRules::new(K::Community).owners(&[Hop::reverse(K::Space, "community_id")]),
    KindRules::new(K::RoleSet).owners(&[Hop::reverse(K::Community, "role_set_id")]),
    KindRules::new(K::TemplateContentSpace)
        .climb("parent_space_id")
        .owners(&[Hop::reverse(K::Template, "content_space_id")]),
    KindRules::new(K::Template)
        .owners(&[Hop::forward("templates_set_id", K::TemplatesSet)])
        .attachments(&[PROFILE])
        .library(),
    KindRules::new(K::TemplatesSet).owners(&[
        Hop::reverse(K::TemplatesManager, "templates_set_id"),
        Hop::reverse(K::InnovationPack, "templates_set_id"),
    ]),
    KindRules::new(K::TemplatesManager).owners(&[
        Hop::reverse(K::Space, "templates_manager_id"),
        Hop::reverse(K::Platform, "templates_manager_id"),
    ]),
    KindRules::new(K::InnovationPack).owners(&[Hop::forward("account_id", K::Account)]),
    KindRules::new(K::KnowledgeBase)
        .owners(&[Hop::reverse(K::VirtualContributor, "knowledge_base_id")]),
    KindRules::new(K::VirtualContributor).owners(&[Hop::forward("account_id", K::Account)]),
    KindRules::new(K::Account).attachments(&[
        attach(Hop::forward("storage_aggregator_id", K::StorageAggregator)),
        attach(Hop::forward("license_id", K::License)),
    ]),
    KindRules::new(K::Platform).attachments(&[
        attach(Hop::forward("storage_aggregator_id", K::StorageAggregator)),
        attach(Hop::forward("license_id", K::License)),
    ]),
    KindRules::new(K::Forum).owners(&[Hop::reverse(K::Platform, "forum_id")]),
    KindRules::new(K::Discussion)
        .owners(&[Hop::forward("forum_id", K::Forum)])
        .attachments(&[PROFILE]),
    KindRules::new(K::StorageBucket)
        .owners(&[Hop::forward("storage_aggregator_id", K::StorageAggregator)]),
    KindRules::new(K::StorageAggregator).attachments(&[attach(Hop::forward(
        "direct_storage_id",
        K::StorageBucket,
    ))]),
    KindRules::new(K::LicenseEntitlement).owners(&[Hop::forward("license_id", K::License)]),
];

/// Rules of `kind`, if it has any
pub fn rules_for(rules: &'static [KindRules], kind: NodeKind) -> Option<&'static KindRules> {
    rules.iter().find(|r| r.kind == kind)
}

struct Expansion {
    rules: &'static [KindRules],
    leaf: NodeKind,
    hops: Vec<Hop>,
    chain: Vec<NodeKind>,
    paths: Vec<PathSpec>,
}

impl Expansion {
    /// Explore from `kind`; returns whether any branch was taken
    fn visit(&mut self, kind: NodeKind, follow_owners: bool, in_library: bool) -> bool {
        let Some(rules) = rules_for(self.rules, kind) else {
            return false;
        };
        let mut extended = false;

        for attachment in rules.attachments {
            if attachment.live_only && in_library {
                continue;
            }
            extended |= self.step(attachment.hop, false, in_library);
        }

        if !follow_owners {
            return extended;
        }

        if let Some(column) = rules.climb {
            self.hops.push(Hop::climb(kind, column));
        }
        let in_library = in_library || rules.library;
        for owner in rules.owners {
            extended |= self.step(*owner, true, in_library);
        }
        if rules.climb.is_some() {
            self.hops.pop();
        }

        extended
    }

    fn step(&mut self, hop: Hop, follow_owners: bool, in_library: bool) -> bool {
        if self.chain.contains(&hop.to) {
            return false;
        }
        self.hops.push(hop);
        self.chain.push(hop.to);

        if !self.visit(hop.to, follow_owners, in_library) {
            self.paths
                .push(PathSpec::new(self.leaf, self.hops.clone()));
        }

        self.chain.pop();
        self.hops.pop();
        true
    }
}

/// Depth-first expansion of `rules` from `leaf` into its maximal chains
pub fn expand(rules: &'static [KindRules], leaf: NodeKind) -> Vec<PathSpec> {
    let mut expansion = Expansion {
        rules,
        leaf,
        hops: Vec::new(),
        chain: vec![leaf],
        paths: Vec::new(),
    };
    expansion.visit(leaf, true, false);
    expansion.paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use crate::graph::catalog::Relation;

    #[test]
    fn test_every_kind_declared_at_most_once() {
        for kind in NodeKind::ALL {
            let count = CONTAINMENT.iter().filter(|r| r.kind == kind).count();
            assert!(count <= 1, "{kind} declared {count} times");
        }
    }

    #[test]
    fn test_climb_columns_are_self_references() {
        for rules in CONTAINMENT {
            if let Some(column) = rules.climb {
                let def = schema::table_def(rules.kind)
                    .unwrap()
                    .column(column)
                    .unwrap();
                assert_eq!(def.references, Some(rules.kind));
            }
        }
    }

    #[test]
    fn test_license_is_not_a_leaf() {
        assert!(expand(CONTAINMENT, K::License).is_empty());
    }

    #[test]
    fn test_own_profile_bucket_comes_first() {
        let paths = expand(CONTAINMENT, K::Whiteboard);
        assert_eq!(
            paths[0].hops,
            vec![
                Hop::forward("profile_id", K::Profile),
                Hop::forward("storage_bucket_id", K::StorageBucket),
            ]
        );
    }

    #[test]
    fn test_library_content_skips_community() {
        for path in expand(CONTAINMENT, K::Template) {
            assert!(
                path.hops.iter().all(|h| h.to != K::Community),
                "{} reaches a community",
                path
            );
        }
    }

    #[test]
    fn test_climb_precedes_template_owner() {
        let paths = expand(CONTAINMENT, K::TemplateContentSpace);
        let first = &paths[0];
        assert_eq!(first.hops[0].relation, Relation::Climb("parent_space_id"));
        assert_eq!(first.hops[1].to, K::Template);
    }
}
