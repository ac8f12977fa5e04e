//! Relation Schema
//!
//! Static table definitions for every [`NodeKind`]. Each table is keyed by
//! `id TEXT PRIMARY KEY`; every foreign key is a nullable TEXT column.
//! References are not enforced by the database: a dangling or missing link is
//! a dead end for the walker, not a constraint violation.
//!
//! These definitions are the only source of SQL identifiers in the crate.
//! Stores reject any column that is not listed here, so caller-supplied
//! strings can only ever reach SQL as bound parameters.

use crate::db::DatabaseError;
use crate::models::NodeKind;

/// SQLite storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
}

impl ColumnType {
    fn sql(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
        }
    }
}

/// One non-key column of a table
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    /// Kind referenced when the column is a foreign key
    pub references: Option<NodeKind>,
}

const fn fk(name: &'static str, references: NodeKind) -> ColumnDef {
    ColumnDef {
        name,
        ty: ColumnType::Text,
        references: Some(references),
    }
}

const fn text(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        ty: ColumnType::Text,
        references: None,
    }
}

const fn integer(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        ty: ColumnType::Integer,
        references: None,
    }
}

/// Table of one kind
#[derive(Debug)]
pub struct TableDef {
    pub kind: NodeKind,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    pub fn table(&self) -> &'static str {
        self.kind.table()
    }

    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        name == "id" || self.column(name).is_some()
    }

    /// Column names excluding `id`
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table
    pub fn create_statement(&self) -> String {
        let mut columns = vec!["id TEXT PRIMARY KEY".to_string()];
        columns.extend(
            self.columns
                .iter()
                .map(|c| format!("{} {}", c.name, c.ty.sql())),
        );
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table(),
            columns.join(", ")
        )
    }

    /// One index per foreign key column, so reverse hops are point lookups
    pub fn index_statements(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.references.is_some())
            .map(|c| {
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table}({column})",
                    table = self.table(),
                    column = c.name
                )
            })
            .collect()
    }
}

use NodeKind as K;

/// All tables, one per kind
pub static TABLES: &[TableDef] = &[
    TableDef {
        kind: K::Document,
        columns: &[fk("storage_bucket_id", K::StorageBucket)],
    },
    TableDef {
        kind: K::Whiteboard,
        columns: &[fk("profile_id", K::Profile)],
    },
    TableDef {
        kind: K::Post,
        columns: &[fk("profile_id", K::Profile), fk("comments_id", K::Room)],
    },
    TableDef {
        kind: K::Memo,
        columns: &[fk("profile_id", K::Profile)],
    },
    TableDef {
        kind: K::Link,
        columns: &[fk("profile_id", K::Profile)],
    },
    TableDef {
        kind: K::Room,
        columns: &[text("display_name")],
    },
    TableDef {
        kind: K::CalendarEvent,
        columns: &[
            fk("calendar_id", K::Calendar),
            fk("profile_id", K::Profile),
            fk("comments_id", K::Room),
        ],
    },
    TableDef {
        kind: K::Profile,
        columns: &[
            text("display_name"),
            fk("storage_bucket_id", K::StorageBucket),
        ],
    },
    TableDef {
        kind: K::CalloutContribution,
        columns: &[
            fk("callout_id", K::Callout),
            fk("whiteboard_id", K::Whiteboard),
            fk("post_id", K::Post),
            fk("memo_id", K::Memo),
            fk("link_id", K::Link),
        ],
    },
    TableDef {
        kind: K::CalloutFraming,
        columns: &[
            fk("profile_id", K::Profile),
            fk("whiteboard_id", K::Whiteboard),
            fk("memo_id", K::Memo),
            fk("link_id", K::Link),
        ],
    },
    TableDef {
        kind: K::Callout,
        columns: &[
            fk("framing_id", K::CalloutFraming),
            fk("callouts_set_id", K::CalloutsSet),
            fk("comments_id", K::Room),
        ],
    },
    TableDef {
        kind: K::CalloutsSet,
        columns: &[text("set_type")],
    },
    TableDef {
        kind: K::Collaboration,
        columns: &[
            fk("callouts_set_id", K::CalloutsSet),
            fk("timeline_id", K::Timeline),
            fk("innovation_flow_id", K::InnovationFlow),
            fk("license_id", K::License),
        ],
    },
    TableDef {
        kind: K::InnovationFlow,
        columns: &[fk("profile_id", K::Profile)],
    },
    TableDef {
        kind: K::Timeline,
        columns: &[fk("calendar_id", K::Calendar)],
    },
    TableDef {
        kind: K::Calendar,
        columns: &[],
    },
    TableDef {
        kind: K::Space,
        columns: &[
            fk("collaboration_id", K::Collaboration),
            fk("about_id", K::SpaceAbout),
            fk("community_id", K::Community),
            fk("storage_aggregator_id", K::StorageAggregator),
            fk("license_id", K::License),
            fk("account_id", K::Account),
            fk("templates_manager_id", K::TemplatesManager),
            integer("level"),
        ],
    },
    TableDef {
        kind: K::SpaceAbout,
        columns: &[fk("profile_id", K::Profile)],
    },
    TableDef {
        kind: K::Community,
        columns: &[fk("role_set_id", K::RoleSet), fk("profile_id", K::Profile)],
    },
    TableDef {
        kind: K::RoleSet,
        columns: &[text("entry_role")],
    },
    TableDef {
        kind: K::TemplateContentSpace,
        columns: &[
            fk("collaboration_id", K::Collaboration),
            fk("about_id", K::SpaceAbout),
            fk("parent_space_id", K::TemplateContentSpace),
        ],
    },
    TableDef {
        kind: K::Template,
        columns: &[
            fk("templates_set_id", K::TemplatesSet),
            fk("content_space_id", K::TemplateContentSpace),
            fk("callout_id", K::Callout),
            fk("whiteboard_id", K::Whiteboard),
            fk("profile_id", K::Profile),
            text("template_type"),
        ],
    },
    TableDef {
        kind: K::TemplatesSet,
        columns: &[],
    },
    TableDef {
        kind: K::TemplatesManager,
        columns: &[fk("templates_set_id", K::TemplatesSet)],
    },
    TableDef {
        kind: K::InnovationPack,
        columns: &[
            fk("templates_set_id", K::TemplatesSet),
            fk("account_id", K::Account),
            fk("profile_id", K::Profile),
        ],
    },
    TableDef {
        kind: K::KnowledgeBase,
        columns: &[
            fk("callouts_set_id", K::CalloutsSet),
            fk("profile_id", K::Profile),
        ],
    },
    TableDef {
        kind: K::VirtualContributor,
        columns: &[
            fk("knowledge_base_id", K::KnowledgeBase),
            fk("account_id", K::Account),
        ],
    },
    TableDef {
        kind: K::Account,
        columns: &[
            fk("storage_aggregator_id", K::StorageAggregator),
            fk("license_id", K::License),
        ],
    },
    TableDef {
        kind: K::Platform,
        columns: &[
            fk("storage_aggregator_id", K::StorageAggregator),
            fk("templates_manager_id", K::TemplatesManager),
            fk("forum_id", K::Forum),
            fk("license_id", K::License),
        ],
    },
    TableDef {
        kind: K::Forum,
        columns: &[],
    },
    TableDef {
        kind: K::Discussion,
        columns: &[
            fk("forum_id", K::Forum),
            fk("comments_id", K::Room),
            fk("profile_id", K::Profile),
        ],
    },
    TableDef {
        kind: K::StorageAggregator,
        columns: &[
            fk("parent_storage_aggregator_id", K::StorageAggregator),
            fk("direct_storage_id", K::StorageBucket),
            text("aggregator_type"),
        ],
    },
    TableDef {
        kind: K::StorageBucket,
        columns: &[
            fk("storage_aggregator_id", K::StorageAggregator),
            text("allowed_mime_types"),
            integer("max_file_size"),
        ],
    },
    TableDef {
        kind: K::License,
        columns: &[text("license_type")],
    },
    TableDef {
        kind: K::LicenseEntitlement,
        columns: &[
            fk("license_id", K::License),
            text("entitlement_type"),
            integer("entitlement_limit"),
            integer("enabled"),
        ],
    },
];

/// Table definition of `kind`
pub fn table_def(kind: NodeKind) -> Result<&'static TableDef, DatabaseError> {
    TABLES
        .iter()
        .find(|t| t.kind == kind)
        .ok_or(DatabaseError::UnknownTable(kind))
}

/// Fail unless `column` exists on `kind`'s table
pub fn require_column(kind: NodeKind, column: &str) -> Result<&'static TableDef, DatabaseError> {
    let table = table_def(kind)?;
    if table.has_column(column) {
        Ok(table)
    } else {
        Err(DatabaseError::unknown_column(kind, column))
    }
}

/// All column names of `kind` (excluding `id`), for "select everything" loads
pub fn all_columns(kind: NodeKind) -> Vec<&'static str> {
    table_def(kind)
        .map(|t| t.column_names())
        .unwrap_or_default()
}
