//! RelationStore Trait - Read-only Relation Store Abstraction
//!
//! The ownership graph consumes exactly one capability from its datastore:
//! fetch a row of kind K by primary key or by a named foreign key value,
//! optionally with eagerly joined child relations. This module defines that
//! capability as the `RelationStore` trait plus its request/record types.
//!
//! # Architecture
//!
//! - **Abstraction Point**: Between the graph walker / resolver facades and the
//!   concrete database (libsql via `TursoRelationStore`, or the in-memory
//!   `MemoryRelationStore`)
//! - **Read Only**: There are no write methods; the walker never mutates data
//! - **Static Identifiers**: Table and column names are `&'static str` taken
//!   from the schema; lookup values are always bound as parameters
//!
//! # Examples
//!
//! ```rust,no_run
//! use ownergraph_core::db::{FetchRequest, RelationStore};
//! use ownergraph_core::models::NodeKind;
//!
//! # async fn example(store: &dyn RelationStore) -> anyhow::Result<()> {
//! // Which collaboration owns this callouts set?
//! let request = FetchRequest::by_column(NodeKind::Collaboration, "callouts_set_id", "cs-1");
//! if let Some(record) = store.fetch(&request).await? {
//!     println!("owned by collaboration {}", record.id);
//! }
//! # Ok(())
//! # }
//! ```

use crate::db::{schema, DatabaseError};
use crate::models::{EntityRef, NodeKind};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// How the row is located
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// By primary key
    ById(String),
    /// By the value of a (foreign key) column; the lowest id wins on ties
    ByColumn { column: &'static str, value: String },
}

impl Lookup {
    /// Column the lookup filters on
    pub fn column(&self) -> &'static str {
        match self {
            Lookup::ById(_) => "id",
            Lookup::ByColumn { column, .. } => column,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Lookup::ById(id) => id,
            Lookup::ByColumn { value, .. } => value,
        }
    }
}

/// How a joined relation hangs off its owning row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinLink {
    /// The owning row holds the related row's id in this column (one-to-one)
    Column(&'static str),
    /// Related rows hold the owning row's id in this column (one-to-many)
    Inverse(&'static str),
}

/// An eagerly loaded relation
#[derive(Debug, Clone, Copy)]
pub struct Join {
    /// Key the relation is stored under in the loaded record
    pub name: &'static str,
    pub kind: NodeKind,
    pub link: JoinLink,
    /// Relations to load on the related rows in turn
    pub nested: &'static [Join],
}

/// One fetch against the relation store
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub kind: NodeKind,
    pub lookup: Lookup,
    /// Columns to read besides `id`
    pub columns: Vec<&'static str>,
    pub joins: &'static [Join],
}

impl FetchRequest {
    pub fn by_id(kind: NodeKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            lookup: Lookup::ById(id.into()),
            columns: Vec::new(),
            joins: &[],
        }
    }

    pub fn by_column(kind: NodeKind, column: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            lookup: Lookup::ByColumn {
                column,
                value: value.into(),
            },
            columns: Vec::new(),
            joins: &[],
        }
    }

    /// Read these columns in addition to `id`
    pub fn select(mut self, columns: &[&'static str]) -> Self {
        self.columns.extend_from_slice(columns);
        self
    }

    /// Read every column of the kind's table
    pub fn select_all(mut self) -> Self {
        self.columns = schema::all_columns(self.kind);
        self
    }

    pub fn with_joins(mut self, joins: &'static [Join]) -> Self {
        self.joins = joins;
        self
    }
}

/// Loaded relation of a record
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    One(Option<Box<Record>>),
    Many(Vec<Record>),
}

/// A fetched row
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub kind: NodeKind,
    pub id: String,
    /// Requested columns; SQL NULL is `Value::Null`
    pub fields: Map<String, Value>,
    pub relations: BTreeMap<&'static str, Related>,
}

impl Record {
    pub fn new(kind: NodeKind, id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            kind,
            id: id.into(),
            fields,
            relations: BTreeMap::new(),
        }
    }

    pub fn entity(&self) -> EntityRef {
        EntityRef::new(self.kind, self.id.clone())
    }

    /// Non-null text value of a column
    pub fn str_field(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// JSON object of the row with its relations nested under their names
    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        object.insert("id".to_string(), Value::String(self.id.clone()));
        for (name, related) in &self.relations {
            let value = match related {
                Related::One(Some(record)) => record.to_value(),
                Related::One(None) => Value::Null,
                Related::Many(records) => Value::Array(records.iter().map(Record::to_value).collect()),
            };
            object.insert((*name).to_string(), value);
        }
        Value::Object(object)
    }
}

/// Read-only access to the relation store
///
/// Implementations supply `fetch_rows`; `fetch` is provided and layers the
/// eager join loading on top of it, so every backend loads relations the same
/// way.
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Fetch the rows matching `lookup`, ordered by id, reading `id` plus
    /// `columns`
    ///
    /// Returns an empty vec when nothing matches. Errors only when the store
    /// cannot answer (or a column is not part of the schema).
    async fn fetch_rows(
        &self,
        kind: NodeKind,
        lookup: &Lookup,
        columns: &[&'static str],
        limit: Option<usize>,
    ) -> Result<Vec<Record>, DatabaseError>;

    /// Fetch a single row with its eagerly joined relations
    ///
    /// - `Ok(Some(record))` if the row exists
    /// - `Ok(None)` if it doesn't (not an error)
    async fn fetch(&self, request: &FetchRequest) -> Result<Option<Record>, DatabaseError> {
        let mut rows = self
            .fetch_rows(request.kind, &request.lookup, &request.columns, Some(1))
            .await?;
        let Some(mut record) = rows.pop() else {
            return Ok(None);
        };
        load_joins(self, &mut record, request.joins).await?;
        Ok(Some(record))
    }
}

fn load_joins<'a, S>(
    store: &'a S,
    record: &'a mut Record,
    joins: &'static [Join],
) -> BoxFuture<'a, Result<(), DatabaseError>>
where
    S: RelationStore + ?Sized,
{
    async move {
        for join in joins {
            let columns = schema::all_columns(join.kind);
            let related = match join.link {
                JoinLink::Column(column) => match record.str_field(column).map(str::to_string) {
                    Some(related_id) => {
                        let mut rows = store
                            .fetch_rows(join.kind, &Lookup::ById(related_id), &columns, Some(1))
                            .await?;
                        match rows.pop() {
                            Some(mut related) => {
                                load_joins(store, &mut related, join.nested).await?;
                                Related::One(Some(Box::new(related)))
                            }
                            None => Related::One(None),
                        }
                    }
                    None => Related::One(None),
                },
                JoinLink::Inverse(column) => {
                    let lookup = Lookup::ByColumn {
                        column,
                        value: record.id.clone(),
                    };
                    let mut rows = store.fetch_rows(join.kind, &lookup, &columns, None).await?;
                    for related in rows.iter_mut() {
                        load_joins(store, related, join.nested).await?;
                    }
                    Related::Many(rows)
                }
            };
            record.relations.insert(join.name, related);
        }
        Ok(())
    }
    .boxed()
}
