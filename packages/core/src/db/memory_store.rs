//! In-memory RelationStore
//!
//! An ordered, immutable-after-setup map of rows per kind. It mirrors the
//! libsql store's semantics (lookups ordered by id, unknown columns rejected)
//! so the same fixtures give the same resolutions on both backends.
//!
//! It also counts lookups and can inject a per-lookup latency, which the
//! walker tests use to observe "one query per hop" and cancellation.

use crate::db::relation_store::{Lookup, Record, RelationStore};
use crate::db::{schema, DatabaseError};
use crate::models::NodeKind;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory relation store for tests and fixtures
#[derive(Debug, Default)]
pub struct MemoryRelationStore {
    tables: HashMap<NodeKind, BTreeMap<String, Map<String, Value>>>,
    latency: Option<Duration>,
    unavailable: HashSet<NodeKind>,
    lookups: AtomicUsize,
}

impl MemoryRelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every lookup by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every lookup on `kind` fail as if the table were unreachable
    pub fn with_unavailable(mut self, kind: NodeKind) -> Self {
        self.unavailable.insert(kind);
        self
    }

    /// Insert (or replace) a row
    ///
    /// `fields` must be a JSON object whose keys are columns of `kind`.
    pub fn insert(
        &mut self,
        kind: NodeKind,
        id: impl Into<String>,
        fields: Value,
    ) -> Result<(), DatabaseError> {
        let fields = match fields {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(DatabaseError::decode_failed(
                    kind,
                    format!("row fields must be an object, got {}", other),
                ))
            }
        };
        for column in fields.keys() {
            schema::require_column(kind, column)?;
        }
        self.tables
            .entry(kind)
            .or_default()
            .insert(id.into(), fields);
        Ok(())
    }

    /// Number of lookups served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn reset_lookups(&self) {
        self.lookups.store(0, Ordering::SeqCst);
    }

    fn project(
        kind: NodeKind,
        id: &str,
        row: &Map<String, Value>,
        columns: &[&'static str],
    ) -> Record {
        let fields = columns
            .iter()
            .filter(|c| **c != "id")
            .map(|c| (c.to_string(), row.get(*c).cloned().unwrap_or(Value::Null)))
            .collect();
        Record::new(kind, id, fields)
    }
}

#[async_trait]
impl RelationStore for MemoryRelationStore {
    async fn fetch_rows(
        &self,
        kind: NodeKind,
        lookup: &Lookup,
        columns: &[&'static str],
        limit: Option<usize>,
    ) -> Result<Vec<Record>, DatabaseError> {
        schema::require_column(kind, lookup.column())?;
        for column in columns {
            schema::require_column(kind, column)?;
        }

        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.contains(&kind) {
            return Err(DatabaseError::sql_execution(format!(
                "table {} is unavailable",
                kind.table()
            )));
        }

        let Some(rows) = self.tables.get(&kind) else {
            return Ok(Vec::new());
        };
        let limit = limit.unwrap_or(usize::MAX);

        let records = match lookup {
            Lookup::ById(id) => rows
                .get(id)
                .map(|row| Self::project(kind, id, row, columns))
                .into_iter()
                .collect(),
            Lookup::ByColumn { column, value } => rows
                .iter()
                .filter(|(_, row)| row.get(*column).and_then(Value::as_str) == Some(value.as_str()))
                .take(limit)
                .map(|(id, row)| Self::project(kind, id, row, columns))
                .collect(),
        };

        Ok(records)
    }
}
