//! TursoRelationStore - RelationStore Implementation for Turso/libsql
//!
//! Thin adapter from the `RelationStore` capability to parameterized SQL on a
//! `DatabaseService`. Every fetch is one `SELECT ... WHERE <column> = ?1`
//! statement: identifiers come from the static schema, the lookup value is
//! always a bound parameter.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ownergraph_core::db::{DatabaseService, FetchRequest, RelationStore, TursoRelationStore};
//! use ownergraph_core::models::NodeKind;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/graph.db")).await?);
//!     let store: Arc<dyn RelationStore> = Arc::new(TursoRelationStore::new(db));
//!
//!     let space = store
//!         .fetch(&FetchRequest::by_id(NodeKind::Space, "space-1").select(&["community_id"]))
//!         .await?;
//!     Ok(())
//! }
//! ```

use crate::db::relation_store::{Lookup, Record, RelationStore};
use crate::db::{schema, DatabaseError, DatabaseService};
use crate::models::NodeKind;
use async_trait::async_trait;
use serde_json::{Map, Number, Value};
use std::sync::Arc;

/// TursoRelationStore implements RelationStore for the libsql backend
pub struct TursoRelationStore {
    db: Arc<DatabaseService>,
}

impl TursoRelationStore {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Build the SELECT statement for a lookup
    ///
    /// Fails if any identifier is not part of the kind's table definition.
    fn select_statement(
        kind: NodeKind,
        lookup: &Lookup,
        columns: &[&'static str],
        limit: Option<usize>,
    ) -> Result<(String, Vec<&'static str>), DatabaseError> {
        let table = schema::require_column(kind, lookup.column())?;

        let mut selected: Vec<&'static str> = Vec::with_capacity(columns.len() + 1);
        selected.push("id");
        for column in columns {
            if !table.has_column(column) {
                return Err(DatabaseError::unknown_column(kind, *column));
            }
            if !selected.contains(column) {
                selected.push(*column);
            }
        }

        let mut sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 ORDER BY id",
            selected.join(", "),
            table.table(),
            lookup.column()
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        Ok((sql, selected))
    }

    fn to_json(kind: NodeKind, value: libsql::Value) -> Result<Value, DatabaseError> {
        Ok(match value {
            libsql::Value::Null => Value::Null,
            libsql::Value::Integer(i) => Value::Number(i.into()),
            libsql::Value::Real(f) => Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| DatabaseError::decode_failed(kind, format!("non-finite real {}", f)))?,
            libsql::Value::Text(s) => Value::String(s),
            libsql::Value::Blob(_) => {
                return Err(DatabaseError::decode_failed(kind, "unexpected BLOB column"))
            }
        })
    }
}

#[async_trait]
impl RelationStore for TursoRelationStore {
    async fn fetch_rows(
        &self,
        kind: NodeKind,
        lookup: &Lookup,
        columns: &[&'static str],
        limit: Option<usize>,
    ) -> Result<Vec<Record>, DatabaseError> {
        let (sql, selected) = Self::select_statement(kind, lookup, columns, limit)?;
        let conn = self.db.connect_read_only().await?;

        let mut rows = conn.query(&sql, [lookup.value()]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to query {}: {}", kind.table(), e))
        })?;

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            let id: String = row
                .get(0)
                .map_err(|e| DatabaseError::decode_failed(kind, format!("Failed to get id: {}", e)))?;

            let mut fields = Map::new();
            for (index, column) in selected.iter().enumerate().skip(1) {
                let value = row.get_value(index as i32).map_err(|e| {
                    DatabaseError::decode_failed(kind, format!("Failed to get {}: {}", column, e))
                })?;
                fields.insert((*column).to_string(), Self::to_json(kind, value)?);
            }
            records.push(Record::new(kind, id, fields));
        }

        tracing::trace!(
            "{} lookup on {}.{} returned {} row(s)",
            kind,
            kind.table(),
            lookup.column(),
            records.len()
        );

        Ok(records)
    }
}
