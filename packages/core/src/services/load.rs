//! Eager loading of resolved aggregates

use crate::db::{FetchRequest, RelationStore};
use crate::services::ResolverError;
use serde::de::DeserializeOwned;

/// Fetch one row with its joins and decode it into `T`
///
/// This is the single "load with relations" query a facade issues once the
/// owner id is known.
pub(crate) async fn load_entity<T>(
    store: &dyn RelationStore,
    request: FetchRequest,
) -> Result<T, ResolverError>
where
    T: DeserializeOwned,
{
    let kind = request.kind;
    let record = store.fetch(&request).await?.ok_or_else(|| {
        ResolverError::entity_not_loaded(kind, request.lookup.value().to_string())
    })?;
    serde_json::from_value(record.to_value()).map_err(|e| ResolverError::decode(kind, e))
}
