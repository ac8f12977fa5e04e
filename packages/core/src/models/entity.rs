//! Entity references and eagerly loaded aggregates
//!
//! The walker itself only ever reads identifying columns and returns
//! [`EntityRef`]s. The aggregate structs here are what the facades hand back
//! after their single "load with relations" fetch.

use crate::models::NodeKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A (kind, id) pair naming one row of the relation store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub kind: NodeKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.id)
    }
}

/// SQLite stores booleans as 0/1 integers; accept either form
fn bool_from_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => value,
        Some(Flag::Int(value)) => value != 0,
        None => false,
    })
}

/// SQL NULL limits read as zero
fn zero_if_null<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

/// Display profile attached to most content entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub storage_bucket_id: Option<String>,
}

/// Role configuration of a community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSet {
    pub id: String,
    #[serde(default)]
    pub entry_role: Option<String>,
}

/// Community aggregate with its role set and profile eagerly loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    #[serde(default)]
    pub role_set: Option<RoleSet>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// Storage quota boundary; may sit below a parent aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageAggregator {
    pub id: String,
    #[serde(default)]
    pub parent_storage_aggregator_id: Option<String>,
    #[serde(default)]
    pub direct_storage_id: Option<String>,
    #[serde(default)]
    pub aggregator_type: Option<String>,
}

/// Concrete bucket that uploaded documents are stored in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageBucket {
    pub id: String,
    #[serde(default)]
    pub storage_aggregator_id: Option<String>,
    /// Comma separated MIME types
    #[serde(default)]
    pub allowed_mime_types: Option<String>,
    #[serde(default)]
    pub max_file_size: Option<i64>,
}

impl StorageBucket {
    pub fn allowed_mime_types(&self) -> Vec<&str> {
        self.allowed_mime_types
            .as_deref()
            .map(|types| {
                types
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether a file of the given type and size fits this bucket's policy
    pub fn accepts(&self, mime_type: &str, size: i64) -> bool {
        let types = self.allowed_mime_types();
        let type_ok = types.is_empty() || types.iter().any(|t| t.eq_ignore_ascii_case(mime_type));
        let size_ok = self.max_file_size.map_or(true, |max| size <= max);
        type_ok && size_ok
    }
}

/// One licensed capability with its limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseEntitlement {
    pub id: String,
    pub entitlement_type: String,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub entitlement_limit: i64,
    #[serde(default, deserialize_with = "bool_from_int")]
    pub enabled: bool,
}

impl LicenseEntitlement {
    /// Enabled with a positive limit
    pub fn is_granted(&self) -> bool {
        self.enabled && self.entitlement_limit > 0
    }
}

/// License aggregate with its entitlements eagerly loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    #[serde(default)]
    pub license_type: Option<String>,
    #[serde(default)]
    pub entitlements: Vec<LicenseEntitlement>,
}

impl License {
    pub fn entitlement(&self, entitlement_type: &str) -> Option<&LicenseEntitlement> {
        self.entitlements
            .iter()
            .find(|e| e.entitlement_type == entitlement_type)
    }
}
