//! Storage collaborator contract
//!
//! The panel never talks to a database driver directly; it goes through
//! [`DocumentStore`]. [`MemoryStore`] is the in-process implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use docadmin_schema::Document;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Identifier of a stored record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh random id
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = crate::AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(crate::AdminError::InvalidRecordId(s.to_string()))
        }
    }
}

/// Record selector
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Match by record id
    Id(RecordId),
    /// Match by equality of a top-level field
    Field { name: String, value: Value },
}

impl Filter {
    /// Filter by record id
    #[inline]
    #[must_use]
    pub fn by_id(id: RecordId) -> Self {
        Self::Id(id)
    }

    /// Filter by top-level field equality
    #[inline]
    #[must_use]
    pub fn by_field(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Field {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Check whether a stored record matches
    #[must_use]
    pub fn matches(&self, id: &RecordId, body: &Document) -> bool {
        match self {
            Self::Id(wanted) => wanted == id,
            Self::Field { name, value } => body.get(name) == Some(value),
        }
    }
}

/// Document together with its id
///
/// `body` never contains the id itself.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: RecordId,
    pub body: Document,
}

/// Storage collaborator
///
/// Implementations own persistence and are responsible for serializing
/// concurrent writes to the same record. Failures are surfaced verbatim;
/// callers never retry.
#[async_trait]
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Names of all collections
    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError>;

    /// Create an empty collection (no-op if it exists)
    async fn create_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Drop a collection and all its records
    async fn drop_collection(&self, name: &str) -> Result<(), StoreError>;

    /// All records of a collection; empty for unknown collections
    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// First record matching `filter`
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Insert a new record, creating the collection on demand
    async fn insert(&self, collection: &str, document: Document) -> Result<RecordId, StoreError>;

    /// Set the given top-level keys on the first matching record
    ///
    /// Returns `false` if nothing matched.
    async fn update_set(
        &self,
        collection: &str,
        filter: &Filter,
        partial: Document,
    ) -> Result<bool, StoreError>;

    /// Replace the body of the first matching record
    ///
    /// Returns `false` if nothing matched.
    async fn replace(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> Result<bool, StoreError>;

    /// Delete the first matching record
    ///
    /// Returns `false` if nothing matched.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, StoreError>;
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend-specific failure
    #[error("backend failure: {0}")]
    Backend(String),
}

type Collection = IndexMap<RecordId, Document>;

/// In-memory document store
///
/// Each collection lives behind one map shard lock, so writes to a
/// collection are serialized.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, Collection>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn find_id(records: &Collection, filter: &Filter) -> Option<RecordId> {
        records
            .iter()
            .find(|(id, body)| filter.matches(id, body))
            .map(|(id, _)| id.clone())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self.collections.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        self.collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        self.collections.remove(name);
        Ok(())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(id, body)| StoredDocument {
                        id: id.clone(),
                        body: body.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self.collections.get(collection).and_then(|records| {
            records
                .iter()
                .find(|(id, body)| filter.matches(id, body))
                .map(|(id, body)| StoredDocument {
                    id: id.clone(),
                    body: body.clone(),
                })
        }))
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<RecordId, StoreError> {
        let id = RecordId::generate();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), document);
        Ok(id)
    }

    async fn update_set(
        &self,
        collection: &str,
        filter: &Filter,
        partial: Document,
    ) -> Result<bool, StoreError> {
        let Some(mut records) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(id) = Self::find_id(&records, filter) else {
            return Ok(false);
        };
        if let Some(body) = records.get_mut(&id) {
            for (key, value) in partial {
                body.insert(key, value);
            }
        }
        Ok(true)
    }

    async fn replace(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> Result<bool, StoreError> {
        let Some(mut records) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(id) = Self::find_id(&records, filter) else {
            return Ok(false);
        };
        records.insert(id, document);
        Ok(true)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, StoreError> {
        let Some(mut records) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(id) = Self::find_id(&records, filter) else {
            return Ok(false);
        };
        Ok(records.shift_remove(&id).is_some())
    }
}
